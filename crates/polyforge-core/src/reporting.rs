//! Recommendations and human-readable renderings of reports.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::domain::{
    CompileReport, Diagnostic, Recommendation, Severity, TestReport, TestResults, TestSummary,
};
use crate::error::Result;
use crate::language::Language;

/// Names of failed tests listed in a `tests_failing` recommendation.
const LISTED_FAILURES: usize = 5;

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

/// Recommendation for a project without any test files.
pub fn no_tests_found(language: Language) -> Recommendation {
    Recommendation::new(
        "no_tests_found",
        Severity::High,
        format!("No test files found for {} project", language.display_name()),
        format!(
            "Create test files following {} testing conventions",
            language.display_name()
        ),
    )
}

/// Advice derived from the summary and parsed results of a test run.
pub fn recommendations(summary: &TestSummary, results: &TestResults) -> Vec<Recommendation> {
    let mut out = Vec::new();

    let rate = summary.success_rate;
    if rate < 70.0 {
        out.push(Recommendation::new(
            "low_test_success_rate",
            Severity::High,
            format!("Test success rate is {rate}% - below recommended 90%"),
            "Review and fix failing tests, improve test quality",
        ));
    } else if rate < 90.0 {
        out.push(Recommendation::new(
            "moderate_test_success_rate",
            Severity::Medium,
            format!("Test success rate is {rate}% - could be improved"),
            "Aim for 90%+ test success rate for production readiness",
        ));
    }

    match summary.total {
        0 => out.push(Recommendation::new(
            "no_tests_executed",
            Severity::Critical,
            "No tests were executed",
            "Add test cases to ensure code quality and functionality",
        )),
        n if n < 10 => out.push(Recommendation::new(
            "low_test_count",
            Severity::Medium,
            format!("Only {n} tests found - may need more comprehensive testing"),
            "Consider adding more test cases for better coverage",
        )),
        _ => {}
    }

    let failed: Vec<String> = results.failed_cases().map(|c| c.name.clone()).collect();
    if !failed.is_empty() {
        let mut rec = Recommendation::new(
            "tests_failing",
            Severity::High,
            format!("{} test(s) are failing", failed.len()),
            "Review and fix failing tests before deployment",
        );
        rec.failed_tests = failed.into_iter().take(LISTED_FAILURES).collect();
        out.push(rec);
    }

    out
}

// ---------------------------------------------------------------------------
// Markdown
// ---------------------------------------------------------------------------

fn title_case(kind: &str) -> String {
    kind.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn status_label(passed: bool) -> &'static str {
    if passed {
        "PASSED"
    } else {
        "FAILED"
    }
}

/// Markdown summary of a test report.
pub fn render_test_markdown(report: &TestReport) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Test Report: {}\n", report.language.display_name()));
    md.push('\n');
    md.push_str(&format!("- Project: `{}`\n", report.project_dir.display()));
    md.push_str(&format!("- Generated: {}\n", report.timestamp.to_rfc3339()));
    md.push_str(&format!("- Test files found: {}\n", report.discovery.test_files.len()));
    if let Some(error) = &report.execution.error {
        md.push_str(&format!("- Execution error: {error}\n"));
    }
    md.push('\n');

    if let Some(summary) = &report.summary {
        md.push_str("## Summary\n\n");
        md.push_str("| Metric | Value |\n");
        md.push_str("|---|---|\n");
        md.push_str(&format!("| Total | {} |\n", summary.total));
        md.push_str(&format!("| Passed | {} |\n", summary.passed));
        md.push_str(&format!("| Failed | {} |\n", summary.failed));
        md.push_str(&format!("| Skipped | {} |\n", summary.skipped));
        md.push_str(&format!("| Errors | {} |\n", summary.errored));
        md.push_str(&format!("| Success rate | {}% |\n", summary.success_rate));
        md.push_str(&format!("| Duration | {:.2}s |\n", summary.execution_time_secs));
        md.push_str(&format!("| Status | {} |\n", status_label(summary.all_passed)));
        md.push('\n');
    }

    if let Some(percentage) = report.coverage.as_ref().and_then(|c| c.percentage) {
        md.push_str(&format!("Coverage: {percentage}%\n\n"));
    }

    let failed: Vec<_> = report.results.failed_cases().collect();
    if !failed.is_empty() {
        md.push_str("## Failed Tests\n\n");
        for case in failed {
            match &case.message {
                Some(message) => {
                    md.push_str(&format!("- `{}`: {}\n", case.name, message));
                }
                None => {
                    md.push_str(&format!("- `{}`\n", case.name));
                }
            }
        }
        md.push('\n');
    }

    if !report.recommendations.is_empty() {
        md.push_str("## Recommendations\n\n");
        for rec in &report.recommendations {
            md.push_str(&format!(
                "- **{}** ({}): {} - {}\n",
                title_case(&rec.kind),
                rec.severity.as_str(),
                rec.message,
                rec.suggestion
            ));
        }
    }

    md
}

fn diagnostic_line(diag: &Diagnostic) -> String {
    let location = match (&diag.file, diag.line) {
        (Some(file), Some(line)) => format!("{file}:{line}: "),
        (Some(file), None) => format!("{file}: "),
        _ => String::new(),
    };
    let code = diag
        .code
        .as_ref()
        .map(|c| format!("[{c}] "))
        .unwrap_or_default();
    format!("{location}{code}{}", diag.message)
}

/// Markdown summary of a compile report.
pub fn render_compile_markdown(report: &CompileReport) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Compilation Check: {}\n", report.language.display_name()));
    md.push('\n');
    md.push_str(&format!("- Project: `{}`\n", report.project_dir.display()));
    md.push_str(&format!("- Files checked: {}\n", report.files_checked.len()));
    md.push_str(&format!("- Status: {}\n", status_label(report.success)));
    md.push_str(&format!(
        "- Errors: {} ({} critical, {} fixable)\n",
        report.summary.total_errors,
        report.summary.critical_errors,
        report.summary.fixable_errors
    ));
    md.push_str(&format!("- Warnings: {}\n", report.summary.total_warnings));

    if !report.summary.error_categories.is_empty() {
        md.push('\n');
        md.push_str("## Error Categories\n\n");
        for (category, count) in &report.summary.error_categories {
            md.push_str(&format!("- {category}: {count}\n"));
        }
    }

    for (title, list) in [("Errors", &report.errors), ("Warnings", &report.warnings)] {
        if list.is_empty() {
            continue;
        }
        md.push('\n');
        md.push_str(&format!("## {title}\n\n"));
        for diag in list {
            md.push_str(&format!("- {}\n", diagnostic_line(diag)));
        }
    }

    md
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const HTML_STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 20px; }
.header { background-color: #f0f0f0; padding: 20px; border-radius: 5px; }
.summary { margin: 20px 0; }
.passed { color: green; }
.failed { color: red; }
.skipped { color: orange; }
.recommendations { background-color: #fff3cd; padding: 15px; border-radius: 5px; }
.critical { border-left: 5px solid red; }
.high { border-left: 5px solid orange; }
.medium { border-left: 5px solid yellow; }
table { width: 100%; border-collapse: collapse; margin: 20px 0; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
th { background-color: #f2f2f2; }
";

/// Self-contained HTML page for a test report. All report text is escaped.
pub fn render_test_html(report: &TestReport) -> String {
    let language = escape_html(report.language.display_name());
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n");
    html.push_str("<html>\n");
    html.push_str("<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>Test Report - {language}</title>\n"));
    html.push_str(&format!("<style>\n{HTML_STYLE}</style>\n"));
    html.push_str("</head>\n");
    html.push_str("<body>\n");

    html.push_str("<div class=\"header\">\n");
    html.push_str("<h1>Test Report</h1>\n");
    html.push_str(&format!("<p><strong>Language:</strong> {language}</p>\n"));
    html.push_str(&format!(
        "<p><strong>Project Directory:</strong> {}</p>\n",
        escape_html(&report.project_dir.display().to_string())
    ));
    html.push_str(&format!(
        "<p><strong>Generated:</strong> {}</p>\n",
        report.timestamp.to_rfc3339()
    ));
    html.push_str("</div>\n");

    html.push_str("<div class=\"summary\">\n");
    html.push_str("<h2>Test Summary</h2>\n");
    match &report.summary {
        Some(s) => {
            let status_class = if s.all_passed { "passed" } else { "failed" };
            html.push_str("<table>\n");
            html.push_str("<tr><th>Metric</th><th>Value</th></tr>\n");
            html.push_str(&format!("<tr><td>Total Tests</td><td>{}</td></tr>\n", s.total));
            html.push_str(&format!(
                "<tr><td class=\"passed\">Passed Tests</td><td>{}</td></tr>\n",
                s.passed
            ));
            html.push_str(&format!(
                "<tr><td class=\"failed\">Failed Tests</td><td>{}</td></tr>\n",
                s.failed
            ));
            html.push_str(&format!(
                "<tr><td class=\"skipped\">Skipped Tests</td><td>{}</td></tr>\n",
                s.skipped
            ));
            html.push_str(&format!("<tr><td>Success Rate</td><td>{}%</td></tr>\n", s.success_rate));
            html.push_str(&format!(
                "<tr><td>Overall Status</td><td class=\"{status_class}\">{}</td></tr>\n",
                status_label(s.all_passed)
            ));
            html.push_str("</table>\n");
        }
        None => {
            html.push_str("<p>Tests were not executed.</p>\n");
        }
    }
    html.push_str("</div>\n");

    html.push_str("<div class=\"recommendations\">\n");
    html.push_str("<h2>Recommendations</h2>\n");
    if report.recommendations.is_empty() {
        html.push_str("<p>No specific recommendations - test results look good!</p>\n");
    } else {
        html.push_str("<ul>\n");
        for rec in &report.recommendations {
            html.push_str(&format!(
                "<li class=\"{}\"><strong>{}:</strong> {} - {}</li>\n",
                rec.severity.as_str(),
                escape_html(&title_case(&rec.kind)),
                escape_html(&rec.message),
                escape_html(&rec.suggestion)
            ));
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</div>\n");

    html.push_str("<div>\n");
    html.push_str("<h2>Detailed Results</h2>\n");
    let failed: Vec<_> = report.results.failed_cases().collect();
    if failed.is_empty() {
        html.push_str("<p>No test failures to report.</p>\n");
    } else {
        html.push_str("<h3>Failed Tests</h3>\n");
        html.push_str("<table><tr><th>Test Name</th><th>Status</th><th>Message</th></tr>\n");
        for case in failed {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&case.name),
                case.status.as_str(),
                escape_html(case.message.as_deref().unwrap_or_default())
            ));
        }
        html.push_str("</table>\n");
    }
    html.push_str("</div>\n");

    html.push_str("</body>\n");
    html.push_str("</html>\n");
    html
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// Write `value` as pretty JSON, creating parent directories.
pub fn write_json_artifact<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    debug!(path = %path.display(), "wrote json artifact");
    Ok(())
}

/// Write a rendered text artifact (markdown or HTML).
pub fn write_text_artifact(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote report");
    Ok(())
}
