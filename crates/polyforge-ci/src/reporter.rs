//! Test execution and reporting.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::Utc;
use polyforge_core::discovery::compile_globs;
use polyforge_core::parse::{parse_coverage_percentage, resolve_test_results};
use polyforge_core::reporting;
use polyforge_core::{
    discover_tests, record_from, CommandExecutor, CoverageRecord, ForgeConfig, Language,
    Operation, TestReport, TestResults, TestSummary,
};
use tracing::{debug, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::stage::{result_file_patterns, stage_for};

/// Directories never searched for result files. Unlike source discovery,
/// build output (`target/`, `bin/`) is where result files live.
const RESULT_SEARCH_SKIP: &[&str] = &["node_modules", ".git", "__pycache__"];

/// Result files under `root` matching `patterns`, newest first.
pub fn find_result_files<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Vec<PathBuf> {
    if patterns.is_empty() {
        return Vec::new();
    }
    let globs = match compile_globs(patterns) {
        Ok(globs) => globs,
        Err(err) => {
            warn!(error = %err, "ignoring result file patterns");
            return Vec::new();
        }
    };

    let mut found: Vec<(SystemTime, PathBuf)> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || !e
                    .file_name()
                    .to_str()
                    .is_some_and(|name| RESULT_SEARCH_SKIP.contains(&name))
        })
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let relative = e.path().strip_prefix(root).unwrap_or(e.path());
            globs.is_match(relative)
        })
        .map(|e| {
            let modified = e
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, e.into_path())
        })
        .collect();

    found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    found.into_iter().map(|(_, path)| path).collect()
}

/// Discovers, runs and reports on a project's tests.
pub struct TestReporter {
    executor: Arc<dyn CommandExecutor>,
    config: ForgeConfig,
}

impl TestReporter {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            executor,
            config: ForgeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ForgeConfig) -> Self {
        self.config = config;
        self
    }

    fn result_patterns(&self, language: Language) -> Vec<String> {
        match self.config.result_patterns(language) {
            Some(patterns) => patterns.to_vec(),
            None => result_file_patterns(language)
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }

    /// Run the full test flow. Execution problems are recorded in the
    /// report; `success` only says whether the test tool ran.
    pub async fn run(
        &self,
        project_dir: &Path,
        language: Language,
        include_coverage: bool,
    ) -> TestReport {
        let run_id = Uuid::new_v4();
        info!(run_id = %run_id, language = %language, dir = %project_dir.display(), "starting test run");

        let discovery = discover_tests(project_dir, language);
        let mut report = TestReport {
            run_id,
            success: false,
            language,
            project_dir: project_dir.to_path_buf(),
            timestamp: Utc::now(),
            discovery,
            execution: Default::default(),
            results: TestResults::default(),
            coverage: None,
            summary: None,
            recommendations: Vec::new(),
        };

        if report.discovery.test_files.is_empty() {
            info!(run_id = %run_id, "no test files found");
            report.success = true;
            report.recommendations.push(reporting::no_tests_found(language));
            return report;
        }

        // Every language has a test stage.
        if let Some(stage) = stage_for(language, Operation::Test, &self.config.timeouts) {
            let result = self.executor.execute(&stage, project_dir).await;
            report.execution = record_from(&stage, result);
        }

        if report.execution.executed {
            let files = find_result_files(project_dir, &self.result_patterns(language));
            report.results = resolve_test_results(
                language,
                &files,
                &report.execution.output,
                &report.execution.error_output,
            );
        } else {
            warn!(
                run_id = %run_id,
                error = report.execution.error.as_deref().unwrap_or_default(),
                "test stage did not run"
            );
        }

        if include_coverage {
            report.coverage = self.run_coverage(project_dir, language).await;
        }

        let summary = TestSummary::build(&report.discovery, &report.execution, &report.results);
        report.recommendations = reporting::recommendations(&summary, &report.results);
        report.summary = Some(summary);
        report.success = report.execution.executed;

        info!(
            run_id = %run_id,
            total = report.results.total,
            passed = report.results.passed,
            failed = report.results.failed,
            "test run finished"
        );
        report
    }

    async fn run_coverage(&self, project_dir: &Path, language: Language) -> Option<CoverageRecord> {
        let mut stage = stage_for(language, Operation::Coverage, &self.config.timeouts)?;
        if !self.config.coverage {
            stage = stage.disabled();
        }
        if !stage.enabled {
            debug!(stage = %stage.name, "coverage stage disabled");
            return None;
        }
        let result = self.executor.execute(&stage, project_dir).await;
        let execution = record_from(&stage, result);

        let mut percentage = parse_coverage_percentage(&execution.output)
            .or_else(|| parse_coverage_percentage(&execution.error_output));
        if percentage.is_none() && execution.executed {
            // Cobertura reports written next to the project.
            for name in ["coverage.xml", "cobertura.xml"] {
                if let Ok(xml) = std::fs::read_to_string(project_dir.join(name)) {
                    percentage = parse_coverage_percentage(&xml);
                    if percentage.is_some() {
                        break;
                    }
                }
            }
        }

        Some(CoverageRecord {
            execution,
            percentage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{ScriptedExecutor, ScriptedResponse};
    use polyforge_core::{ResultSource, Severity};
    use std::fs;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_no_test_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "main.go", "package main\n");
        let fake = Arc::new(ScriptedExecutor::new());

        let report = TestReporter::new(fake.clone())
            .run(dir.path(), Language::Go, true)
            .await;

        assert!(report.success);
        assert!(report.summary.is_none());
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(report.recommendations[0].kind, "no_tests_found");
        assert_eq!(report.recommendations[0].message, "No test files found for Go project");
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_result_file_wins_over_console() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "tests/test_calc.py", "def test_add():\n    pass\n");
        write(
            dir.path(),
            "pytest-results.xml",
            r#"<testsuites><testsuite name="pytest" tests="3" failures="1" errors="0" skipped="0">
<testcase classname="tests.test_calc" name="test_add"/>
<testcase classname="tests.test_calc" name="test_sub"/>
<testcase classname="tests.test_calc" name="test_div"><failure message="ZeroDivisionError">trace</failure></testcase>
</testsuite></testsuites>"#,
        );
        let fake = Arc::new(ScriptedExecutor::with_responses([ScriptedResponse::failure(
            1,
            "==== 1 failed, 2 passed in 0.12s ====\n",
            "",
        )]));

        let report = TestReporter::new(fake.clone())
            .run(dir.path(), Language::Python, false)
            .await;

        assert!(report.success);
        assert_eq!(report.results.source, ResultSource::ResultFile);
        assert_eq!(report.results.total, 3);
        assert_eq!(report.results.failed, 1);
        assert_eq!(
            fake.command_lines(),
            vec!["pytest --junitxml=pytest-results.xml --verbose --tb=short"]
        );
        let summary = report.summary.as_ref().unwrap();
        assert_eq!(summary.success_rate, 66.67);
        let kinds: Vec<&str> = report.recommendations.iter().map(|r| r.kind.as_str()).collect();
        assert_eq!(kinds, vec!["low_test_success_rate", "low_test_count", "tests_failing"]);
    }

    #[tokio::test]
    async fn test_go_json_stream_and_coverage() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "calc_test.go", "package calc\nfunc TestAdd(t *testing.T) {}\n");
        let stream = concat!(
            r#"{"Action":"run","Package":"calc","Test":"TestAdd"}"#,
            "\n",
            r#"{"Action":"pass","Package":"calc","Test":"TestAdd","Elapsed":0.01}"#,
            "\n",
            r#"{"Action":"pass","Package":"calc","Elapsed":0.02}"#,
            "\n",
        );
        let fake = Arc::new(ScriptedExecutor::with_responses([
            ScriptedResponse::success(stream),
            ScriptedResponse::success("ok  \tcalc\t0.01s\tcoverage: 81.5% of statements\n"),
        ]));

        let report = TestReporter::new(fake.clone())
            .run(dir.path(), Language::Go, true)
            .await;

        assert_eq!(report.results.source, ResultSource::JsonStream);
        assert_eq!(report.results.passed, 1);
        let coverage = report.coverage.unwrap();
        assert!(coverage.execution.executed);
        assert_eq!(coverage.percentage, Some(81.5));
        assert_eq!(fake.calls()[1].stage.name, "go_coverage");
        assert_eq!(fake.calls()[1].stage.timeout_secs, 300);
    }

    #[tokio::test]
    async fn test_surefire_reports_are_merged_across_classes() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/test/java/a/ATest.java", "@Test void one() {}\n");
        write(dir.path(), "src/test/java/b/BTest.java", "@Test void four() {}\n");
        write(
            dir.path(),
            "target/surefire-reports/TEST-a.ATest.xml",
            r#"<testsuite name="a.ATest" tests="3" failures="1" errors="0" skipped="0">
<testcase classname="a.ATest" name="one"/>
<testcase classname="a.ATest" name="two"/>
<testcase classname="a.ATest" name="three"><failure message="expected 2">trace</failure></testcase>
</testsuite>"#,
        );
        write(
            dir.path(),
            "target/surefire-reports/TEST-b.BTest.xml",
            r#"<testsuite name="b.BTest" tests="2" failures="0" errors="0" skipped="0">
<testcase classname="b.BTest" name="four"/>
<testcase classname="b.BTest" name="five"/>
</testsuite>"#,
        );
        let fake = Arc::new(ScriptedExecutor::with_responses([ScriptedResponse::failure(
            1,
            "[ERROR] Tests run: 5, Failures: 1, Errors: 0, Skipped: 0\n",
            "",
        )]));

        let reporter = TestReporter::new(fake);
        let files = find_result_files(dir.path(), &reporter.result_patterns(Language::Java));
        assert_eq!(files.len(), 2);

        let report = reporter.run(dir.path(), Language::Java, false).await;
        assert_eq!(report.results.source, ResultSource::ResultFile);
        assert_eq!(report.results.total, 5);
        assert_eq!(report.results.passed, 4);
        assert_eq!(report.results.failed, 1);
        assert_eq!(report.results.cases.len(), 5);
    }

    #[tokio::test]
    async fn test_missing_tool_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/test/java/CalcTest.java", "@Test void add() {}\n");
        let fake = Arc::new(ScriptedExecutor::with_responses([ScriptedResponse::ToolNotFound]));

        let report = TestReporter::new(fake)
            .run(dir.path(), Language::Java, false)
            .await;

        assert!(!report.success);
        assert!(!report.execution.executed);
        assert_eq!(report.execution.error.as_deref(), Some("tool not found: mvn"));
        let critical = report
            .recommendations
            .iter()
            .find(|r| r.kind == "no_tests_executed")
            .unwrap();
        assert_eq!(critical.severity, Severity::Critical);
    }

    #[tokio::test]
    async fn test_coverage_disabled_by_config() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "calc_test.go", "func TestAdd(t *testing.T) {}\n");
        let fake = Arc::new(ScriptedExecutor::new());
        let config = ForgeConfig {
            coverage: false,
            ..ForgeConfig::default()
        };

        let report = TestReporter::new(fake.clone())
            .with_config(config)
            .run(dir.path(), Language::Go, true)
            .await;

        assert!(report.coverage.is_none());
        assert_eq!(fake.calls().len(), 1);
    }

    #[test]
    fn test_find_result_files_searches_build_output() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "target/surefire-reports/TEST-CalcTest.xml", "<testsuite/>");
        write(dir.path(), "target/surefire-reports/CalcTest.txt", "");
        write(dir.path(), "node_modules/x/target/surefire-reports/TEST-X.xml", "");

        let files = find_result_files(dir.path(), result_file_patterns(Language::Java));
        assert_eq!(
            files,
            vec![dir.path().join("target/surefire-reports/TEST-CalcTest.xml")]
        );
        assert!(find_result_files(dir.path(), result_file_patterns(Language::Rust)).is_empty());
    }
}
