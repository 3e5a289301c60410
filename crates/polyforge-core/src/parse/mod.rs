//! Normalization of build and test tool output.
//!
//! Every parser here is pure: it takes text the tool produced and returns
//! domain records. Running the tools lives in `polyforge-ci`.

pub mod compile;
pub mod console;
pub mod coverage;
pub mod go_json;
pub mod junit;
pub mod trx;

use std::path::Path;

use tracing::debug;

use crate::domain::{ResultSource, TestResults};
use crate::error::{ForgeError, Result};
use crate::language::Language;

pub use compile::{categorize, parse_compiler_output, suggest_fixes, ParsedDiagnostics};
pub use console::{attach_failure_details, parse_console};
pub use coverage::parse_coverage_percentage;
pub use go_json::parse_go_test_json;
pub use junit::parse_junit;
pub use trx::parse_trx;

/// Parse a result file written by a test tool, picking the format from
/// the extension: `.trx` as TRX, `.xml` as JUnit, `.json` as a
/// `go test -json` stream.
pub fn parse_result_file(path: &Path, language: Language) -> Result<TestResults> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let text = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), language = %language, "parsing result file");

    let results = match extension.as_str() {
        "trx" => parse_trx(&text)?,
        "xml" => parse_junit(&text)?,
        "json" if language == Language::Go => parse_go_test_json(&text).ok_or_else(|| {
            ForgeError::ResultParse(format!("no test events in {}", path.display()))
        })?,
        _ => {
            return Err(ForgeError::ResultParse(format!(
                "unrecognized result file format: {}",
                path.display()
            )))
        }
    };

    let mut results = results.with_source(ResultSource::ResultFile);
    results.result_file = Some(path.to_path_buf());
    Ok(results)
}

/// Whether the tool writes one result file per test class into a shared
/// directory (surefire) rather than a single report.
fn writes_report_per_class(language: Language) -> bool {
    language == Language::Java
}

/// Pick test results from, in order: the first parseable result file,
/// the go JSON event stream on stdout, the console output.
///
/// For per-class reports every parseable file in the directory of the
/// first one is merged into a single result set.
pub fn resolve_test_results(
    language: Language,
    result_files: &[std::path::PathBuf],
    stdout: &str,
    stderr: &str,
) -> TestResults {
    for (index, path) in result_files.iter().enumerate() {
        match parse_result_file(path, language) {
            Ok(mut results) => {
                if writes_report_per_class(language) {
                    let dir = path.parent();
                    for sibling in result_files[index + 1..]
                        .iter()
                        .filter(|p| p.parent() == dir)
                    {
                        match parse_result_file(sibling, language) {
                            Ok(more) => results.merge(more),
                            Err(err) => {
                                debug!(path = %sibling.display(), error = %err, "skipping result file")
                            }
                        }
                    }
                }
                attach_failure_details(&mut results.cases, stdout);
                return results;
            }
            Err(err) => debug!(path = %path.display(), error = %err, "skipping result file"),
        }
    }

    if language == Language::Go {
        if let Some(results) = parse_go_test_json(stdout) {
            return results.with_source(ResultSource::JsonStream);
        }
    }

    parse_console(language, stdout, stderr)
}
