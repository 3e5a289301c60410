//! Test discovery, execution and result types.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::diagnostic::Severity;
use crate::language::Language;

/// Outcome of a single test case.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
    Error,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Skipped => "skipped",
            TestStatus::Error => "error",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TestStatus::Failed | TestStatus::Error)
    }
}

/// A single test case extracted from a result source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestCase {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    pub status: TestStatus,

    /// Duration as printed by the tool (e.g. "12ms", "0.01s").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl TestCase {
    pub fn new(name: impl Into<String>, status: TestStatus) -> Self {
        Self {
            name: name.into(),
            class_name: None,
            status,
            duration: None,
            message: None,
            details: None,
        }
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        if !class_name.is_empty() {
            self.class_name = Some(class_name);
        }
        self
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        if !message.is_empty() {
            self.message = Some(message);
        }
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        let details = details.into();
        if !details.trim().is_empty() {
            self.details = Some(details);
        }
        self
    }
}

/// Where parsed test counts came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    /// A JUnit/TRX/JSON file written by the test tool.
    ResultFile,
    /// A machine-readable stream on stdout (e.g. `go test -json`).
    JsonStream,
    /// Human-oriented console output.
    Console,
    #[default]
    None,
}

/// Normalized test counts and per-case details.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TestResults {
    pub parsed_successfully: bool,
    pub source: ResultSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_file: Option<PathBuf>,
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub errored: u32,
    pub cases: Vec<TestCase>,
    pub execution_time_secs: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

impl TestResults {
    /// Results with explicit counts; `total` is the sum of the parts.
    pub fn from_counts(passed: u32, failed: u32, skipped: u32, errored: u32) -> Self {
        Self {
            total: passed
                .saturating_add(failed)
                .saturating_add(skipped)
                .saturating_add(errored),
            passed,
            failed,
            skipped,
            errored,
            ..Self::default()
        }
    }

    /// Derive counts from the collected cases.
    pub fn from_cases(cases: Vec<TestCase>) -> Self {
        let mut results = Self::default();
        for case in &cases {
            match case.status {
                TestStatus::Passed => results.passed += 1,
                TestStatus::Failed => results.failed += 1,
                TestStatus::Skipped => results.skipped += 1,
                TestStatus::Error => results.errored += 1,
            }
        }
        results.total = cases.len() as u32;
        results.cases = cases;
        results
    }

    /// Fold another parsed result set into this one: counts and times are
    /// summed, cases appended.
    pub fn merge(&mut self, other: TestResults) {
        self.total = self.total.saturating_add(other.total);
        self.passed = self.passed.saturating_add(other.passed);
        self.failed = self.failed.saturating_add(other.failed);
        self.skipped = self.skipped.saturating_add(other.skipped);
        self.errored = self.errored.saturating_add(other.errored);
        self.execution_time_secs += other.execution_time_secs;
        self.cases.extend(other.cases);
    }

    pub fn with_source(mut self, source: ResultSource) -> Self {
        self.source = source;
        self.parsed_successfully = true;
        self
    }

    /// Percentage of passed tests, rounded to two decimals.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let rate = f64::from(self.passed) / f64::from(self.total) * 100.0;
        (rate * 100.0).round() / 100.0
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }

    pub fn failed_cases(&self) -> impl Iterator<Item = &TestCase> {
        self.cases.iter().filter(|c| c.status.is_failure())
    }
}

/// Category of a discovered test file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TestCategory {
    Unit,
    Integration,
    Functional,
    Other,
}

/// Test files found in a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestDiscovery {
    pub language: Language,
    pub project_dir: PathBuf,
    pub test_files: Vec<PathBuf>,
    pub test_count_estimate: u32,
    pub categories: BTreeMap<TestCategory, Vec<PathBuf>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestDiscovery {
    pub fn empty(language: Language, project_dir: PathBuf) -> Self {
        Self {
            language,
            project_dir,
            test_files: Vec::new(),
            test_count_estimate: 0,
            categories: BTreeMap::new(),
            error: None,
        }
    }
}

/// Captured execution of one tool invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExecutionRecord {
    pub executed: bool,
    pub command: Vec<String>,
    pub output: String,
    pub error_output: String,
    /// -1 when the tool never ran or was killed by a signal.
    pub return_code: i32,
    pub duration_ms: u64,
    pub timed_out: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionRecord {
    pub fn not_executed(command: Vec<String>, error: impl Into<String>) -> Self {
        Self {
            command,
            return_code: -1,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn succeeded(&self) -> bool {
        self.executed && !self.timed_out && self.return_code == 0
    }
}

/// Outcome of an optional coverage run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CoverageRecord {
    pub execution: ExecutionRecord,
    /// Total coverage percentage if the tool printed one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

/// Overall verdict of a test run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum OverallStatus {
    Passed,
    Failed,
}

/// Flattened summary for display and gating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestSummary {
    pub test_files_found: usize,
    pub estimated_test_count: u32,
    pub executed: bool,
    pub execution_time_secs: f64,
    pub return_code: i32,
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub errored: u32,
    pub success_rate: f64,
    pub all_passed: bool,
    pub overall_status: OverallStatus,
}

impl TestSummary {
    pub fn build(
        discovery: &TestDiscovery,
        execution: &ExecutionRecord,
        results: &TestResults,
    ) -> Self {
        let all_passed = results.all_passed();
        Self {
            test_files_found: discovery.test_files.len(),
            estimated_test_count: discovery.test_count_estimate,
            executed: execution.executed,
            execution_time_secs: execution.duration_ms as f64 / 1000.0,
            return_code: execution.return_code,
            total: results.total,
            passed: results.passed,
            failed: results.failed,
            skipped: results.skipped,
            errored: results.errored,
            success_rate: results.success_rate(),
            all_passed,
            overall_status: if all_passed {
                OverallStatus::Passed
            } else {
                OverallStatus::Failed
            },
        }
    }
}

/// Actionable advice attached to a report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub kind: String,
    pub severity: Severity,
    pub message: String,
    pub suggestion: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_tests: Vec<String>,
}

impl Recommendation {
    pub fn new(
        kind: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            severity,
            message: message.into(),
            suggestion: suggestion.into(),
            failed_tests: Vec::new(),
        }
    }
}

/// Full result of discovering, running and parsing a project's tests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestReport {
    pub run_id: Uuid,
    /// Whether the test tool ran (failing tests still count as success).
    pub success: bool,
    pub language: Language,
    pub project_dir: PathBuf,
    pub timestamp: DateTime<Utc>,
    pub discovery: TestDiscovery,
    pub execution: ExecutionRecord,
    pub results: TestResults,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<CoverageRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<TestSummary>,
    pub recommendations: Vec<Recommendation>,
}
