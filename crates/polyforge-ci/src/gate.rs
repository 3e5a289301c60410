//! Pass/fail gate over compile and test reports.

use polyforge_core::{CompileReport, GateThresholds, TestReport};
use serde::{Deserialize, Serialize};

/// Gate evaluation verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateVerdict {
    /// Whether the gate passed.
    pub passed: bool,

    /// Violations that caused failure (empty if passed).
    pub violations: Vec<String>,

    /// Summary message.
    pub message: String,
}

/// Gate evaluation rules.
pub struct ForgeGate;

impl ForgeGate {
    /// Evaluate whichever reports are present against `thresholds`.
    ///
    /// Gate rule:
    /// - Any compile error is a violation; warnings too with `deny_warnings`
    /// - The test tool must have run
    /// - Failed or errored tests are violations
    /// - The success rate must reach `min_success_rate` when tests ran
    /// - With `require_tests`, zero executed tests is a violation
    pub fn evaluate(
        compile: Option<&CompileReport>,
        tests: Option<&TestReport>,
        thresholds: &GateThresholds,
    ) -> GateVerdict {
        let mut violations = Vec::new();

        if let Some(report) = compile {
            if !report.errors.is_empty() {
                violations.push(format!(
                    "Compilation produced {} error(s)",
                    report.errors.len()
                ));
            } else if !report.success {
                violations.push("Compilation check failed".to_string());
            }
            if thresholds.deny_warnings && !report.warnings.is_empty() {
                violations.push(format!(
                    "Compilation produced {} warning(s)",
                    report.warnings.len()
                ));
            }
        }

        if let Some(report) = tests {
            let results = &report.results;
            let has_test_files = !report.discovery.test_files.is_empty();

            if has_test_files && !report.execution.executed {
                violations.push(format!(
                    "Test tool did not run: {}",
                    report.execution.error.as_deref().unwrap_or("unknown error")
                ));
            }
            if report.execution.timed_out {
                violations.push("Test run timed out".to_string());
            }
            if results.failed > 0 {
                violations.push(format!("{} test(s) failed", results.failed));
            }
            if results.errored > 0 {
                violations.push(format!("{} test(s) errored", results.errored));
            }
            if results.total > 0 && results.success_rate() < thresholds.min_success_rate {
                violations.push(format!(
                    "Success rate {:.2}% is below minimum {:.2}%",
                    results.success_rate(),
                    thresholds.min_success_rate
                ));
            }
            if thresholds.require_tests && results.total == 0 {
                violations.push("No tests were executed".to_string());
            }
        }

        let passed = violations.is_empty();
        let message = if passed {
            "All checks passed".to_string()
        } else {
            format!("Gate failed with {} violation(s)", violations.len())
        };

        GateVerdict {
            passed,
            violations,
            message,
        }
    }
}
