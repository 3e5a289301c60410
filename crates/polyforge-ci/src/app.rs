//! Running generated applications and checking their runtimes.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use polyforge_core::discovery::walk_project_files;
use polyforge_core::{
    record_from, CommandExecutor, ExecutionRecord, Language, StageConfig, TimeoutConfig,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::stage::{
    available_run_kinds, file_pattern_matches, probe_stage, run_command, runtime_requirements,
    RunKind,
};

/// Duration statistics over the successful runs of a performance test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DurationStats {
    pub mean_ms: f64,
    pub min_ms: u64,
    pub max_ms: u64,
    /// Sample standard deviation; zero with fewer than two runs.
    pub std_dev_ms: f64,
}

impl DurationStats {
    pub fn from_samples(samples: &[u64]) -> Option<Self> {
        let min_ms = *samples.iter().min()?;
        let max_ms = *samples.iter().max()?;
        let n = samples.len() as f64;
        let mean_ms = samples.iter().sum::<u64>() as f64 / n;
        let std_dev_ms = if samples.len() < 2 {
            0.0
        } else {
            let variance = samples
                .iter()
                .map(|&s| (s as f64 - mean_ms).powi(2))
                .sum::<f64>()
                / (n - 1.0);
            variance.sqrt()
        };
        Some(Self {
            mean_ms,
            min_ms,
            max_ms,
            std_dev_ms,
        })
    }
}

/// Outcome of repeated console runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceReport {
    pub success: bool,
    pub iterations: u32,
    /// Durations of the successful runs, in run order.
    pub durations_ms: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<DurationStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Whether a project's runtime is in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuntimeCheck {
    pub language: String,
    pub commands: BTreeMap<String, bool>,
    pub files: BTreeMap<String, bool>,
    /// Only whether each variable is set; values are not reported.
    pub environment: BTreeMap<String, bool>,
    pub ready_to_run: bool,
}

/// Launches generated projects.
pub struct AppRunner {
    executor: Arc<dyn CommandExecutor>,
    timeouts: TimeoutConfig,
}

impl AppRunner {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            executor,
            timeouts: TimeoutConfig::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Run the project as `kind`. `timeout_secs` overrides the configured
    /// run timeout. A timed out run has return code -9.
    pub async fn run_application(
        &self,
        project_dir: &Path,
        language: Language,
        kind: RunKind,
        timeout_secs: Option<u64>,
    ) -> ExecutionRecord {
        let Some(command) = run_command(language, kind) else {
            let available: Vec<&str> = available_run_kinds(language)
                .iter()
                .map(|k| k.as_str())
                .collect();
            warn!(language = %language, kind = %kind, "run kind not available");
            return ExecutionRecord::not_executed(
                Vec::new(),
                format!(
                    "Run type {kind} not available for {}. Available: {}",
                    language.display_name(),
                    available.join(", ")
                ),
            );
        };

        let stage = StageConfig::new(
            format!("{}_run_{}", language.key(), kind.as_str()),
            command,
            timeout_secs.unwrap_or(self.timeouts.run),
        );
        info!(stage = %stage.name, dir = %project_dir.display(), "running application");
        let result = self.executor.execute(&stage, project_dir).await;
        record_from(&stage, result)
    }

    /// Run the console application `iterations` times and summarize the
    /// durations of the runs that succeeded.
    pub async fn performance_runs(
        &self,
        project_dir: &Path,
        language: Language,
        iterations: u32,
        timeout_secs: Option<u64>,
    ) -> PerformanceReport {
        let mut durations_ms = Vec::new();
        for i in 1..=iterations {
            info!(iteration = i, iterations, "performance run");
            let record = self
                .run_application(project_dir, language, RunKind::Console, timeout_secs)
                .await;
            if record.succeeded() {
                durations_ms.push(record.duration_ms);
            } else {
                warn!(
                    iteration = i,
                    error = record.error.as_deref().unwrap_or_default(),
                    return_code = record.return_code,
                    "performance run failed"
                );
            }
        }

        match DurationStats::from_samples(&durations_ms) {
            Some(stats) => PerformanceReport {
                success: true,
                iterations,
                durations_ms,
                stats: Some(stats),
                error: None,
            },
            None => PerformanceReport {
                success: false,
                iterations,
                durations_ms,
                stats: None,
                error: Some("All performance test iterations failed".to_string()),
            },
        }
    }

    /// Check runtime commands, project files and environment variables.
    pub async fn check_runtime_requirements(
        &self,
        project_dir: &Path,
        language: Language,
    ) -> RuntimeCheck {
        let requirements = runtime_requirements(language);
        let mut check = RuntimeCheck {
            language: language.key().to_string(),
            ready_to_run: true,
            ..RuntimeCheck::default()
        };

        for tool in requirements.commands {
            let stage = probe_stage(tool, "--version", &self.timeouts);
            let present = self.executor.execute(&stage, project_dir).await.is_ok();
            if !present {
                check.ready_to_run = false;
            }
            check.commands.insert(tool.to_string(), present);
        }

        let names: Vec<String> = walk_project_files(project_dir)
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect();
        for pattern in requirements.files {
            let found = names.iter().any(|n| file_pattern_matches(pattern, n));
            check.files.insert(pattern.to_string(), found);
        }

        for var in requirements.env {
            let set = std::env::var_os(var.name).is_some_and(|v| !v.is_empty());
            if !set && var.critical {
                check.ready_to_run = false;
            }
            check.environment.insert(var.name.to_string(), set);
        }

        check
    }
}

/// Markdown report of a single application run.
pub fn render_execution_report(
    record: &ExecutionRecord,
    project_dir: &Path,
    language: Language,
    kind: RunKind,
) -> String {
    let mut out = String::new();
    let success = record.succeeded();

    out.push_str("# Code Execution Report\n\n");
    out.push_str("## Execution Summary\n");
    out.push_str(&format!("- **Language**: {}\n", language.display_name()));
    out.push_str(&format!("- **Run Type**: {kind}\n"));
    out.push_str(&format!("- **Project Directory**: {}\n", project_dir.display()));
    out.push_str(&format!(
        "- **Timestamp**: {}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("- **Success**: {}\n", if success { "Yes" } else { "No" }));
    out.push_str(&format!("- **Exit Code**: {}\n\n", record.return_code));

    out.push_str("## Performance Metrics\n");
    out.push_str(&format!(
        "- **Execution Time**: {:.3} seconds\n\n",
        record.duration_ms as f64 / 1000.0
    ));

    out.push_str("## Output Analysis\n\n");
    out.push_str("### Standard Output\n```\n");
    out.push_str(&format!("{}\n", or_placeholder(&record.output, "No output")));
    out.push_str("```\n\n");
    out.push_str("### Standard Error\n```\n");
    let stderr = match (&record.error, record.error_output.trim().is_empty()) {
        (Some(error), true) => error.as_str(),
        _ => or_placeholder(&record.error_output, "No errors"),
    };
    out.push_str(&format!("{stderr}\n"));
    out.push_str("```\n\n");

    out.push_str("## Issues and Recommendations\n");
    if record.timed_out {
        out.push_str("\n**Timeout Occurred**\n");
        out.push_str("- The process exceeded the maximum allowed execution time\n");
        out.push_str("- Check for infinite loops or blocking operations\n");
    }
    if record.return_code != 0 && !record.timed_out {
        out.push_str(&format!("\n**Non-Zero Exit Code ({})**\n", record.return_code));
        out.push_str("- The application terminated with an error\n");
        out.push_str("- Check the error output above for details\n");
        out.push_str("- Verify all dependencies are installed and configured\n");
    }
    if success {
        out.push_str("\n**Execution Successful**\n");
        out.push_str("- Application completed without errors\n");
    }
    out
}

fn or_placeholder<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    if text.trim().is_empty() {
        placeholder
    } else {
        text.trim_end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{ScriptedExecutor, ScriptedResponse};

    #[tokio::test]
    async fn test_run_application_uses_run_table() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(ScriptedExecutor::with_responses([ScriptedResponse::success(
            "hello\n",
        )]));
        let record = AppRunner::new(fake.clone())
            .run_application(dir.path(), Language::Rust, RunKind::Release, None)
            .await;

        assert!(record.succeeded());
        assert_eq!(record.output, "hello\n");
        let calls = fake.calls();
        assert_eq!(calls[0].stage.name, "rust_run_release");
        assert_eq!(calls[0].stage.command_line(), "cargo run --release");
        assert_eq!(calls[0].stage.timeout_secs, 30);
    }

    #[tokio::test]
    async fn test_timeout_marks_record() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(ScriptedExecutor::with_responses([ScriptedResponse::Timeout]));
        let record = AppRunner::new(fake.clone())
            .run_application(dir.path(), Language::Python, RunKind::Console, Some(3))
            .await;

        assert!(record.timed_out);
        assert_eq!(record.return_code, -9);
        assert!(!record.succeeded());
        assert_eq!(fake.calls()[0].stage.timeout_secs, 3);
    }

    #[tokio::test]
    async fn test_unavailable_run_kind() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(ScriptedExecutor::new());
        let record = AppRunner::new(fake.clone())
            .run_application(dir.path(), Language::Python, RunKind::Bench, None)
            .await;

        assert!(!record.executed);
        assert_eq!(record.return_code, -1);
        assert_eq!(
            record.error.as_deref(),
            Some("Run type bench not available for Python. Available: console, test, test_coverage, debug")
        );
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_performance_runs_skip_failures() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(ScriptedExecutor::with_responses([
            ScriptedResponse::success(""),
            ScriptedResponse::failure(2, "", "boom"),
            ScriptedResponse::success(""),
        ]));
        let report = AppRunner::new(fake.clone())
            .performance_runs(dir.path(), Language::Go, 3, None)
            .await;

        assert!(report.success);
        assert_eq!(report.durations_ms, vec![1, 1]);
        let stats = report.stats.unwrap();
        assert_eq!(stats.mean_ms, 1.0);
        assert_eq!(stats.std_dev_ms, 0.0);
        assert_eq!(fake.command_lines(), vec!["go run main.go"; 3]);
    }

    #[tokio::test]
    async fn test_performance_runs_all_failed() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(ScriptedExecutor::with_responses([
            ScriptedResponse::ToolNotFound,
            ScriptedResponse::ToolNotFound,
        ]));
        let report = AppRunner::new(fake)
            .performance_runs(dir.path(), Language::Go, 2, None)
            .await;

        assert!(!report.success);
        assert!(report.stats.is_none());
        assert_eq!(
            report.error.as_deref(),
            Some("All performance test iterations failed")
        );
    }

    #[test]
    fn test_duration_stats_sample_std_dev() {
        let stats = DurationStats::from_samples(&[2, 4, 4, 4, 5, 5, 7, 9]).unwrap();
        assert_eq!(stats.mean_ms, 5.0);
        assert_eq!(stats.min_ms, 2);
        assert_eq!(stats.max_ms, 9);
        assert!((stats.std_dev_ms - 2.138).abs() < 0.001);
        assert!(DurationStats::from_samples(&[]).is_none());
    }

    #[tokio::test]
    async fn test_runtime_requirements() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("App.csproj"), "<Project/>").unwrap();
        let fake = Arc::new(ScriptedExecutor::new());
        let check = AppRunner::new(fake.clone())
            .check_runtime_requirements(dir.path(), Language::CSharp)
            .await;

        assert!(check.ready_to_run);
        assert_eq!(check.commands.get("dotnet"), Some(&true));
        assert_eq!(check.files.get("*.csproj"), Some(&true));
        assert_eq!(check.files.get("*.sln"), Some(&false));
        assert_eq!(fake.command_lines(), vec!["dotnet --version"]);

        let missing = Arc::new(ScriptedExecutor::with_responses([ScriptedResponse::ToolNotFound]));
        let check = AppRunner::new(missing)
            .check_runtime_requirements(dir.path(), Language::Rust)
            .await;
        assert!(!check.ready_to_run);
        assert_eq!(check.commands.get("cargo"), Some(&false));
        assert_eq!(check.commands.get("rustc"), Some(&true));
    }

    #[test]
    fn test_render_execution_report() {
        let record = ExecutionRecord {
            executed: true,
            command: vec!["node".into(), "index.js".into()],
            output: "started\n".into(),
            error_output: String::new(),
            return_code: 3,
            duration_ms: 1500,
            timed_out: false,
            error: None,
        };
        let report =
            render_execution_report(&record, Path::new("/tmp/app"), Language::JavaScript, RunKind::Console);

        assert!(report.starts_with("# Code Execution Report"));
        assert!(report.contains("- **Run Type**: console"));
        assert!(report.contains("- **Success**: No"));
        assert!(report.contains("- **Execution Time**: 1.500 seconds"));
        assert!(report.contains("started"));
        assert!(report.contains("No errors"));
        assert!(report.contains("**Non-Zero Exit Code (3)**"));
        assert!(!report.contains("Timeout Occurred"));
    }
}
