//! Restore, build and test cycle for generated projects.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use polyforge_core::discovery::walk_project_files;
use polyforge_core::{
    BuildCycleReport, BuildInfo, CommandExecutor, ExecError, Language, Operation, StepOutcome,
    TimeoutConfig, ToolAvailability,
};
use tracing::{info, warn};

use crate::stage::{command_for, file_pattern_matches, probe_stage, stage_for};

/// Operations whose tools are probed by [`ProjectBuilder::check_tool_availability`].
const PROBED_OPERATIONS: [Operation; 4] = [
    Operation::Restore,
    Operation::Build,
    Operation::Test,
    Operation::Clean,
];

const CONFIG_INDICATORS: &[&str] = &["config", "settings", "properties"];

/// Manifest and lock files that identify a project.
pub fn project_file_patterns(language: Language) -> &'static [&'static str] {
    match language {
        Language::CSharp => &["*.csproj", "*.sln"],
        Language::Java => &["pom.xml", "build.gradle"],
        Language::Python => &["requirements.txt", "setup.py", "pyproject.toml"],
        Language::JavaScript => &["package.json", "package-lock.json"],
        Language::TypeScript => &["package.json", "package-lock.json", "tsconfig.json"],
        Language::Go => &["go.mod", "go.sum"],
        Language::Rust => &["Cargo.toml", "Cargo.lock"],
    }
}

/// Substrings in a project file that mean it declares dependencies.
fn dependency_indicators(language: Language) -> &'static [&'static str] {
    match language {
        Language::CSharp => &["PackageReference"],
        Language::Java => &["<dependency>", "<dependencies>"],
        Language::Python => &["==", ">=", "<="],
        Language::JavaScript | Language::TypeScript => &["\"dependencies\"", "\"devDependencies\""],
        Language::Go => &["require"],
        Language::Rust => &["[dependencies]"],
    }
}

fn step_label(operation: Operation) -> &'static str {
    match operation {
        Operation::Restore => "Restore",
        Operation::Build => "Build",
        Operation::Test => "Test",
        Operation::Compile => "Compile",
        Operation::Coverage => "Coverage",
        Operation::Clean => "Clean",
    }
}

/// Runs the restore → build → test cycle of a project.
pub struct ProjectBuilder {
    executor: Arc<dyn CommandExecutor>,
    timeouts: TimeoutConfig,
}

impl ProjectBuilder {
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

    async fn run_step(&self, project_dir: &Path, language: Language, operation: Operation) -> StepOutcome {
        let Some(stage) = stage_for(language, operation, &self.timeouts) else {
            return StepOutcome {
                error: format!(
                    "No {} command for language: {}",
                    operation,
                    language.display_name()
                ),
                ..StepOutcome::default()
            };
        };

        info!(stage = %stage.name, dir = %project_dir.display(), "running build step");
        let start = Instant::now();
        let mut outcome = StepOutcome {
            command: stage.command.clone(),
            ..StepOutcome::default()
        };

        match self.executor.execute(&stage, project_dir).await {
            Ok(output) => {
                outcome.success = output.passed();
                outcome.return_code = Some(output.exit_code);
                outcome.duration_ms = output.duration_ms;
                outcome.output = output.stdout;
                outcome.error = output.stderr;
            }
            Err(err) => {
                outcome.duration_ms = start.elapsed().as_millis() as u64;
                outcome.error = match &err {
                    ExecError::Timeout { secs, .. } => format!(
                        "{} command timed out after {secs} seconds",
                        step_label(operation)
                    ),
                    ExecError::ToolNotFound { .. } => format!(
                        "Command not found: {}. Please ensure {} tools are installed.",
                        stage.command_line(),
                        language.display_name()
                    ),
                    other => format!(
                        "Unexpected error during {}: {other}",
                        operation.as_str()
                    ),
                };
                warn!(stage = %stage.name, error = %outcome.error, "build step failed");
            }
        }
        outcome
    }

    pub async fn restore(&self, project_dir: &Path, language: Language) -> StepOutcome {
        self.run_step(project_dir, language, Operation::Restore).await
    }

    pub async fn build(&self, project_dir: &Path, language: Language) -> StepOutcome {
        self.run_step(project_dir, language, Operation::Build).await
    }

    pub async fn test(&self, project_dir: &Path, language: Language) -> StepOutcome {
        self.run_step(project_dir, language, Operation::Test).await
    }

    /// Restore, then build, then test. Stops after a failed restore or
    /// build; a failed test step does not fail the cycle.
    pub async fn full_cycle(&self, project_dir: &Path, language: Language) -> BuildCycleReport {
        let mut report = BuildCycleReport::new(language, project_dir.to_path_buf());

        let restore = self.restore(project_dir, language).await;
        let restored = restore.success;
        report.restore = Some(restore);
        if !restored {
            info!(language = %language, "dependency restoration failed; stopping cycle");
            return report;
        }

        let build = self.build(project_dir, language).await;
        let built = build.success;
        report.build = Some(build);
        if !built {
            info!(language = %language, "build failed; stopping cycle");
            return report;
        }

        let test = self.test(project_dir, language).await;
        if !test.success {
            info!(language = %language, "tests failed or had issues");
        }
        report.test = Some(test);

        report.success = restored && built;
        report
    }

    /// Probe the tool behind each cycle operation with `--version`,
    /// falling back to `--help` when `--version` cannot run at all.
    /// Keys are `<operation>_tool`.
    pub async fn check_tool_availability(&self, language: Language) -> ToolAvailability {
        let mut availability = ToolAvailability::new();
        let mut probed: BTreeMap<String, bool> = BTreeMap::new();
        let cwd = std::env::temp_dir();

        for operation in PROBED_OPERATIONS {
            let Some(tool) = command_for(language, operation).and_then(|c| c.into_iter().next())
            else {
                continue;
            };

            let available = match probed.get(&tool) {
                Some(available) => *available,
                None => {
                    let available = self.probe(&tool, &cwd).await;
                    probed.insert(tool.clone(), available);
                    available
                }
            };
            availability.insert(format!("{}_tool", operation.as_str()), available);
        }
        availability
    }

    async fn probe(&self, tool: &str, cwd: &Path) -> bool {
        let version = probe_stage(tool, "--version", &self.timeouts);
        match self.executor.execute(&version, cwd).await {
            Ok(output) => output.passed(),
            Err(_) => {
                let help = probe_stage(tool, "--help", &self.timeouts);
                matches!(self.executor.execute(&help, cwd).await, Ok(output) if output.passed())
            }
        }
    }

    /// Static facts about the project's build files.
    pub fn build_info(&self, project_dir: &Path, language: Language) -> BuildInfo {
        build_info(project_dir, language)
    }
}

/// Project files, config files and whether dependencies are declared.
pub fn build_info(project_dir: &Path, language: Language) -> BuildInfo {
    let patterns = project_file_patterns(language);
    let mut project_files = Vec::new();
    let mut config_files = Vec::new();

    for path in walk_project_files(project_dir) {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !patterns.iter().any(|p| file_pattern_matches(p, name)) {
            continue;
        }
        let lower = name.to_ascii_lowercase();
        if CONFIG_INDICATORS.iter().any(|i| lower.contains(i)) {
            config_files.push(path.clone());
        }
        project_files.push(path);
    }

    let indicators = dependency_indicators(language);
    let has_dependencies = project_files.iter().any(|path| {
        std::fs::read_to_string(path)
            .map(|content| indicators.iter().any(|i| content.contains(i)))
            .unwrap_or(false)
    });

    BuildInfo {
        language,
        project_dir: project_dir.to_path_buf(),
        project_files,
        config_files,
        has_dependencies,
    }
}
