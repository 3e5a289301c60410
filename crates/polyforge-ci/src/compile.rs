//! Compilation checks for generated projects.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use polyforge_core::discovery::find_source_files;
use polyforge_core::{
    parse_compiler_output, CommandExecutor, CompileReport, Diagnostic, DiagnosticKind,
    ExecError, Language, Operation, Severity, TimeoutConfig,
};
use tracing::{debug, info};

use crate::stage::{checks_per_file, per_file_compile_stage, stage_for};

/// Modules that ship with CPython and never need installing.
const PYTHON_STDLIB: &[&str] = &[
    "abc", "argparse", "array", "ast", "asyncio", "base64", "bisect", "builtins", "calendar",
    "collections", "concurrent", "configparser", "contextlib", "copy", "csv", "ctypes",
    "dataclasses", "datetime", "decimal", "difflib", "email", "enum", "errno", "fractions",
    "functools", "gc", "getpass", "glob", "gzip", "hashlib", "heapq", "hmac", "html", "http",
    "importlib", "inspect", "io", "ipaddress", "itertools", "json", "logging", "math",
    "mimetypes", "multiprocessing", "numbers", "operator", "os", "pathlib", "pickle",
    "platform", "pprint", "queue", "random", "re", "secrets", "select", "shlex", "shutil",
    "signal", "socket", "sqlite3", "ssl", "statistics", "string", "struct", "subprocess",
    "sys", "tempfile", "textwrap", "threading", "time", "timeit", "tkinter", "traceback",
    "types", "typing", "unittest", "urllib", "uuid", "warnings", "weakref", "xml", "zipfile",
    "zlib", "__future__",
];

/// Diagnostic for a tool invocation that never produced output.
fn exec_failure(err: &ExecError, file: Option<&Path>) -> Diagnostic {
    let (kind, message) = match err {
        ExecError::Timeout { secs, .. } => (
            DiagnosticKind::TimeoutError,
            format!("Compilation check timed out after {secs} seconds"),
        ),
        ExecError::ToolNotFound { tool } => (
            DiagnosticKind::ToolNotFound,
            format!("Compilation tool not found: {tool}"),
        ),
        other => (
            DiagnosticKind::CompilationFailed,
            format!("Compilation failed: {other}"),
        ),
    };
    let diag = Diagnostic::new(kind, Severity::Critical, message);
    match file {
        Some(path) => diag.with_file(path.display().to_string()),
        None => diag,
    }
}

/// Top-level module of each `import x` / `from x import y` line that is
/// neither stdlib nor part of the project. Returns `(line, module)`.
pub fn unresolved_python_imports(source: &str, file: &Path, project_dir: &Path) -> Vec<(u32, String)> {
    let import = polyforge_core::regex!(
        r"^(?:import|from)\s+([A-Za-z_][A-Za-z0-9_]*)(?:\.[A-Za-z_][A-Za-z0-9_]*)*(?:\s+import\b|\s+as\b|\s*,|\s*$)"
    );

    let local_dirs: Vec<&Path> = [file.parent(), Some(project_dir)]
        .into_iter()
        .flatten()
        .collect();
    let is_local = |module: &str| {
        local_dirs.iter().any(|dir| {
            dir.join(format!("{module}.py")).is_file() || dir.join(module).is_dir()
        })
    };

    let mut missing = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        let Some(caps) = import.captures(line.trim()) else {
            continue;
        };
        let module = &caps[1];
        if PYTHON_STDLIB.contains(&module) || is_local(module) {
            continue;
        }
        missing.push((idx as u32 + 1, module.to_string()));
    }
    missing
}

/// Runs compile checks and normalizes their output.
pub struct CompilationChecker {
    executor: Arc<dyn CommandExecutor>,
    timeouts: TimeoutConfig,
}

impl CompilationChecker {
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

    /// Check whether the project compiles. Failures are reported as
    /// diagnostics in the returned report.
    pub async fn check(&self, project_dir: &Path, language: Language) -> CompileReport {
        let mut report = CompileReport::new(language, project_dir.to_path_buf());

        if !project_dir.is_dir() {
            report.errors.push(Diagnostic::new(
                DiagnosticKind::CheckFailed,
                Severity::Critical,
                format!(
                    "Failed to check compilation: {} is not a directory",
                    project_dir.display()
                ),
            ));
            return report.finalize();
        }

        let files = find_source_files(project_dir, language);
        report.files_checked = files.clone();
        if files.is_empty() {
            report.warnings.push(Diagnostic::new(
                DiagnosticKind::NoSourceFiles,
                Severity::Medium,
                format!(
                    "No {} source files found in {}",
                    language.display_name(),
                    project_dir.display()
                ),
            ));
            return report.finalize();
        }

        info!(
            language = %language,
            files = files.len(),
            dir = %project_dir.display(),
            "checking compilation"
        );

        if checks_per_file(language) {
            for file in &files {
                self.check_file(&mut report, project_dir, language, file).await;
            }
        } else {
            self.check_project(&mut report, project_dir, language).await;
        }

        let report = report.finalize();
        debug!(
            errors = report.summary.total_errors,
            warnings = report.summary.total_warnings,
            "compilation check finished"
        );
        report
    }

    async fn check_project(&self, report: &mut CompileReport, project_dir: &Path, language: Language) {
        let Some(stage) = stage_for(language, Operation::Compile, &self.timeouts) else {
            report.errors.push(Diagnostic::new(
                DiagnosticKind::UnsupportedLanguage,
                Severity::Critical,
                format!(
                    "Compilation checking not supported for language: {}",
                    language.display_name()
                ),
            ));
            return;
        };
        report.commands.push(stage.command.clone());

        match self.executor.execute(&stage, project_dir).await {
            Ok(output) => {
                let parsed = parse_compiler_output(language, &output.stdout, &output.stderr);
                let exit_code = output.exit_code;
                report.errors.extend(parsed.errors);
                report.warnings.extend(parsed.warnings);
                if exit_code != 0 && report.errors.is_empty() {
                    report.errors.push(Diagnostic::new(
                        DiagnosticKind::CompilationFailed,
                        Severity::Critical,
                        format!("{} exited with code {exit_code}", stage.command_line()),
                    ));
                }
                report.output = output.stdout;
                report.error_output = output.stderr;
            }
            Err(err) => report.errors.push(exec_failure(&err, None)),
        }
    }

    async fn check_file(
        &self,
        report: &mut CompileReport,
        project_dir: &Path,
        language: Language,
        file: &Path,
    ) {
        let relative: PathBuf = file.strip_prefix(project_dir).unwrap_or(file).to_path_buf();
        let Some(stage) = per_file_compile_stage(language, &relative, &self.timeouts) else {
            return;
        };
        report.commands.push(stage.command.clone());

        match self.executor.execute(&stage, project_dir).await {
            Ok(output) if output.passed() => {
                report.output.push_str(&format!("{}: OK\n", relative.display()));
            }
            Ok(output) => {
                report.error_output.push_str(&output.stderr);
                match language {
                    Language::JavaScript => {
                        for line in output.stderr.lines().map(str::trim).filter(|l| !l.is_empty()) {
                            report.errors.push(
                                Diagnostic::new(DiagnosticKind::SyntaxError, Severity::Critical, line)
                                    .with_file(relative.display().to_string()),
                            );
                        }
                    }
                    _ => {
                        let parsed = parse_compiler_output(language, &output.stdout, &output.stderr);
                        if parsed.errors.is_empty() {
                            report.errors.push(
                                Diagnostic::error(format!(
                                    "{} exited with code {}",
                                    stage.command_line(),
                                    output.exit_code
                                ))
                                .with_file(relative.display().to_string()),
                            );
                        }
                        report.errors.extend(parsed.errors);
                        report.warnings.extend(parsed.warnings);
                    }
                }
            }
            Err(err) => report.errors.push(exec_failure(&err, Some(&relative))),
        }

        if language == Language::Python {
            match std::fs::read_to_string(file) {
                Ok(source) => {
                    for (line, module) in unresolved_python_imports(&source, file, project_dir) {
                        report.warnings.push(
                            Diagnostic::new(
                                DiagnosticKind::MissingImport,
                                Severity::Medium,
                                format!("Module '{module}' may not be available"),
                            )
                            .with_location(relative.display().to_string(), line, None)
                            .with_suggestion(format!("Install with: pip install {module}")),
                        );
                    }
                }
                Err(err) => report.errors.push(
                    Diagnostic::new(
                        DiagnosticKind::FileReadError,
                        Severity::Critical,
                        format!("Could not read file: {err}"),
                    )
                    .with_file(relative.display().to_string()),
                ),
            }
        }
    }
}
