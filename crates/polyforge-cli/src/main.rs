//! polyforge - build and test generated multi-language projects
//!
//! The `polyforge` command turns LLM markdown into a project on disk and
//! runs the project's own tool-chain, normalizing the output.
//!
//! ## Commands
//!
//! - `extract`: Write the code blocks of a markdown answer to disk
//! - `structure`: Show (or create) the project layout a markdown answer describes
//! - `compile`: Check that a project compiles
//! - `test`: Run a project's tests and report on them
//! - `build`: Restore, build and test a project
//! - `run`: Launch a project's application

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use polyforge_ci::{
    build_info, render_execution_report, AppRunner, CompilationChecker, ForgeGate, GateVerdict,
    ProcessExecutor, ProjectBuilder, RunKind, TestReporter,
};
use polyforge_core::extract::structure_metadata;
use polyforge_core::reporting::{
    render_compile_markdown, render_test_html, render_test_markdown, write_json_artifact,
    write_text_artifact,
};
use polyforge_core::telemetry::level_for_verbosity;
use polyforge_core::{
    categorize_scenarios, discover_tests, extract_code_blocks, extract_dependencies,
    extract_project_structure, sanitize_method_name, suggest_fixes, CommandExecutor,
    CompileReport, Diagnostic, ForgeConfig, Language, ProjectWriter, StepOutcome, TestReport,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "polyforge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build, test and run generated multi-language projects", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit JSON log lines and JSON reports
    #[arg(long, global = true)]
    json: bool,

    /// Config file (default: ./polyforge.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the code blocks of a markdown answer into a directory
    Extract {
        /// Markdown file to read
        markdown: PathBuf,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        /// Also list third-party dependencies the blocks reference
        #[arg(short, long, value_parser = parse_language)]
        language: Option<Language>,
    },

    /// Show the project structure described in a markdown answer
    Structure {
        /// Markdown file to read
        markdown: PathBuf,

        /// Create the listed directories and empty files under this path
        #[arg(long)]
        create: Option<PathBuf>,
    },

    /// Check that a project compiles
    Compile {
        /// Project directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        #[arg(short, long, value_parser = parse_language)]
        language: Language,

        /// Write a markdown report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Fail (non-zero exit) when the gate does not pass
        #[arg(long)]
        gate: bool,
    },

    /// Run a project's tests
    Test {
        /// Project directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        #[arg(short, long, value_parser = parse_language)]
        language: Language,

        /// Skip the coverage stage
        #[arg(long)]
        no_coverage: bool,

        /// Write an HTML report to this path
        #[arg(long)]
        html: Option<PathBuf>,

        /// Write the JSON report to this path
        #[arg(long)]
        json_out: Option<PathBuf>,

        /// Write a markdown report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Minimum success rate (percent) for the gate
        #[arg(long)]
        min_success_rate: Option<f64>,

        /// Fail (non-zero exit) when the gate does not pass
        #[arg(long)]
        gate: bool,
    },

    /// Restore, build and test a project
    Build {
        /// Project directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        #[arg(short, long, value_parser = parse_language)]
        language: Language,

        /// Step to run
        #[arg(long, value_enum, default_value_t = BuildStep::Cycle)]
        step: BuildStep,
    },

    /// List the test files of a project
    Discover {
        /// Project directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        #[arg(short, long, value_parser = parse_language)]
        language: Language,
    },

    /// Check which tools and runtime pieces are available
    Tools {
        #[arg(short, long, value_parser = parse_language)]
        language: Language,

        /// Also check runtime requirements and build files of this project
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Launch a project's application
    Run {
        /// Project directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        #[arg(short, long, value_parser = parse_language)]
        language: Language,

        /// Run kind (console, test, test_coverage, debug, release, bench)
        #[arg(short, long, default_value = "console", value_parser = parse_run_kind)]
        kind: RunKind,

        /// Run the console application this many times and report timings
        #[arg(long)]
        iterations: Option<u32>,

        /// Timeout per run in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Write a markdown execution report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Group test scenarios by category
    Categorize {
        /// Scenario descriptions
        #[arg(required = true)]
        scenarios: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BuildStep {
    Restore,
    Build,
    Test,
    Cycle,
}

fn parse_language(s: &str) -> std::result::Result<Language, String> {
    s.parse().map_err(|e: polyforge_core::ForgeError| e.to_string())
}

fn parse_run_kind(s: &str) -> std::result::Result<RunKind, String> {
    s.parse().map_err(|e: polyforge_core::ForgeError| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    polyforge_core::init_tracing(cli.json, level_for_verbosity(cli.verbose));

    let config = ForgeConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    let executor: Arc<dyn CommandExecutor> = Arc::new(ProcessExecutor::new());
    let json = cli.json;

    match cli.command {
        Commands::Extract {
            markdown,
            out,
            language,
        } => cmd_extract(&markdown, &out, language, json),
        Commands::Structure { markdown, create } => {
            cmd_structure(&markdown, create.as_deref(), json)
        }
        Commands::Compile {
            dir,
            language,
            report,
            gate,
        } => cmd_compile(executor, &config, &dir, language, report.as_deref(), gate, json).await,
        Commands::Test {
            dir,
            language,
            no_coverage,
            html,
            json_out,
            report,
            min_success_rate,
            gate,
        } => {
            let mut config = config;
            if let Some(rate) = min_success_rate {
                config.gate.min_success_rate = rate;
            }
            let outputs = TestOutputs {
                html: html.as_deref(),
                json: json_out.as_deref(),
                markdown: report.as_deref(),
            };
            cmd_test(executor, config, &dir, language, !no_coverage, outputs, gate, json).await
        }
        Commands::Build {
            dir,
            language,
            step,
        } => cmd_build(executor, &config, &dir, language, step, json).await,
        Commands::Discover { dir, language } => cmd_discover(&dir, language, json),
        Commands::Tools { language, dir } => {
            cmd_tools(executor, &config, language, dir.as_deref(), json).await
        }
        Commands::Run {
            dir,
            language,
            kind,
            iterations,
            timeout,
            report,
        } => {
            let run = RunOptions {
                kind,
                iterations,
                timeout,
                report: report.as_deref(),
            };
            cmd_run(executor, &config, &dir, language, run, json).await
        }
        Commands::Categorize { scenarios } => cmd_categorize(&scenarios, json),
    }
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "✓"
    } else {
        "✗"
    }
}

fn diagnostic_line(diag: &Diagnostic) -> String {
    let location = match (&diag.file, diag.line) {
        (Some(file), Some(line)) => format!("{file}:{line}: "),
        (Some(file), None) => format!("{file}: "),
        _ => String::new(),
    };
    format!("[{}] {location}{}", diag.kind.as_str(), diag.message)
}

fn print_verdict(verdict: &GateVerdict) {
    println!("Gate: {} {}", mark(verdict.passed), verdict.message);
    for violation in &verdict.violations {
        println!("  - {violation}");
    }
}

fn finish_gate(verdict: &GateVerdict) -> Result<()> {
    if verdict.passed {
        Ok(())
    } else {
        anyhow::bail!("Gate failed: {}", verdict.violations.join("; "))
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ExtractOutput {
    written: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependencies: Option<Vec<String>>,
}

fn cmd_extract(markdown: &Path, out: &Path, language: Option<Language>, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(markdown)
        .with_context(|| format!("Failed to read {}", markdown.display()))?;
    let blocks = extract_code_blocks(&text);
    info!(blocks = blocks.len(), "extracted code blocks");

    let writer = ProjectWriter::new(out)
        .with_context(|| format!("Failed to create {}", out.display()))?;
    let written = writer.write_blocks(&blocks).context("Failed to write code blocks")?;

    let dependencies = language.map(|language| {
        blocks
            .iter()
            .flat_map(|block| extract_dependencies(&block.content, language))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>()
    });

    let output = ExtractOutput {
        written,
        dependencies,
    };
    if json {
        return print_json(&output);
    }

    println!("Wrote {} file(s) to {}", output.written.len(), out.display());
    for path in &output.written {
        println!("  {}", path.display());
    }
    if let Some(deps) = &output.dependencies {
        println!("Dependencies: {}", if deps.is_empty() { "none".to_string() } else { deps.join(", ") });
    }
    Ok(())
}

fn cmd_structure(markdown: &Path, create: Option<&Path>, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(markdown)
        .with_context(|| format!("Failed to read {}", markdown.display()))?;
    let paths = extract_project_structure(&text);
    let metadata = structure_metadata(&paths);

    let created = match create {
        Some(base) => {
            let writer = ProjectWriter::new(base)
                .with_context(|| format!("Failed to create {}", base.display()))?;
            Some(writer.create_structure(&paths).context("Failed to create structure")?)
        }
        None => None,
    };

    if json {
        return print_json(&serde_json::json!({
            "paths": paths,
            "metadata": metadata,
            "created": created,
        }));
    }

    if paths.is_empty() {
        println!("No project structure found");
        return Ok(());
    }
    for path in &paths {
        println!("{path}");
    }
    println!();
    println!(
        "{} item(s): {} file(s), {} directory(ies)",
        metadata.total_items, metadata.files, metadata.directories
    );
    if !metadata.languages.is_empty() {
        let languages: Vec<&str> = metadata.languages.iter().map(String::as_str).collect();
        println!("Languages: {}", languages.join(", "));
    }
    if let Some(created) = created {
        println!(
            "Created {} directory(ies) and {} file(s)",
            created.directories.len(),
            created.files.len()
        );
    }
    Ok(())
}

fn print_compile(report: &CompileReport) {
    println!(
        "Compile ({}): {} {}",
        report.language.display_name(),
        mark(report.success),
        if report.success { "OK" } else { "FAILED" }
    );
    println!(
        "Errors: {}, warnings: {}",
        report.summary.total_errors, report.summary.total_warnings
    );
    for diag in &report.errors {
        println!("  {}", diagnostic_line(diag));
    }
    for diag in &report.warnings {
        println!("  {}", diagnostic_line(diag));
    }

    let fixes = suggest_fixes(report);
    for fix in fixes.critical.iter().chain(&fixes.recommended) {
        println!("  fix: {fix}");
    }
}

async fn cmd_compile(
    executor: Arc<dyn CommandExecutor>,
    config: &ForgeConfig,
    dir: &Path,
    language: Language,
    report_path: Option<&Path>,
    gate: bool,
    json: bool,
) -> Result<()> {
    let report = CompilationChecker::new(executor)
        .with_timeouts(config.timeouts.clone())
        .check(dir, language)
        .await;

    if let Some(path) = report_path {
        write_text_artifact(path, &render_compile_markdown(&report))
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let verdict = gate.then(|| ForgeGate::evaluate(Some(&report), None, &config.gate));

    if json {
        print_json(&serde_json::json!({ "report": report, "gate": verdict }))?;
    } else {
        print_compile(&report);
        if let Some(verdict) = &verdict {
            print_verdict(verdict);
        }
    }

    match verdict {
        Some(verdict) => finish_gate(&verdict),
        None => Ok(()),
    }
}

struct TestOutputs<'a> {
    html: Option<&'a Path>,
    json: Option<&'a Path>,
    markdown: Option<&'a Path>,
}

fn print_test(report: &TestReport) {
    println!(
        "Tests ({}): {} test file(s) found",
        report.language.display_name(),
        report.discovery.test_files.len()
    );
    if let Some(error) = &report.execution.error {
        println!("Execution: {} {error}", mark(false));
    }
    let results = &report.results;
    println!(
        "Total: {}, passed: {}, failed: {}, skipped: {}, errored: {}",
        results.total, results.passed, results.failed, results.skipped, results.errored
    );
    if let Some(summary) = &report.summary {
        println!("Success rate: {:.2}%", summary.success_rate);
    }
    if let Some(percentage) = report.coverage.as_ref().and_then(|c| c.percentage) {
        println!("Coverage: {percentage:.2}%");
    }
    for case in results.failed_cases() {
        println!("  {} {}", mark(false), case.name);
    }
    for rec in &report.recommendations {
        println!("  [{}] {}", rec.severity.as_str(), rec.message);
    }
}

#[allow(clippy::too_many_arguments)]
async fn cmd_test(
    executor: Arc<dyn CommandExecutor>,
    config: ForgeConfig,
    dir: &Path,
    language: Language,
    include_coverage: bool,
    outputs: TestOutputs<'_>,
    gate: bool,
    json: bool,
) -> Result<()> {
    let thresholds = config.gate.clone();
    let report = TestReporter::new(executor)
        .with_config(config)
        .run(dir, language, include_coverage)
        .await;

    if let Some(path) = outputs.json {
        write_json_artifact(path, &report)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    if let Some(path) = outputs.html {
        write_text_artifact(path, &render_test_html(&report))
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    if let Some(path) = outputs.markdown {
        write_text_artifact(path, &render_test_markdown(&report))
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let verdict = gate.then(|| ForgeGate::evaluate(None, Some(&report), &thresholds));

    if json {
        print_json(&serde_json::json!({ "report": report, "gate": verdict }))?;
    } else {
        print_test(&report);
        if let Some(verdict) = &verdict {
            print_verdict(verdict);
        }
    }

    match verdict {
        Some(verdict) => finish_gate(&verdict),
        None => Ok(()),
    }
}

fn print_step(label: &str, step: &StepOutcome) {
    let code = step
        .return_code
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  {} {label} ({}ms, exit code: {code})",
        mark(step.success),
        step.duration_ms
    );
    if !step.success && !step.error.trim().is_empty() {
        for line in step.error.trim().lines().take(20) {
            println!("      {line}");
        }
    }
}

async fn cmd_build(
    executor: Arc<dyn CommandExecutor>,
    config: &ForgeConfig,
    dir: &Path,
    language: Language,
    step: BuildStep,
    json: bool,
) -> Result<()> {
    let builder = ProjectBuilder::new(executor).with_timeouts(config.timeouts.clone());

    let (label, outcome) = match step {
        BuildStep::Cycle => {
            let report = builder.full_cycle(dir, language).await;
            if json {
                print_json(&report)?;
            } else {
                println!("Build cycle ({}): {}", language.display_name(), mark(report.success));
                for (label, step) in [
                    ("restore", &report.restore),
                    ("build", &report.build),
                    ("test", &report.test),
                ] {
                    if let Some(step) = step {
                        print_step(label, step);
                    }
                }
            }
            if report.success {
                return Ok(());
            }
            anyhow::bail!("Build cycle failed");
        }
        BuildStep::Restore => ("restore", builder.restore(dir, language).await),
        BuildStep::Build => ("build", builder.build(dir, language).await),
        BuildStep::Test => ("test", builder.test(dir, language).await),
    };

    if json {
        print_json(&outcome)?;
    } else {
        print_step(label, &outcome);
    }
    if outcome.success {
        Ok(())
    } else {
        anyhow::bail!("{label} failed")
    }
}

fn cmd_discover(dir: &Path, language: Language, json: bool) -> Result<()> {
    let discovery = discover_tests(dir, language);
    if json {
        return print_json(&discovery);
    }
    if let Some(error) = &discovery.error {
        anyhow::bail!("{error}");
    }
    println!(
        "{} test file(s), ~{} test(s)",
        discovery.test_files.len(),
        discovery.test_count_estimate
    );
    for (category, files) in &discovery.categories {
        println!("{category:?}:");
        for file in files {
            println!("  {}", file.display());
        }
    }
    Ok(())
}

async fn cmd_tools(
    executor: Arc<dyn CommandExecutor>,
    config: &ForgeConfig,
    language: Language,
    dir: Option<&Path>,
    json: bool,
) -> Result<()> {
    let availability = ProjectBuilder::new(executor.clone())
        .with_timeouts(config.timeouts.clone())
        .check_tool_availability(language)
        .await;

    let (runtime, info) = match dir {
        Some(dir) => {
            let runtime = AppRunner::new(executor)
                .with_timeouts(config.timeouts.clone())
                .check_runtime_requirements(dir, language)
                .await;
            (Some(runtime), Some(build_info(dir, language)))
        }
        None => (None, None),
    };

    if json {
        return print_json(&serde_json::json!({
            "tools": availability,
            "runtime": runtime,
            "build_info": info,
        }));
    }

    println!("Tools ({}):", language.display_name());
    for (name, available) in &availability {
        println!("  {} {name}", mark(*available));
    }
    if let Some(runtime) = runtime {
        println!("Runtime: {}", if runtime.ready_to_run { "ready" } else { "not ready" });
        for (command, present) in &runtime.commands {
            println!("  {} command {command}", mark(*present));
        }
        for (pattern, found) in &runtime.files {
            println!("  {} file {pattern}", mark(*found));
        }
        for (var, set) in &runtime.environment {
            println!("  {} env {var}", mark(*set));
        }
    }
    if let Some(info) = info {
        println!(
            "Project files: {}, dependencies declared: {}",
            info.project_files.len(),
            info.has_dependencies
        );
    }
    Ok(())
}

struct RunOptions<'a> {
    kind: RunKind,
    iterations: Option<u32>,
    timeout: Option<u64>,
    report: Option<&'a Path>,
}

async fn cmd_run(
    executor: Arc<dyn CommandExecutor>,
    config: &ForgeConfig,
    dir: &Path,
    language: Language,
    options: RunOptions<'_>,
    json: bool,
) -> Result<()> {
    let runner = AppRunner::new(executor).with_timeouts(config.timeouts.clone());

    if let Some(iterations) = options.iterations {
        let report = runner
            .performance_runs(dir, language, iterations, options.timeout)
            .await;
        if json {
            print_json(&report)?;
        } else if let Some(stats) = &report.stats {
            println!(
                "{} of {} run(s) succeeded",
                report.durations_ms.len(),
                report.iterations
            );
            println!(
                "mean {:.1}ms, min {}ms, max {}ms, std-dev {:.1}ms",
                stats.mean_ms, stats.min_ms, stats.max_ms, stats.std_dev_ms
            );
        }
        return match report.error {
            Some(error) => anyhow::bail!(error),
            None => Ok(()),
        };
    }

    let record = runner
        .run_application(dir, language, options.kind, options.timeout)
        .await;
    if let Some(path) = options.report {
        let markdown = render_execution_report(&record, dir, language, options.kind);
        write_text_artifact(path, &markdown)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    if json {
        print_json(&record)?;
    } else {
        print!("{}", record.output);
        eprint!("{}", record.error_output);
        if let Some(error) = &record.error {
            eprintln!("{error}");
        }
    }
    if record.succeeded() {
        Ok(())
    } else {
        anyhow::bail!("Application exited with code {}", record.return_code)
    }
}

#[derive(Serialize)]
struct CategoryGroup {
    category: String,
    description: String,
    file_suffix: String,
    scenarios: Vec<ScenarioEntry>,
}

#[derive(Serialize)]
struct ScenarioEntry {
    scenario: String,
    method_name: String,
}

fn group_scenarios(scenarios: &[String]) -> Vec<CategoryGroup> {
    categorize_scenarios(scenarios)
        .into_iter()
        .map(|(category, items)| CategoryGroup {
            category: category.as_str().to_string(),
            description: category.description().to_string(),
            file_suffix: category.file_suffix().to_string(),
            scenarios: items
                .into_iter()
                .map(|scenario| ScenarioEntry {
                    method_name: sanitize_method_name(&scenario),
                    scenario,
                })
                .collect(),
        })
        .collect()
}

fn cmd_categorize(scenarios: &[String], json: bool) -> Result<()> {
    let groups = group_scenarios(scenarios);
    if json {
        return print_json(&groups);
    }
    for group in &groups {
        println!("{} ({}): {}", group.category, group.file_suffix, group.description);
        for entry in &group.scenarios {
            println!("  {} -> {}", entry.scenario, entry.method_name);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_test_command() {
        let cli = Cli::try_parse_from([
            "polyforge",
            "-vv",
            "test",
            "proj",
            "--language",
            "py",
            "--no-coverage",
            "--gate",
            "--min-success-rate",
            "90",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Test {
                dir,
                language,
                no_coverage,
                gate,
                min_success_rate,
                ..
            } => {
                assert_eq!(dir, PathBuf::from("proj"));
                assert_eq!(language, Language::Python);
                assert!(no_coverage);
                assert!(gate);
                assert_eq!(min_success_rate, Some(90.0));
            }
            _ => panic!("expected test command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_language() {
        assert!(Cli::try_parse_from(["polyforge", "compile", ".", "--language", "cobol"]).is_err());
    }

    #[test]
    fn test_cli_run_kind() {
        let cli = Cli::try_parse_from([
            "polyforge", "run", ".", "-l", "rust", "--kind", "test-coverage",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { kind, .. } => assert_eq!(kind, RunKind::TestCoverage),
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_cmd_extract_writes_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let markdown = dir.path().join("answer.md");
        std::fs::write(
            &markdown,
            "## app.py\n```python\nimport requests\nprint('hi')\n```\n\n## gitignore\n```\n*.pyc\n```\n",
        )
        .unwrap();
        let out = dir.path().join("project");

        cmd_extract(&markdown, &out, Some(Language::Python), true).unwrap();

        assert_eq!(
            std::fs::read_to_string(out.join("app.py")).unwrap(),
            "import requests\nprint('hi')"
        );
        assert!(out.join(".gitignore").exists());
    }

    #[test]
    fn test_cmd_structure_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let markdown = dir.path().join("answer.md");
        std::fs::write(
            &markdown,
            "## Project Structure\n```\nsrc/\nsrc/main.rs\ntests/\n```\n",
        )
        .unwrap();
        let base = dir.path().join("layout");

        cmd_structure(&markdown, Some(&base), true).unwrap();

        assert!(base.join("src").is_dir());
        assert!(base.join("src/main.rs").is_file());
    }

    #[test]
    fn test_group_scenarios() {
        let groups = group_scenarios(&[
            "user can log in".to_string(),
            "handles empty input".to_string(),
        ]);
        assert!(!groups.is_empty());
        let total: usize = groups.iter().map(|g| g.scenarios.len()).sum();
        assert_eq!(total, 2);
        assert!(groups
            .iter()
            .flat_map(|g| &g.scenarios)
            .any(|e| e.method_name == "HandlesEmptyInput"));
    }

    #[test]
    fn test_finish_gate() {
        let verdict = ForgeGate::evaluate(None, None, &Default::default());
        assert!(finish_gate(&verdict).is_ok());

        let failed = GateVerdict {
            passed: false,
            violations: vec!["1 test(s) failed".to_string()],
            message: "Gate failed with 1 violation(s)".to_string(),
        };
        let err = finish_gate(&failed).unwrap_err();
        assert!(err.to_string().contains("1 test(s) failed"));
    }
}
