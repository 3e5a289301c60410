//! polyforge core library
//!
//! Normalizes build and test tool output for generated multi-language
//! projects into uniform diagnostic and test-result records, and provides
//! the extraction and scaffolding helpers that turn LLM markdown into a
//! project on disk.

/// Compile a regex once and reuse it for the life of the process.
#[macro_export]
macro_rules! regex {
    ($pattern:expr) => {{
        static RE: std::sync::OnceLock<$crate::__regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| $crate::__regex::Regex::new($pattern).expect("static regex compiles"))
    }};
}

#[doc(hidden)]
pub use ::regex as __regex;

pub mod config;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod exec;
pub mod extract;
pub mod language;
pub mod parse;
pub mod reporting;
pub mod scaffold;
pub mod scenario;
pub mod telemetry;

pub use config::{ForgeConfig, GateThresholds, TimeoutConfig};
pub use discovery::discover_tests;
pub use domain::{
    BuildCycleReport, BuildInfo, CompileReport, CoverageRecord, Diagnostic, DiagnosticKind,
    ErrorSummary, ExecutionRecord, FixSuggestions, OverallStatus, Recommendation, ResultSource,
    Severity, StepOutcome, TestCase, TestCategory, TestDiscovery, TestReport, TestResults,
    TestStatus, TestSummary, ToolAvailability,
};
pub use error::{ExecError, ForgeError, Result};
pub use exec::{record_from, CommandExecutor, CommandOutput, Operation, StageConfig};
pub use extract::{
    extract_code_blocks, extract_dependencies, extract_file_references,
    extract_project_structure, CodeBlock, StructureMetadata,
};
pub use language::Language;
pub use parse::{parse_compiler_output, suggest_fixes, ParsedDiagnostics};
pub use scaffold::ProjectWriter;
pub use scenario::{categorize_scenarios, sanitize_method_name, ScenarioCategory};
pub use telemetry::init_tracing;
