//! polyforge CI - tool-chain execution for generated projects
//!
//! Provides:
//! - Per-language stage tables and a subprocess executor with timeouts
//! - Compile checking into normalized diagnostics
//! - Test execution with result-file, JSON-stream and console parsing
//! - The restore/build/test cycle, application runs and gate evaluation

pub mod app;
pub mod compile;
pub mod fakes;
pub mod gate;
pub mod pipeline;
pub mod reporter;
pub mod runner;
pub mod stage;

// Re-export key types
pub use app::{render_execution_report, AppRunner, DurationStats, PerformanceReport, RuntimeCheck};
pub use compile::CompilationChecker;
pub use gate::{ForgeGate, GateVerdict};
pub use pipeline::{build_info, ProjectBuilder};
pub use reporter::{find_result_files, TestReporter};
pub use runner::ProcessExecutor;
pub use stage::{command_for, stage_for, RunKind};
