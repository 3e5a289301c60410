//! Domain models for polyforge.
//!
//! Canonical definitions for the normalized records:
//! - `Diagnostic`: one error or warning reduced from tool output
//! - `CompileReport`: outcome of a compilation check
//! - `TestResults` / `TestReport`: parsed test counts and the full test run
//! - `BuildCycleReport`: restore -> build -> test outcome

pub mod build;
pub mod compile;
pub mod diagnostic;
pub mod testing;

pub use build::{BuildCycleReport, BuildInfo, StepOutcome, ToolAvailability};
pub use compile::{CompileReport, ErrorSummary, FixSuggestions};
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use testing::{
    CoverageRecord, ExecutionRecord, OverallStatus, Recommendation, ResultSource, TestCase,
    TestCategory, TestDiscovery, TestReport, TestResults, TestStatus, TestSummary,
};
