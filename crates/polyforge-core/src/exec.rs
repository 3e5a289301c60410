//! Command executor trait and stage configuration.
//!
//! Defines the `CommandExecutor` async trait used by every component that
//! shells out to a build tool, plus the types describing one invocation.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::testing::ExecutionRecord;
use crate::error::ExecError;

// ---------------------------------------------------------------------------
// Stage configuration
// ---------------------------------------------------------------------------

/// A kind of tool invocation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Restore,
    Build,
    Compile,
    Test,
    Coverage,
    Clean,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Restore,
        Operation::Build,
        Operation::Compile,
        Operation::Test,
        Operation::Coverage,
        Operation::Clean,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Restore => "restore",
            Operation::Build => "build",
            Operation::Compile => "compile",
            Operation::Test => "test",
            Operation::Coverage => "coverage",
            Operation::Clean => "clean",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}


/// Configuration for a single tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageConfig {
    /// Human-readable stage name (e.g. "go_test").
    pub name: String,

    /// Command to execute (first element is executable).
    pub command: Vec<String>,

    /// Timeout in seconds; 0 disables the timeout.
    pub timeout_secs: u64,

    /// Whether this stage is enabled.
    pub enabled: bool,
}

impl StageConfig {
    /// Create a stage configuration.
    pub fn new(name: impl Into<String>, command: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            name: name.into(),
            command,
            timeout_secs,
            enabled: true,
        }
    }

    /// Append extra arguments (e.g. a file path for per-file checks).
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Disable this stage.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// The executable name, if any.
    pub fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }

    /// Command rendered as a single shell-like string.
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

// ---------------------------------------------------------------------------
// Command output
// ---------------------------------------------------------------------------

/// Captured result of a finished tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandOutput {
    /// Stage name.
    pub stage_name: String,

    /// Command that was executed.
    pub command: Vec<String>,

    /// Exit code (0 = success, -1 when terminated by a signal).
    pub exit_code: i32,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,

    /// Whether the process exited successfully.
    pub success: bool,
}

impl CommandOutput {
    /// Whether this invocation passed (exit code 0).
    pub fn passed(&self) -> bool {
        self.success && self.exit_code == 0
    }

    /// stdout and stderr joined by a newline.
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            return self.stdout.clone();
        }
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Convert into the serializable execution record.
    pub fn into_record(self) -> ExecutionRecord {
        ExecutionRecord {
            executed: true,
            command: self.command,
            output: self.stdout,
            error_output: self.stderr,
            return_code: self.exit_code,
            duration_ms: self.duration_ms,
            timed_out: false,
            error: None,
        }
    }
}

/// Fold an executor result into an execution record, keeping failures as data.
pub fn record_from(config: &StageConfig, result: Result<CommandOutput, ExecError>) -> ExecutionRecord {
    match result {
        Ok(output) => output.into_record(),
        Err(err) => {
            let timed_out = matches!(err, ExecError::Timeout { .. });
            ExecutionRecord {
                timed_out,
                // -9 marks a killed child; callers only check for non-zero.
                return_code: if timed_out { -9 } else { -1 },
                ..ExecutionRecord::not_executed(config.command.clone(), err.to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Executor trait
// ---------------------------------------------------------------------------

/// Trait for backends that run a tool invocation (real processes, fakes).
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `config` in `cwd` and capture its output.
    async fn execute(&self, config: &StageConfig, cwd: &Path) -> Result<CommandOutput, ExecError>;
}
