//! Scripted executor fake (testing only).
//!
//! `ScriptedExecutor` hands out queued responses in call order and records
//! every stage it was asked to run, so components can be tested without
//! any tool-chain installed.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use polyforge_core::{CommandExecutor, CommandOutput, ExecError, StageConfig};

/// One scripted reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedResponse {
    Exit {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },
    ToolNotFound,
    Timeout,
}

impl ScriptedResponse {
    pub fn success(stdout: impl Into<String>) -> Self {
        ScriptedResponse::Exit {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        ScriptedResponse::Exit {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// A stage the fake was asked to run.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub stage: StageConfig,
    pub cwd: PathBuf,
}

/// Executor that replays queued responses; an empty queue answers with a
/// silent exit code 0.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(responses: impl IntoIterator<Item = ScriptedResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, response: ScriptedResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Command lines of every recorded call, in order.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.stage.command_line())
            .collect()
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(&self, config: &StageConfig, cwd: &Path) -> Result<CommandOutput, ExecError> {
        self.calls.lock().unwrap().push(RecordedCall {
            stage: config.clone(),
            cwd: cwd.to_path_buf(),
        });

        let program = config
            .program()
            .ok_or_else(|| ExecError::EmptyCommand {
                stage: config.name.clone(),
            })?
            .to_string();

        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ScriptedResponse::success(""));

        match response {
            ScriptedResponse::Exit {
                exit_code,
                stdout,
                stderr,
            } => Ok(CommandOutput {
                stage_name: config.name.clone(),
                command: config.command.clone(),
                exit_code,
                stdout,
                stderr,
                duration_ms: 1,
                success: exit_code == 0,
            }),
            ScriptedResponse::ToolNotFound => Err(ExecError::ToolNotFound { tool: program }),
            ScriptedResponse::Timeout => Err(ExecError::Timeout {
                command: config.command_line(),
                secs: config.timeout_secs,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order_and_records_calls() {
        let fake = ScriptedExecutor::with_responses([
            ScriptedResponse::success("one"),
            ScriptedResponse::Timeout,
        ]);
        let stage = StageConfig::new("go_test", vec!["go".into(), "test".into()], 5);

        let first = fake.execute(&stage, Path::new("/p")).await.unwrap();
        assert_eq!(first.stdout, "one");
        let second = fake.execute(&stage, Path::new("/p")).await.unwrap_err();
        assert!(matches!(second, ExecError::Timeout { secs: 5, .. }));
        let third = fake.execute(&stage, Path::new("/p")).await.unwrap();
        assert!(third.passed());

        assert_eq!(fake.calls().len(), 3);
        assert_eq!(fake.command_lines()[0], "go test");
        assert_eq!(fake.calls()[0].cwd, PathBuf::from("/p"));
    }

    #[tokio::test]
    async fn test_tool_not_found_names_program() {
        let fake = ScriptedExecutor::with_responses([ScriptedResponse::ToolNotFound]);
        let stage = StageConfig::new("mvn_test", vec!["mvn".into(), "test".into()], 5);
        let err = fake.execute(&stage, Path::new(".")).await.unwrap_err();
        assert_eq!(err.to_string(), "tool not found: mvn");
    }
}
