//! Subprocess execution of tool-chain stages.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use polyforge_core::{CommandExecutor, CommandOutput, ExecError, StageConfig};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Runs stages as real child processes.
///
/// The child is spawned with `kill_on_drop`, so when the timeout elapses
/// and the wait future is dropped the process is killed with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, config: &StageConfig, cwd: &Path) -> Result<CommandOutput, ExecError> {
        let start = Instant::now();

        let (exe, args) = config
            .command
            .split_first()
            .ok_or_else(|| ExecError::EmptyCommand {
                stage: config.name.clone(),
            })?;
        let command_line = config.command_line();

        info!(
            stage = %config.name,
            command = %command_line,
            cwd = %cwd.display(),
            "executing stage"
        );

        let child = Command::new(exe)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                if source.kind() == ErrorKind::NotFound {
                    warn!(stage = %config.name, tool = %exe, "tool not found");
                    ExecError::ToolNotFound { tool: exe.clone() }
                } else {
                    warn!(stage = %config.name, error = %source, "spawn failed");
                    ExecError::Spawn {
                        command: command_line.clone(),
                        source,
                    }
                }
            })?;

        let waited = if config.timeout_secs > 0 {
            tokio::time::timeout(
                Duration::from_secs(config.timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| {
                warn!(
                    stage = %config.name,
                    timeout_secs = config.timeout_secs,
                    "stage timed out"
                );
                ExecError::Timeout {
                    command: command_line.clone(),
                    secs: config.timeout_secs,
                }
            })?
        } else {
            child.wait_with_output().await
        };

        let output = waited.map_err(|source| ExecError::Spawn {
            command: command_line.clone(),
            source,
        })?;

        let duration_ms = start.elapsed().as_millis() as u64;
        let exit_code = output.status.code().unwrap_or(-1);
        let success = output.status.success();

        debug!(
            stage = %config.name,
            exit_code,
            duration_ms,
            success,
            "stage finished"
        );

        Ok(CommandOutput {
            stage_name: config.name.clone(),
            command: config.command.clone(),
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration_ms,
            success,
        })
    }
}
