//! Invocation handler
//!
//! Runs one `execute_shell` request through the pipeline
//! (load hosts → resolve target → run command) and folds every outcome,
//! including each failure, into an [`ExecutionOutcome`].

use std::sync::Arc;

use tracing::{error, info};

use crate::error::{Stage, StageError, StageResult};
use crate::hosts::{self, HostDirectory};
use crate::ssh::CommandRunner;

/// One command to run on one machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// Host directory identifier of the machine
    pub target: String,

    /// Directory to `cd` into before running the command
    pub working_dir: String,

    /// Shell command text
    pub command: String,
}

/// Result of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Success {
        output: Vec<u8>,
    },
    Failure {
        stage: Stage,
        message: String,
        partial_output: Option<Vec<u8>>,
    },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success { .. })
    }

    /// Flatten into the text returned to the MCP client.
    ///
    /// Failures are prefixed by stage; captured output, when present, follows
    /// the message on an `Output:` line.
    pub fn render(&self) -> String {
        match self {
            ExecutionOutcome::Success { output } => String::from_utf8_lossy(output).into_owned(),
            ExecutionOutcome::Failure {
                stage,
                message,
                partial_output,
            } => {
                let prefix = match stage {
                    Stage::DirectoryLoad => "Error loading host configurations",
                    Stage::DirectoryLookup => "Error finding host configuration",
                    Stage::SessionEstablish | Stage::CommandRun => "SSH execution error",
                };
                match partial_output {
                    Some(out) => format!(
                        "{}: {}\nOutput: {}",
                        prefix,
                        message,
                        String::from_utf8_lossy(out)
                    ),
                    None => format!("{}: {}", prefix, message),
                }
            }
        }
    }
}

impl From<StageError> for ExecutionOutcome {
    fn from(err: StageError) -> Self {
        let stage = err.stage();
        let message = err.to_string();
        let partial_output = match err {
            StageError::CommandRun { output, .. } => Some(output),
            _ => None,
        };
        ExecutionOutcome::Failure {
            stage,
            message,
            partial_output,
        }
    }
}

/// Orchestrates host lookup and command execution for each request
#[derive(Clone)]
pub struct InvocationHandler {
    directory: HostDirectory,
    runner: Arc<dyn CommandRunner>,
}

impl InvocationHandler {
    pub fn new(directory: HostDirectory, runner: Arc<dyn CommandRunner>) -> Self {
        Self { directory, runner }
    }

    pub fn directory(&self) -> &HostDirectory {
        &self.directory
    }

    /// Handle one request. Never fails; errors become `Failure` outcomes.
    pub async fn handle(&self, request: &ExecutionRequest) -> ExecutionOutcome {
        info!(
            "Received execute_shell call - IP: {}, Path: {}, Shell: {}",
            request.target, request.working_dir, request.command
        );

        match self.execute(request).await {
            Ok(output) => {
                info!("Tool call completed successfully for IP: {}", request.target);
                ExecutionOutcome::Success { output }
            }
            Err(e) => {
                let outcome = ExecutionOutcome::from(e);
                if let ExecutionOutcome::Failure { stage, message, .. } = &outcome {
                    error!("Tool call failed at {}: {}", stage, message);
                }
                outcome
            }
        }
    }

    async fn execute(&self, request: &ExecutionRequest) -> StageResult<Vec<u8>> {
        let records = self.directory.load_all().await?;
        let host = hosts::resolve(&records, &request.target)?;
        self.runner
            .run(host, &request.working_dir, &request.command)
            .await
    }
}

impl std::fmt::Debug for InvocationHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationHandler")
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}
