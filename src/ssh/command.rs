//! Remote command composition and output capture
//!
//! Provides [`compose_command`] and the [`CommandOutput`] accumulator that
//! turns channel events into a success or a `CommandRun` failure.

use crate::error::{StageError, StageResult};

/// Build the remote shell line for `command` run inside `working_dir`.
///
/// Both parts are inserted verbatim. Neither is quoted or escaped, so shell
/// metacharacters in either one reach the remote shell unchanged.
pub fn compose_command(working_dir: &str, command: &str) -> String {
    format!("cd {} && {}", working_dir, command)
}

/// How the remote process ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// `exit-status` reported by the server
    Status(u32),

    /// `exit-signal` reported by the server
    Signal(String),
}

/// Output from a command execution
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Interleaved stdout and stderr, in arrival order
    pub combined: Vec<u8>,

    /// How the process ended (if reported)
    pub termination: Option<Termination>,
}

impl CommandOutput {
    /// Create a new empty CommandOutput
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of stdout or stderr
    pub fn push(&mut self, data: &[u8]) {
        self.combined.extend_from_slice(data);
    }

    pub fn set_exit_status(&mut self, status: u32) {
        self.termination = Some(Termination::Status(status));
    }

    pub fn set_exit_signal(&mut self, signal: impl Into<String>) {
        self.termination = Some(Termination::Signal(signal.into()));
    }

    /// Check if the command exited with status 0
    pub fn success(&self) -> bool {
        matches!(self.termination, Some(Termination::Status(0)))
    }

    /// Convert into the captured bytes, or a `CommandRun` error holding them.
    pub fn into_result(self) -> StageResult<Vec<u8>> {
        let message = match &self.termination {
            Some(Termination::Status(0)) => return Ok(self.combined),
            Some(Termination::Status(code)) => format!("process exited with status {}", code),
            Some(Termination::Signal(sig)) => format!("process killed by signal {}", sig),
            None => "process exited without reporting an exit status".to_string(),
        };
        Err(StageError::command_run(message, self.combined))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_command() {
        assert_eq!(compose_command("/tmp", "echo hi"), "cd /tmp && echo hi");
    }

    #[test]
    fn test_compose_command_passes_separators_through() {
        assert_eq!(
            compose_command("/var/log", "ls; rm -f x && echo 'done' | wc -l"),
            "cd /var/log && ls; rm -f x && echo 'done' | wc -l"
        );
        assert_eq!(
            compose_command("/tmp; id", "$(whoami)"),
            "cd /tmp; id && $(whoami)"
        );
    }

    #[test]
    fn test_command_output_success() {
        let mut output = CommandOutput::new();
        output.push(b"hi\n");
        output.set_exit_status(0);
        assert!(output.success());
        assert_eq!(output.into_result().unwrap(), b"hi\n".to_vec());
    }

    #[test]
    fn test_command_output_interleaves_streams() {
        let mut output = CommandOutput::new();
        output.push(b"out1\n");
        output.push(b"err1\n");
        output.push(b"out2\n");
        output.set_exit_status(0);
        assert_eq!(output.into_result().unwrap(), b"out1\nerr1\nout2\n".to_vec());
    }

    #[test]
    fn test_command_output_nonzero_exit_keeps_empty_output() {
        let mut output = CommandOutput::new();
        output.set_exit_status(3);
        assert!(!output.success());

        match output.into_result() {
            Err(StageError::CommandRun { message, output }) => {
                assert_eq!(message, "process exited with status 3");
                assert!(output.is_empty());
            }
            other => panic!("expected CommandRun, got {:?}", other),
        }
    }

    #[test]
    fn test_command_output_nonzero_exit_keeps_output() {
        let mut output = CommandOutput::new();
        output.push(b"ls: cannot access 'x': No such file or directory\n");
        output.set_exit_status(2);

        match output.into_result() {
            Err(StageError::CommandRun { output, .. }) => {
                assert_eq!(
                    output,
                    b"ls: cannot access 'x': No such file or directory\n".to_vec()
                );
            }
            other => panic!("expected CommandRun, got {:?}", other),
        }
    }

    #[test]
    fn test_command_output_signal() {
        let mut output = CommandOutput::new();
        output.set_exit_signal("KILL");
        let err = output.into_result().unwrap_err();
        assert!(err.to_string().contains("killed by signal KILL"));
    }

    #[test]
    fn test_command_output_no_exit_status() {
        let output = CommandOutput::new();
        assert!(!output.success());
        let err = output.into_result().unwrap_err();
        assert!(err.to_string().contains("without reporting an exit status"));
    }
}
