//! Error types for the Linux MCP Server
//!
//! Every failure an `execute_shell` invocation can hit is a [`StageError`],
//! tagged with the [`Stage`] it happened in. The tags survive until the
//! invocation boundary, where they are flattened into text for the MCP client.
//! [`ShellMcpError`] adds the errors that can only happen at startup.

use std::fmt;

use thiserror::Error;

/// Main error type for the Linux MCP Server
#[derive(Debug, Error)]
pub enum ShellMcpError {
    /// A pipeline failure surfaced outside an invocation
    #[error(transparent)]
    Stage(#[from] StageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// MCP transport failed to start or stopped abnormally
    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias using ShellMcpError
pub type Result<T> = std::result::Result<T, ShellMcpError>;

/// Result type alias for the invocation pipeline
pub type StageResult<T> = std::result::Result<T, StageError>;

/// Failure inside one invocation
#[derive(Debug, Error)]
pub enum StageError {
    /// The host directory file is missing, unreadable or malformed
    #[error("{0}")]
    DirectoryLoad(String),

    /// No host directory entry matches the requested machine
    #[error("host configuration not found for IP: {0}")]
    DirectoryLookup(String),

    /// The SSH connection, authentication or channel setup failed
    #[error("{0}")]
    SessionEstablish(String),

    /// The remote command completed abnormally
    #[error("command execution failed: {message}")]
    CommandRun {
        /// Why the command is considered failed
        message: String,
        /// Combined stdout/stderr captured before the failure
        output: Vec<u8>,
    },
}

/// Pipeline stage an invocation failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    DirectoryLoad,
    DirectoryLookup,
    SessionEstablish,
    CommandRun,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::DirectoryLoad => "directory-load",
            Stage::DirectoryLookup => "directory-lookup",
            Stage::SessionEstablish => "session-establish",
            Stage::CommandRun => "command-run",
        };
        f.write_str(name)
    }
}

impl StageError {
    /// Create a directory load error from a string
    pub fn directory_load(msg: impl Into<String>) -> Self {
        StageError::DirectoryLoad(msg.into())
    }

    /// Create a session establishment error from a string
    pub fn session(msg: impl Into<String>) -> Self {
        StageError::SessionEstablish(msg.into())
    }

    /// Create a command failure carrying the output captured so far
    pub fn command_run(msg: impl Into<String>, output: Vec<u8>) -> Self {
        StageError::CommandRun {
            message: msg.into(),
            output,
        }
    }

    /// The invocation stage this error belongs to
    pub fn stage(&self) -> Stage {
        match self {
            StageError::DirectoryLoad(_) => Stage::DirectoryLoad,
            StageError::DirectoryLookup(_) => Stage::DirectoryLookup,
            StageError::SessionEstablish(_) => Stage::SessionEstablish,
            StageError::CommandRun { .. } => Stage::CommandRun,
        }
    }
}

impl ShellMcpError {
    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        ShellMcpError::Config(msg.into())
    }

    /// The invocation stage this error belongs to, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ShellMcpError::Stage(e) => Some(e.stage()),
            ShellMcpError::Config(_) | ShellMcpError::Io(_) | ShellMcpError::Server(_) => None,
        }
    }
}
