//! SSH command execution module
//!
//! This module opens short-lived SSH sessions, runs a single command on each,
//! and captures the combined output.

pub mod command;
pub mod config;
pub mod connection;
pub mod handler;

// Re-exports
pub use command::{compose_command, CommandOutput, Termination};
pub use config::{HostKeyCheck, SessionOptions};
pub use connection::{CommandRunner, SshExecutor};
pub use handler::SshHandler;
