//! Linux MCP Server - A Model Context Protocol server for remote shell execution
//!
//! This crate provides an MCP server with a single `execute_shell` tool. A call
//! names a machine, a working directory and a shell command; the server looks
//! the machine up in a JSON host directory, opens a password-authenticated SSH
//! session to it, runs `cd <path> && <command>` and returns the combined
//! stdout/stderr.
//!
//! # Host directory
//!
//! ```json
//! [
//!   {"ip": "10.0.0.5", "user": "alice", "password": "secret", "port": 22}
//! ]
//! ```
//!
//! The file is re-read on every call, so edits take effect immediately.
//!
//! # Example Usage (CLI)
//!
//! ```bash
//! # stdio transport
//! linux-mcp-server --hosts ./hosts.json
//!
//! # streamable HTTP transport, served on every path
//! linux-mcp-server --hosts ./hosts.json --http 127.0.0.1:8080
//! ```
//!
//! # Security
//!
//! - Host keys are not verified unless `--host-key-check known-hosts` is given.
//! - The path and command are passed to the remote shell verbatim, without
//!   quoting. Only expose this server to trusted callers.

pub mod config;
pub mod error;
pub mod hosts;
pub mod invocation;
pub mod server;
pub mod ssh;
pub mod tools;

// Re-exports for convenience
pub use config::{Args, Config};
pub use error::{Result, ShellMcpError, Stage, StageError, StageResult};
pub use hosts::{HostDirectory, HostRecord};
pub use invocation::{ExecutionOutcome, ExecutionRequest, InvocationHandler};
pub use server::LinuxMcpServer;
pub use ssh::{compose_command, CommandRunner, HostKeyCheck, SessionOptions, SshExecutor};
pub use tools::ExecuteShellParams;
