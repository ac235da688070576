//! Configuration and CLI argument parsing for the Linux MCP Server

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, ShellMcpError};
use crate::ssh::config::{HostKeyCheck, DEFAULT_CONNECT_TIMEOUT_SECS};
use crate::ssh::SessionOptions;

/// Default location of the host directory, relative to the working directory
pub const DEFAULT_HOSTS_FILE: &str = "hosts.json";

/// Linux MCP Server CLI Arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "linux-mcp-server")]
#[command(version)]
#[command(about = "MCP server executing shell commands on remote Linux machines via SSH")]
pub struct Args {
    /// Path to the host directory (JSON array of {ip, user, password, port})
    #[arg(long, default_value = DEFAULT_HOSTS_FILE, env = "LINUX_MCP_HOSTS")]
    pub hosts: PathBuf,

    /// If set, serve streamable HTTP at this address instead of stdin/stdout
    #[arg(long, env = "LINUX_MCP_HTTP")]
    pub http: Option<String>,

    /// SSH connection timeout in seconds
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS, env = "LINUX_MCP_CONNECT_TIMEOUT")]
    pub connect_timeout: u64,

    /// Remote command timeout in seconds (0 = wait for completion)
    #[arg(long, default_value_t = 0, env = "LINUX_MCP_COMMAND_TIMEOUT")]
    pub command_timeout: u64,

    /// Host key verification mode
    #[arg(long, value_enum, default_value_t = HostKeyCheck::Off, env = "LINUX_MCP_HOST_KEY_CHECK")]
    pub host_key_check: HostKeyCheck,
}

/// Parsed and validated configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host directory file
    pub hosts_file: PathBuf,

    /// HTTP listen address (None = stdio)
    pub http_addr: Option<SocketAddr>,

    /// SSH connection timeout
    pub connect_timeout: Duration,

    /// Remote command timeout (None = unlimited)
    pub command_timeout: Option<Duration>,

    /// Host key verification mode
    pub host_key_check: HostKeyCheck,
}

impl Config {
    /// Create Config from CLI Args
    pub fn from_args(args: Args) -> Result<Self> {
        validate_args(&args)?;

        let http_addr = match args.http.as_deref() {
            Some(addr) => Some(parse_http_addr(addr)?),
            None => None,
        };

        Ok(Config {
            hosts_file: args.hosts,
            http_addr,
            connect_timeout: Duration::from_secs(args.connect_timeout),
            command_timeout: (args.command_timeout > 0)
                .then(|| Duration::from_secs(args.command_timeout)),
            host_key_check: args.host_key_check,
        })
    }

    /// Session options derived from this configuration
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions::default()
            .with_connect_timeout(self.connect_timeout)
            .with_command_timeout(self.command_timeout)
            .with_host_key_check(self.host_key_check)
    }
}

/// Validate CLI arguments
fn validate_args(args: &Args) -> Result<()> {
    let mut errors = Vec::new();

    if args.hosts.as_os_str().is_empty() {
        errors.push("--hosts must not be empty".to_string());
    }

    if args.connect_timeout == 0 {
        errors.push("--connect-timeout must be greater than 0".to_string());
    }

    if let Some(addr) = args.http.as_deref() {
        if let Err(e) = parse_http_addr(addr) {
            errors.push(e.to_string());
        }
    }

    if !errors.is_empty() {
        return Err(ShellMcpError::Config(errors.join("\n")));
    }

    Ok(())
}

/// Parse the `--http` address.
///
/// A bare `:port` (as accepted by many Go servers) binds all interfaces.
pub fn parse_http_addr(value: &str) -> Result<SocketAddr> {
    let normalized = if value.starts_with(':') {
        format!("0.0.0.0{}", value)
    } else {
        value.to_string()
    };

    normalized
        .parse()
        .map_err(|e| ShellMcpError::config(format!("invalid --http address '{}': {}", value, e)))
}
