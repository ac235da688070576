//! SSH session options
//!
//! Per-server settings applied to every session the executor opens. The
//! credentials themselves come from the host directory.

use std::time::Duration;

use clap::ValueEnum;

/// Connection timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// How the remote host's identity is checked during the SSH handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum HostKeyCheck {
    /// Accept any host key. Connections are open to man-in-the-middle attacks.
    #[default]
    Off,

    /// Verify the host key against `~/.ssh/known_hosts`
    KnownHosts,
}

/// Options for opening SSH sessions
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Bound on TCP connect, handshake and authentication
    pub connect_timeout: Duration,

    /// Bound on remote command execution (None = wait for completion)
    pub command_timeout: Option<Duration>,

    /// Host identity verification mode
    pub host_key_check: HostKeyCheck,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            command_timeout: None,
            host_key_check: HostKeyCheck::default(),
        }
    }
}

impl SessionOptions {
    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the command timeout
    pub fn with_command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Set the host key verification mode
    pub fn with_host_key_check(mut self, mode: HostKeyCheck) -> Self {
        self.host_key_check = mode;
        self
    }
}
