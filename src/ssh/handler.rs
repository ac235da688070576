//! SSH client handler implementation
//!
//! Implements the `russh::client::Handler` trait to handle SSH connection events.

use tracing::{debug, warn};

use super::config::HostKeyCheck;

/// SSH client handler for russh
///
/// Decides whether the server's host key is acceptable. With
/// [`HostKeyCheck::Off`] every key is accepted.
#[derive(Debug, Clone)]
pub struct SshHandler {
    host: String,
    port: u16,
    check: HostKeyCheck,
}

impl SshHandler {
    /// Create a handler for a connection to `host:port`
    pub fn new(host: impl Into<String>, port: u16, check: HostKeyCheck) -> Self {
        Self {
            host: host.into(),
            port,
            check,
        }
    }
}

impl russh::client::Handler for SshHandler {
    type Error = anyhow::Error;

    /// Verify the server's host key
    ///
    /// # Security Note
    /// In `Off` mode this accepts all server keys. Use `KnownHosts` mode to
    /// pin hosts against `~/.ssh/known_hosts`.
    async fn check_server_key(
        &mut self,
        server_public_key: &russh::keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        match self.check {
            HostKeyCheck::Off => Ok(true),
            HostKeyCheck::KnownHosts => {
                let known =
                    russh::keys::check_known_hosts(&self.host, self.port, server_public_key)?;
                if known {
                    debug!("Host key for {}:{} matches known_hosts", self.host, self.port);
                } else {
                    warn!(
                        "Host key for {}:{} not found in known_hosts, rejecting",
                        self.host, self.port
                    );
                }
                Ok(known)
            }
        }
    }
}
