//! SSH session executor
//!
//! Opens one SSH connection per call, runs one command on it, and tears the
//! connection down again. No state is kept between calls.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use russh::client::{self, Handle, Msg};
use russh::{Channel, ChannelMsg, Disconnect};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::command::{compose_command, CommandOutput};
use super::config::{HostKeyCheck, SessionOptions};
use super::handler::SshHandler;
use crate::error::{StageError, StageResult};
use crate::hosts::HostRecord;

/// Runs a command in a working directory on a resolved host
///
/// On success returns the combined stdout/stderr bytes. Failures are
/// `SessionEstablish` or `CommandRun` errors.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, host: &HostRecord, working_dir: &str, command: &str) -> StageResult<Vec<u8>>;
}

/// Executes commands over a fresh password-authenticated SSH session
#[derive(Debug, Clone)]
pub struct SshExecutor {
    options: SessionOptions,
}

impl Default for SshExecutor {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl SshExecutor {
    pub fn new(options: SessionOptions) -> Self {
        if options.host_key_check == HostKeyCheck::Off {
            warn!("Host key checking is OFF; use --host-key-check known-hosts to verify remote hosts");
        }
        Self { options }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Connect and authenticate, bounded by the connect timeout
    async fn connect(&self, host: &HostRecord) -> StageResult<Handle<SshHandler>> {
        let addr = host.endpoint();
        info!(
            "Establishing SSH connection to {} as user {}",
            addr, host.user
        );

        let handler = SshHandler::new(&host.ip, host.port, self.options.host_key_check);
        let ssh_config = Arc::new(client::Config::default());

        let establish = async {
            let mut session = client::connect(ssh_config, addr.as_str(), handler)
                .await
                .map_err(|e| StageError::session(format!("failed to connect to SSH: {}", e)))?;
            authenticate(&mut session, host).await?;
            Ok::<_, StageError>(session)
        };

        match timeout(self.options.connect_timeout, establish).await {
            Ok(Ok(session)) => {
                info!("SSH connection established successfully to {}", addr);
                Ok(session)
            }
            Ok(Err(e)) => {
                error!("Failed to connect to SSH at {}: {}", addr, e);
                Err(e)
            }
            Err(_) => {
                let secs = self.options.connect_timeout.as_secs();
                error!("SSH connection to {} timed out after {}s", addr, secs);
                Err(StageError::session(format!(
                    "failed to connect to SSH: connection timeout after {}s",
                    secs
                )))
            }
        }
    }

    /// Run `command_line` on a new channel of `session`
    async fn exec(&self, session: &Handle<SshHandler>, command_line: &str) -> StageResult<Vec<u8>> {
        let mut channel = session.channel_open_session().await.map_err(|e| {
            error!("Failed to create SSH session: {}", e);
            StageError::session(format!("failed to create SSH session: {}", e))
        })?;

        debug!("Executing command: {}", command_line);

        if let Err(e) = channel.exec(true, command_line).await {
            let _ = channel.close().await;
            return Err(StageError::command_run(
                format!("failed to start command: {}", e),
                Vec::new(),
            ));
        }

        let mut output = CommandOutput::new();
        let collect = collect_output(&mut channel, &mut output);

        let timed_out = match self.options.command_timeout {
            Some(limit) => timeout(limit, collect).await.err().map(|_| limit),
            None => {
                collect.await;
                None
            }
        };

        if let Some(limit) = timed_out {
            warn!("Command timed out after {}s, closing channel", limit.as_secs());
            let _ = channel.close().await;
            return Err(StageError::command_run(
                format!("command timed out after {}s", limit.as_secs()),
                output.combined,
            ));
        }

        output.into_result()
    }
}

#[async_trait]
impl CommandRunner for SshExecutor {
    async fn run(&self, host: &HostRecord, working_dir: &str, command: &str) -> StageResult<Vec<u8>> {
        let session = self.connect(host).await?;

        let started = Instant::now();
        let result = self.exec(&session, &compose_command(working_dir, command)).await;
        let elapsed = started.elapsed();

        match &result {
            Ok(output) => info!(
                "Command executed successfully in {:?}, output length: {} bytes",
                elapsed,
                output.len()
            ),
            Err(e) => error!("Command execution failed after {:?}: {}", elapsed, e),
        }

        if let Err(e) = session
            .disconnect(Disconnect::ByApplication, "", "English")
            .await
        {
            debug!("SSH disconnect from {} failed: {}", host.endpoint(), e);
        }

        result
    }
}

/// Authenticate with the user and password from the host record
async fn authenticate(session: &mut Handle<SshHandler>, host: &HostRecord) -> StageResult<()> {
    debug!("Attempting password authentication for user '{}'", host.user);

    let auth_result = session
        .authenticate_password(&host.user, &host.password)
        .await
        .map_err(|e| StageError::session(format!("failed to authenticate: {}", e)))?;

    if auth_result.success() {
        debug!("Password authentication successful");
        Ok(())
    } else {
        Err(StageError::session(format!(
            "password authentication rejected for user '{}'",
            host.user
        )))
    }
}

/// Drain channel events into `output` until the channel closes
async fn collect_output(channel: &mut Channel<Msg>, output: &mut CommandOutput) {
    while let Some(msg) = channel.wait().await {
        match msg {
            ChannelMsg::Data { data } => output.push(&data),
            // stderr (ext == 1) shares the buffer with stdout
            ChannelMsg::ExtendedData { data, .. } => output.push(&data),
            ChannelMsg::ExitStatus { exit_status } => output.set_exit_status(exit_status),
            ChannelMsg::ExitSignal { signal_name, .. } => {
                output.set_exit_signal(format!("{:?}", signal_name))
            }
            ChannelMsg::Close => break,
            _ => {}
        }
    }

    debug!(
        "Command completed: termination={:?}, output_len={}",
        output.termination,
        output.combined.len()
    );
}
