//! Host directory
//!
//! Maps machine identifiers to SSH credentials. The directory is a JSON
//! array stored on disk:
//!
//! ```json
//! [{"ip": "10.0.0.5", "user": "alice", "password": "secret", "port": 22}]
//! ```
//!
//! The file is read fresh on every invocation; nothing is cached.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, error, info};

use crate::error::{StageError, StageResult};

/// Credentials for one remote machine
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct HostRecord {
    /// Machine identifier, also used as the address to dial
    pub ip: String,

    /// Login user
    pub user: String,

    /// Login password
    pub password: String,

    /// SSH port
    pub port: u16,
}

impl HostRecord {
    /// `host:port` endpoint for this record
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

impl fmt::Debug for HostRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostRecord")
            .field("ip", &self.ip)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .finish()
    }
}

/// Handle on the host directory file
#[derive(Debug, Clone)]
pub struct HostDirectory {
    path: PathBuf,
}

impl HostDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse every record in the directory file.
    ///
    /// Either the whole file parses or a `DirectoryLoad` error is returned;
    /// a partially valid file never yields a partial list.
    pub async fn load_all(&self) -> StageResult<Vec<HostRecord>> {
        info!("Loading host configurations from {}", self.path.display());

        let data = tokio::fs::read(&self.path).await.map_err(|e| {
            error!("Failed to read {}: {}", self.path.display(), e);
            StageError::directory_load(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let records = parse_records(&data).map_err(|e| {
            error!("Failed to parse {}: {}", self.path.display(), e);
            StageError::directory_load(format!(
                "failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })?;

        info!("Loaded {} host configurations", records.len());
        Ok(records)
    }
}

fn parse_records(data: &[u8]) -> std::result::Result<Vec<HostRecord>, String> {
    let records: Vec<HostRecord> = serde_json::from_slice(data).map_err(|e| e.to_string())?;

    if let Some(bad) = records.iter().find(|r| r.port == 0) {
        return Err(format!("invalid port 0 for host {}", bad.ip));
    }

    Ok(records)
}

/// Find the first record whose identifier equals `target` exactly.
pub fn resolve<'a>(records: &'a [HostRecord], target: &str) -> StageResult<&'a HostRecord> {
    debug!("Looking for host configuration for IP: {}", target);

    match records.iter().find(|r| r.ip == target) {
        Some(record) => {
            info!(
                "Found host configuration for IP: {}, user: {}, port: {}",
                target, record.user, record.port
            );
            Ok(record)
        }
        None => {
            info!("Host configuration not found for IP: {}", target);
            Err(StageError::DirectoryLookup(target.to_string()))
        }
    }
}
