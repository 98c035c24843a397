//! Persisted login record
//!
//! The login flow stores a small JSON document under [`AUTOLOGIN_DATA`]; the
//! session reads it once per `init` to pick the login path.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::{AUTOLOGIN_DATA, Config};

/// Errors reading or writing the login record
#[derive(Debug, Error)]
pub enum LoginStoreError {
    #[error("Malformed login record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// How the user logged in last time
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginRecord {
    #[serde(rename = "loginWithScatter", default)]
    pub use_wallet_extension: bool,
    #[serde(default)]
    pub auth_token: String,
    #[serde(default)]
    pub email: String,
}

/// Key-value storage holding the login record
#[async_trait]
pub trait LoginStore: Send + Sync {
    /// Read the record; `None` when nothing was stored
    async fn load(&self) -> Result<Option<LoginRecord>, LoginStoreError>;

    async fn save(&self, record: &LoginRecord) -> Result<(), LoginStoreError>;

    async fn clear(&self) -> Result<(), LoginStoreError>;
}

/// In-process store holding the raw JSON document
#[derive(Debug, Default)]
pub struct MemoryLoginStore {
    raw: RwLock<Option<String>>,
}

impl MemoryLoginStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `record`
    pub fn with_record(record: &LoginRecord) -> Result<Self, LoginStoreError> {
        Ok(Self::with_raw(serde_json::to_string(record)?))
    }

    /// Store seeded with an arbitrary document, valid or not
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: RwLock::new(Some(raw.into())),
        }
    }
}

#[async_trait]
impl LoginStore for MemoryLoginStore {
    async fn load(&self) -> Result<Option<LoginRecord>, LoginStoreError> {
        let raw = self.raw.read().await;
        raw.as_deref().map(parse_record).transpose()
    }

    async fn save(&self, record: &LoginRecord) -> Result<(), LoginStoreError> {
        let encoded = serde_json::to_string(record)?;
        *self.raw.write().await = Some(encoded);
        Ok(())
    }

    async fn clear(&self) -> Result<(), LoginStoreError> {
        *self.raw.write().await = None;
        Ok(())
    }
}

/// Store keeping the record as one JSON file
#[derive(Debug, Clone)]
pub struct FileLoginStore {
    path: PathBuf,
}

impl FileLoginStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/AUTOLOGIN_DATA.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{AUTOLOGIN_DATA}.json")))
    }

    /// Store at the configured `login_record_path`, if one is set
    pub fn from_config(config: &Config) -> Option<Self> {
        config.login_record_path.as_ref().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LoginStore for FileLoginStore {
    async fn load(&self) -> Result<Option<LoginRecord>, LoginStoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => parse_record(&raw).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No login record at {:?}", self.path);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, record: &LoginRecord) -> Result<(), LoginStoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let encoded = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&self.path, encoded).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), LoginStoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// A `null` document reads as the default record, i.e. direct-key login
fn parse_record(raw: &str) -> Result<LoginRecord, LoginStoreError> {
    let record: Option<LoginRecord> = serde_json::from_str(raw)?;
    Ok(record.unwrap_or_default())
}
