//! Avatar uploads.
//!
//! Files go through the [`AvatarStore`] collaborator; the default
//! [`LocalAvatarStore`] writes them under `UPLOADS_DIR` with a random name.

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Multipart field carrying the file
pub const AVATAR_FIELD: &str = "avatar";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("uploaded file is empty")]
    Empty,

    #[error("failed to write upload: {0}")]
    Io(#[from] std::io::Error),
}

/// A file received from the client, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub original_name: Option<String>,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Where and how an upload was persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub field_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub destination: String,
    pub file_name: String,
    pub path: String,
    pub size: u64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvatarStore: Send + Sync {
    /// Persist `file` as the avatar of `owner`.
    async fn store(&self, owner: &str, file: UploadedFile) -> Result<StoredFile, UploadError>;

    /// Delete a file previously returned by [`AvatarStore::store`].
    async fn remove(&self, file: &StoredFile) -> Result<(), UploadError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadsConfig {
    pub dir: PathBuf,
}

impl FromEnv for UploadsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            dir: PathBuf::from(env_or_default("UPLOADS_DIR", "uploads")),
        })
    }
}

/// Stores avatars as flat files in one directory.
#[derive(Debug, Clone)]
pub struct LocalAvatarStore {
    dir: PathBuf,
}

impl LocalAvatarStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &UploadsConfig) -> Self {
        Self::new(config.dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl AvatarStore for LocalAvatarStore {
    #[tracing::instrument(skip(self, file), fields(size = file.bytes.len()))]
    async fn store(&self, owner: &str, file: UploadedFile) -> Result<StoredFile, UploadError> {
        if file.bytes.is_empty() {
            return Err(UploadError::Empty);
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let file_name = Uuid::now_v7().simple().to_string();
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, &file.bytes).await?;

        tracing::info!(path = %path.display(), "Avatar stored");

        Ok(StoredFile {
            field_name: AVATAR_FIELD.to_string(),
            original_name: file.original_name,
            mime_type: file.mime_type,
            destination: self.dir.display().to_string(),
            file_name,
            path: path.display().to_string(),
            size: file.bytes.len() as u64,
        })
    }

    #[tracing::instrument(skip(self, file), fields(path = %file.path))]
    async fn remove(&self, file: &StoredFile) -> Result<(), UploadError> {
        tokio::fs::remove_file(&file.path).await?;
        tracing::info!("Avatar removed");
        Ok(())
    }
}
