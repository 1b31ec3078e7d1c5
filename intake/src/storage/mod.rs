use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

pub use self::config::StorageConfig;

mod config;

const FILE_PREFIX: &str = "config-";
const FILE_EXTENSION: &str = ".json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to resolve directory {}: {source}", .path.display())]
    ResolveDir { path: PathBuf, source: io::Error },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to move {} to {}: {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

/// Flat-file storage for submitted configs.
///
/// Every call to [`ConfigStore::store`] creates a new file named after a
/// fresh UUID, so concurrent writers never touch the same path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            dir: config.dir.clone(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `value` pretty-printed and returns the absolute path of the new file.
    pub async fn store<T: Serialize>(&self, value: &T) -> Result<PathBuf, StoreError> {
        let data = serde_json::to_vec_pretty(value)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::CreateDir {
                path: self.dir.clone(),
                source,
            })?;
        let dir = std::path::absolute(&self.dir).map_err(|source| StoreError::ResolveDir {
            path: self.dir.clone(),
            source,
        })?;

        let name = file_name(Uuid::new_v4());
        let path = dir.join(&name);
        let tmp_path = dir.join(format!(".{name}.tmp"));

        if let Err(source) = write_new(&tmp_path, &data).await {
            tokio::fs::remove_file(&tmp_path).await.ok();
            return Err(StoreError::Write {
                path: tmp_path,
                source,
            });
        }

        if let Err(source) = tokio::fs::rename(&tmp_path, &path).await {
            tokio::fs::remove_file(&tmp_path).await.ok();
            return Err(StoreError::Rename {
                from: tmp_path,
                to: path,
                source,
            });
        }

        Ok(path)
    }
}

fn file_name(id: Uuid) -> String {
    format!("{FILE_PREFIX}{id}{FILE_EXTENSION}")
}

async fn write_new(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(data).await?;
    file.sync_all().await
}
