use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::error::StorageError;
use super::hash::ContentHash;
use super::traits::ByteStore;

/// Blob bytes on local disk, laid out as `{root}/{2 hex}/{62 hex}`.
///
/// Writes go to `{root}/.tmp` first and are renamed into place, so a reader
/// never observes a partially written blob and concurrent writers of the same
/// content simply overwrite each other with identical bytes.
pub struct FilesystemByteStore {
    root: PathBuf,
    max_size: u64,
}

impl FilesystemByteStore {
    pub async fn open(root: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self { root, max_size })
    }

    fn blob_path(&self, hash: &ContentHash) -> PathBuf {
        self.root.join(hash.shard_path())
    }

    fn temp_path(&self) -> PathBuf {
        self.root.join(".tmp").join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl ByteStore for FilesystemByteStore {
    async fn put(&self, data: &[u8]) -> Result<ContentHash, StorageError> {
        let actual = data.len() as u64;
        if actual > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual,
                limit: self.max_size,
            });
        }

        let hash = ContentHash::of(data);
        let blob_path = self.blob_path(&hash);
        if fs::try_exists(&blob_path).await? {
            debug!(%hash, "blob bytes already present");
            return Ok(hash);
        }

        let temp_path = self.temp_path();
        let written = async {
            fs::write(&temp_path, data).await?;
            if let Some(parent) = blob_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::rename(&temp_path, &blob_path).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!(%hash, size = actual, "stored blob bytes");
        Ok(hash)
    }

    async fn get(&self, hash: &ContentHash) -> Result<Vec<u8>, StorageError> {
        match fs::read(self.blob_path(hash)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(hash.to_hex())),
            Err(e) => Err(e.into()),
        }
    }
}
