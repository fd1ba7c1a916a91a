use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, BufReader};

use super::error::StorageError;
use super::key::StorageKey;
use super::traits::{ArtifactStore, BoxReader};

/// Filesystem-backed artifact payload store.
///
/// Payloads are stored in a sharded directory layout derived from the key
/// digest: `{base_path}/{first 2 hex chars}/{remaining 62 hex chars}`.
/// Writes stage through a `.tmp` directory and move into place with a rename,
/// so a payload is either fully present or absent.
pub struct FilesystemArtifactStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemArtifactStore {
    /// Create a new filesystem artifact store.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    /// Compute the filesystem path for a given storage key.
    fn payload_path(&self, key: &StorageKey) -> PathBuf {
        self.base_path
            .join(key.shard_prefix())
            .join(key.shard_suffix())
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    async fn promote(&self, temp_path: &PathBuf, key: &StorageKey) -> Result<(), StorageError> {
        let payload_path = self.payload_path(key);

        if let Some(parent) = payload_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Rename replaces any previous payload for the key.
        if let Err(e) = fs::rename(temp_path, &payload_path).await {
            let _ = fs::remove_file(temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for FilesystemArtifactStore {
    async fn put(&self, key: &StorageKey, data: &[u8]) -> Result<u64, StorageError> {
        let size = data.len() as u64;
        if size > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: size,
                limit: self.max_size,
            });
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        self.promote(&temp_path, key).await?;

        Ok(size)
    }

    async fn put_stream(
        &self,
        key: &StorageKey,
        mut reader: BoxReader,
    ) -> Result<u64, StorageError> {
        let temp_path = self.temp_path();
        let mut total_bytes: u64 = 0;

        let mut buf = vec![0u8; 64 * 1024]; // 64KB read buffer
        let mut temp_file = fs::File::create(&temp_path).await?;

        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }

            total_bytes += n as u64;
            if total_bytes > self.max_size {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(StorageError::SizeLimitExceeded {
                    actual: total_bytes,
                    limit: self.max_size,
                });
            }

            tokio::io::AsyncWriteExt::write_all(&mut temp_file, &buf[..n]).await?;
        }

        tokio::io::AsyncWriteExt::flush(&mut temp_file).await?;
        drop(temp_file);

        self.promote(&temp_path, key).await?;

        Ok(total_bytes)
    }

    async fn get_stream(&self, key: &StorageKey) -> Result<BoxReader, StorageError> {
        let payload_path = self.payload_path(key);
        match fs::File::open(&payload_path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.as_str().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &StorageKey) -> Result<bool, StorageError> {
        let payload_path = self.payload_path(key);
        Ok(fs::try_exists(&payload_path).await?)
    }

    async fn delete(&self, key: &StorageKey) -> Result<bool, StorageError> {
        let payload_path = self.payload_path(key);
        match fs::remove_file(&payload_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, key: &StorageKey) -> Result<u64, StorageError> {
        let payload_path = self.payload_path(key);
        match fs::metadata(&payload_path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.as_str().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
