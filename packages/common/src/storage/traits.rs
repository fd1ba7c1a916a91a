use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::key::StorageKey;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Key-addressed artifact payload storage.
///
/// Writing to an existing key replaces the previous payload.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store bytes under the key and return the stored size.
    async fn put(&self, key: &StorageKey, data: &[u8]) -> Result<u64, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(key, reader).await
    }

    /// Store data from an async reader under the key and return the stored size.
    async fn put_stream(&self, key: &StorageKey, reader: BoxReader) -> Result<u64, StorageError>;

    /// Retrieve all payload bytes stored under the key.
    async fn get(&self, key: &StorageKey) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(key).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Retrieve the payload as a streaming async reader.
    async fn get_stream(&self, key: &StorageKey) -> Result<BoxReader, StorageError>;

    /// Check whether a payload exists under the key.
    async fn exists(&self, key: &StorageKey) -> Result<bool, StorageError>;

    /// Delete the payload stored under the key.
    ///
    /// Returns `true` if a payload was deleted, `false` if none was stored.
    async fn delete(&self, key: &StorageKey) -> Result<bool, StorageError>;

    /// Get the size of the stored payload in bytes.
    async fn size(&self, key: &StorageKey) -> Result<u64, StorageError>;
}
