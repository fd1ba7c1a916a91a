use std::fmt;

use sha2::{Digest, Sha256};

use super::error::StorageError;

/// Maximum accepted key length in bytes.
const MAX_KEY_LEN: usize = 1024;

/// A validated, opaque key addressing payload bytes in an artifact store.
///
/// Keys are free-form path-like strings (e.g. `artifacts/run-42/model.pkl`).
/// Stores derive their physical layout from the key; callers never observe
/// that layout directly.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn new(raw: impl Into<String>) -> Result<Self, StorageError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(StorageError::InvalidKey("key must not be empty".into()));
        }
        if raw.len() > MAX_KEY_LEN {
            return Err(StorageError::InvalidKey(format!(
                "key exceeds {MAX_KEY_LEN} bytes"
            )));
        }
        if raw.chars().any(char::is_control) {
            return Err(StorageError::InvalidKey(
                "key must not contain control characters".into(),
            ));
        }
        Ok(Self(raw))
    }

    /// Join path-like segments into a single key.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, StorageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = segments
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("/");
        Self::new(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn digest(&self) -> [u8; 32] {
        Sha256::digest(self.0.as_bytes()).into()
    }

    /// First 2 hex characters of the key digest (shard directory).
    pub fn shard_prefix(&self) -> String {
        hex::encode(&self.digest()[..1])
    }

    /// Remaining 62 hex characters of the key digest (filename within shard).
    pub fn shard_suffix(&self) -> String {
        hex::encode(&self.digest()[1..])
    }
}

impl fmt::Debug for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageKey({})", self.0)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
