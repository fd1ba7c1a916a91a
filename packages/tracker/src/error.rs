use common::storage::StorageError;
use sea_orm::DbErr;
use thiserror::Error;

use crate::resolvers::ResolverError;

/// Failure taxonomy for coordinator operations.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Malformed input; never reaches storage.
    #[error("invalid artifact descriptor: {0}")]
    InvalidDescriptor(String),

    /// The artifact name is already taken for the owning entity.
    #[error("artifact key '{key}' already exists for entity '{entity_id}'")]
    DuplicateKey { entity_id: String, key: String },

    /// The referenced artifact or payload does not exist.
    #[error("{0}")]
    NotFound(String),

    /// An external resolver could not produce a version identifier.
    #[error("version resolution failed: {0}")]
    ResolutionFailed(#[from] ResolverError),

    /// A database unit of work or payload store operation failed.
    #[error("storage failure: {0}")]
    StorageFailure(String),
}

impl ArtifactError {
    /// The not-found error for a missing artifact key.
    pub fn no_artifact(key: &str) -> Self {
        Self::NotFound(format!("no artifact found with key {key}"))
    }

    /// True when the failure is a caller mistake rather than a system fault.
    /// Upstream layers use this to pick a retry strategy.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDescriptor(_) | Self::DuplicateKey { .. } | Self::NotFound(_)
        )
    }
}

impl From<DbErr> for ArtifactError {
    fn from(err: DbErr) -> Self {
        Self::StorageFailure(err.to_string())
    }
}

impl From<StorageError> for ArtifactError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => {
                Self::NotFound(format!("no payload stored for artifact key {key}"))
            }
            StorageError::InvalidKey(msg) => {
                Self::InvalidDescriptor(format!("invalid storage key: {msg}"))
            }
            other => Self::StorageFailure(other.to_string()),
        }
    }
}
