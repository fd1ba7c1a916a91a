use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ResolverError, VersionDetails};

/// Code snapshot registered with the code version service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSnapshotRequest {
    pub repository: String,
    /// Commit-like identifier within the repository.
    pub commit: String,
    pub branch: Option<String>,
}

/// Access to the code version service.
#[async_trait]
pub trait CodeVersionResolver: Send + Sync {
    /// Register (or find) the snapshot and return its version identifier.
    async fn resolve(&self, request: &CodeSnapshotRequest) -> Result<String, ResolverError>;

    /// Look up display metadata for a known version identifier.
    async fn describe(&self, version_id: &str) -> Result<Option<VersionDetails>, ResolverError>;
}
