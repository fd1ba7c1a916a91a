use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ResolverError, VersionDetails};

/// Request resolved against the dataset version registry.
///
/// Carries either an existing version reference or a raw content
/// description. Whether an equivalent version already exists, and what
/// "equivalent" means, is owned by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetVersionRequest {
    /// Dataset the version belongs to.
    pub dataset: String,
    /// Existing version to link, when known.
    pub version: Option<String>,
    /// Content description used to find or create a version.
    pub content: Option<serde_json::Value>,
}

/// Canonical version returned by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedVersion {
    pub version_id: String,
    pub metadata: serde_json::Value,
}

/// Access to the dataset version registry.
///
/// Resolution is a slow, fallible network call from the coordinator's point
/// of view and is never assumed to complete synchronously with a metadata
/// write.
#[async_trait]
pub trait DatasetVersionResolver: Send + Sync {
    /// Resolve the request to a canonical version, creating one if and only
    /// if no equivalent version exists.
    async fn resolve(
        &self,
        request: &DatasetVersionRequest,
    ) -> Result<ResolvedVersion, ResolverError>;

    /// Look up display metadata for a known version identifier.
    async fn describe(&self, version_id: &str) -> Result<Option<VersionDetails>, ResolverError>;
}
