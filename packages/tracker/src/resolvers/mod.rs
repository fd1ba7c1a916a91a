mod code;
mod dataset;

pub use code::{CodeSnapshotRequest, CodeVersionResolver};
pub use dataset::{DatasetVersionRequest, DatasetVersionResolver, ResolvedVersion};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a version resolver.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The resolver could not be reached or failed internally.
    #[error("resolver unavailable: {0}")]
    Unavailable(String),

    /// The resolver refused the request.
    #[error("resolution rejected: {0}")]
    Rejected(String),
}

/// Human-readable version metadata attached to reference artifacts on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionDetails {
    pub version_id: String,
    /// Display label, when the registry carries one.
    pub label: Option<String>,
    /// Registry-owned metadata document.
    pub metadata: serde_json::Value,
}
