use chrono::{DateTime, Utc};
use common::ArtifactKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::artifact;
use crate::resolvers::{CodeSnapshotRequest, DatasetVersionRequest, VersionDetails};

/// A single artifact in an add batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    /// Artifact name, unique within the owning entity's namespace.
    pub key: String,
    pub payload: ArtifactPayload,
}

/// Kind-specific payload of a descriptor.
///
/// The variant fixes the artifact kind, so a descriptor cannot carry a
/// payload that contradicts its declared kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactPayload {
    /// Raw payload bytes addressed by a logical path or URI.
    Blob { path: String },
    /// Snapshot to register with the code version service.
    CodeVersion(CodeSnapshotRequest),
    /// Version to resolve against the dataset registry.
    DatasetVersion(DatasetVersionRequest),
}

impl ArtifactDescriptor {
    pub fn blob(key: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            payload: ArtifactPayload::Blob { path: path.into() },
        }
    }

    pub fn code_version(key: impl Into<String>, request: CodeSnapshotRequest) -> Self {
        Self {
            key: key.into(),
            payload: ArtifactPayload::CodeVersion(request),
        }
    }

    pub fn dataset_version(key: impl Into<String>, request: DatasetVersionRequest) -> Self {
        Self {
            key: key.into(),
            payload: ArtifactPayload::DatasetVersion(request),
        }
    }

    /// Kind implied by the payload variant.
    pub fn kind(&self) -> ArtifactKind {
        match &self.payload {
            ArtifactPayload::Blob { .. } => ArtifactKind::Blob,
            ArtifactPayload::CodeVersion(_) => ArtifactKind::CodeVersion,
            ArtifactPayload::DatasetVersion(_) => ArtifactKind::DatasetVersion,
        }
    }
}

/// Read-side view of an artifact record.
///
/// `version` is the registry expansion for reference kinds; the stored
/// record itself is unchanged by it.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactView {
    pub id: Uuid,
    pub key: String,
    pub kind: ArtifactKind,
    /// Logical location hint; empty for reference kinds.
    pub path_or_uri: String,
    pub content_type: Option<String>,
    pub linked_version_id: Option<String>,
    /// Registry metadata for reference kinds.
    pub version: Option<VersionDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ArtifactView {
    pub(crate) fn from_record(record: artifact::Model, version: Option<VersionDetails>) -> Self {
        Self {
            id: record.id,
            key: record.key,
            kind: record.kind,
            path_or_uri: record.path_or_uri,
            content_type: record.content_type,
            linked_version_id: record.linked_version_id,
            version,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<artifact::Model> for ArtifactView {
    fn from(record: artifact::Model) -> Self {
        Self::from_record(record, None)
    }
}
