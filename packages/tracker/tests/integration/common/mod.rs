use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use ::common::storage::filesystem::FilesystemArtifactStore;
use async_trait::async_trait;
use tokio::sync::Mutex;

use tracker::AttachmentServices;
use tracker::gateway::DbGateway;
use tracker::models::ArtifactDescriptor;
use tracker::resolvers::{
    CodeSnapshotRequest, CodeVersionResolver, DatasetVersionRequest, DatasetVersionResolver,
    ResolvedVersion, ResolverError, VersionDetails,
};

/// In-memory dataset version registry.
///
/// Equivalence rule: requests with the same dataset and the same content
/// description resolve to the same version id; an explicit version
/// reference is returned as-is.
pub struct FakeDatasetRegistry {
    versions: Mutex<HashMap<String, String>>,
    counter: AtomicU32,
    unavailable: AtomicBool,
}

impl FakeDatasetRegistry {
    pub fn new() -> Self {
        Self {
            versions: Mutex::new(HashMap::new()),
            counter: AtomicU32::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make subsequent resolve calls fail.
    pub fn set_unavailable(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DatasetVersionResolver for FakeDatasetRegistry {
    async fn resolve(
        &self,
        request: &DatasetVersionRequest,
    ) -> Result<ResolvedVersion, ResolverError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ResolverError::Unavailable("dataset registry offline".into()));
        }

        if let Some(version) = &request.version {
            return Ok(ResolvedVersion {
                version_id: version.clone(),
                metadata: serde_json::json!({ "dataset": request.dataset }),
            });
        }

        let fingerprint = format!(
            "{}:{}",
            request.dataset,
            request.content.clone().unwrap_or_default()
        );
        let mut versions = self.versions.lock().await;
        let next = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let version_id = versions
            .entry(fingerprint)
            .or_insert_with(|| format!("ds-v{next}"))
            .clone();

        Ok(ResolvedVersion {
            version_id,
            metadata: serde_json::json!({ "dataset": request.dataset }),
        })
    }

    async fn describe(&self, version_id: &str) -> Result<Option<VersionDetails>, ResolverError> {
        Ok(Some(VersionDetails {
            version_id: version_id.to_string(),
            label: Some(format!("dataset version {version_id}")),
            metadata: serde_json::json!({ "registry": "fake-dataset" }),
        }))
    }
}

/// In-memory code version registry keyed on repository and commit.
pub struct FakeCodeRegistry;

#[async_trait]
impl CodeVersionResolver for FakeCodeRegistry {
    async fn resolve(&self, request: &CodeSnapshotRequest) -> Result<String, ResolverError> {
        Ok(format!("code-{}", request.commit))
    }

    async fn describe(&self, version_id: &str) -> Result<Option<VersionDetails>, ResolverError> {
        Ok(Some(VersionDetails {
            version_id: version_id.to_string(),
            label: None,
            metadata: serde_json::json!({ "registry": "fake-code" }),
        }))
    }
}

/// Test fixture: SQLite-backed services with fake registries and a tempdir
/// payload store.
pub struct TestHarness {
    pub services: AttachmentServices,
    pub store: Arc<FilesystemArtifactStore>,
    pub dataset: Arc<FakeDatasetRegistry>,
    _tmp: tempfile::TempDir,
}

impl TestHarness {
    pub async fn spawn() -> Self {
        let tmp = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = tmp.path().join("metadata.db");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let db = tracker::database::init_db_with_pool(&db_url, 5, 1)
            .await
            .expect("Failed to initialize test database");

        let store = Arc::new(
            FilesystemArtifactStore::new(tmp.path().join("payloads"), 10 * 1024 * 1024)
                .await
                .expect("Failed to create payload store"),
        );
        let dataset = Arc::new(FakeDatasetRegistry::new());

        let services = AttachmentServices::new(
            Arc::new(DbGateway::new(db)),
            store.clone(),
            dataset.clone(),
            Arc::new(FakeCodeRegistry),
        );

        Self {
            services,
            store,
            dataset,
            _tmp: tmp,
        }
    }
}

/// Blob descriptor shorthand.
pub fn blob(key: &str, path: &str) -> ArtifactDescriptor {
    ArtifactDescriptor::blob(key, path)
}

/// Dataset descriptor carrying a raw content description.
pub fn dataset_content(key: &str, dataset: &str, content: serde_json::Value) -> ArtifactDescriptor {
    ArtifactDescriptor::dataset_version(
        key,
        DatasetVersionRequest {
            dataset: dataset.into(),
            version: None,
            content: Some(content),
        },
    )
}

/// Dataset descriptor linking an existing version.
pub fn dataset_reference(key: &str, dataset: &str, version: &str) -> ArtifactDescriptor {
    ArtifactDescriptor::dataset_version(
        key,
        DatasetVersionRequest {
            dataset: dataset.into(),
            version: Some(version.into()),
            content: None,
        },
    )
}

/// Code snapshot descriptor shorthand.
pub fn code_snapshot(key: &str, commit: &str) -> ArtifactDescriptor {
    ArtifactDescriptor::code_version(
        key,
        CodeSnapshotRequest {
            repository: "git@example.com:team/model.git".into(),
            commit: commit.into(),
            branch: Some("main".into()),
        },
    )
}
