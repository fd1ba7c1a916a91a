use std::sync::Arc;

use common::storage::ArtifactStore;
use common::storage::filesystem::FilesystemArtifactStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::coordinator::ArtifactCoordinator;
use crate::database;
use crate::gateway::DbGateway;
use crate::resolvers::{CodeVersionResolver, DatasetVersionResolver};

/// Attachment namespace for named artifacts.
pub const ARTIFACTS: &str = "artifacts";
/// Attachment namespace for run input datasets.
pub const INPUTS: &str = "inputs";
/// Attachment namespace for run output datasets.
pub const OUTPUTS: &str = "outputs";

/// Shared backends wired once at service startup.
///
/// Holds the process-wide database gateway, payload store, and registry
/// handles; coordinators are cheap namespace-bound views over them.
#[derive(Clone)]
pub struct AttachmentServices {
    gateway: Arc<DbGateway>,
    store: Arc<dyn ArtifactStore>,
    dataset_versions: Arc<dyn DatasetVersionResolver>,
    code_versions: Arc<dyn CodeVersionResolver>,
}

impl AttachmentServices {
    pub fn new(
        gateway: Arc<DbGateway>,
        store: Arc<dyn ArtifactStore>,
        dataset_versions: Arc<dyn DatasetVersionResolver>,
        code_versions: Arc<dyn CodeVersionResolver>,
    ) -> Self {
        Self {
            gateway,
            store,
            dataset_versions,
            code_versions,
        }
    }

    /// Bootstrap from configuration: connect the pool, sync the schema, and
    /// open the filesystem payload store.
    pub async fn from_config(
        config: &AppConfig,
        dataset_versions: Arc<dyn DatasetVersionResolver>,
        code_versions: Arc<dyn CodeVersionResolver>,
    ) -> anyhow::Result<Self> {
        let db = database::init_db_with_pool(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?;
        let store = FilesystemArtifactStore::new(
            config.storage.root_dir.clone(),
            config.storage.max_artifact_size,
        )
        .await?;

        Ok(Self::new(
            Arc::new(DbGateway::new(db)),
            Arc::new(store),
            dataset_versions,
            code_versions,
        ))
    }

    /// Database handle shared by all coordinators.
    pub fn db(&self) -> &DatabaseConnection {
        self.gateway.connection()
    }

    /// Coordinator for the named-artifact namespace.
    pub fn artifacts(&self) -> ArtifactCoordinator {
        self.coordinator(ARTIFACTS)
    }

    /// Coordinator for the run-input namespace.
    pub fn inputs(&self) -> ArtifactCoordinator {
        self.coordinator(INPUTS)
    }

    /// Coordinator for the run-output namespace.
    pub fn outputs(&self) -> ArtifactCoordinator {
        self.coordinator(OUTPUTS)
    }

    fn coordinator(&self, namespace: &str) -> ArtifactCoordinator {
        ArtifactCoordinator::new(
            self.gateway.clone(),
            namespace,
            self.store.clone(),
            self.dataset_versions.clone(),
            self.code_versions.clone(),
        )
    }
}
