use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use common::ArtifactKind;
use common::storage::{ArtifactStore, BoxReader, StorageKey};
use futures::future;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::entity::artifact;
use crate::error::ArtifactError;
use crate::gateway::DbGateway;
use crate::models::{ArtifactDescriptor, ArtifactPayload, ArtifactView};
use crate::resolvers::{CodeVersionResolver, DatasetVersionResolver};
use crate::validate;

/// Coordinates artifact metadata across the relational store, the payload
/// store, and the version registries, scoped to one attachment namespace.
///
/// Every operation is asynchronous and runs on the shared runtime and
/// connection pool. Consistency under concurrent writers comes from the
/// store's unique constraint, never from in-process locks, so multiple
/// service instances can run against the same database.
#[derive(Clone)]
pub struct ArtifactCoordinator {
    gateway: Arc<DbGateway>,
    namespace: String,
    store: Arc<dyn ArtifactStore>,
    dataset_versions: Arc<dyn DatasetVersionResolver>,
    code_versions: Arc<dyn CodeVersionResolver>,
}

/// Row data ready for insertion, produced after validation and resolution.
struct PreparedArtifact {
    key: String,
    kind: ArtifactKind,
    path_or_uri: String,
    content_type: Option<String>,
    linked_version_id: Option<String>,
}

impl ArtifactCoordinator {
    pub fn new(
        gateway: Arc<DbGateway>,
        namespace: impl Into<String>,
        store: Arc<dyn ArtifactStore>,
        dataset_versions: Arc<dyn DatasetVersionResolver>,
        code_versions: Arc<dyn CodeVersionResolver>,
    ) -> Self {
        Self {
            gateway,
            namespace: namespace.into(),
            store,
            dataset_versions,
            code_versions,
        }
    }

    /// Attachment namespace this coordinator manages.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Record a batch of artifacts for an entity.
    ///
    /// Reference descriptors are resolved first, concurrently; the metadata
    /// rows are then written as one transactional batch, so either every
    /// record becomes visible or none do. A failed resolution fails the
    /// whole batch with nothing committed. With `overwrite`, records that
    /// clash on key are replaced in place (same id, same creation time)
    /// instead of failing with `DuplicateKey`.
    #[instrument(skip(self, descriptors), fields(namespace = %self.namespace))]
    pub async fn add_artifacts(
        &self,
        entity_id: &str,
        descriptors: Vec<ArtifactDescriptor>,
        overwrite: bool,
    ) -> Result<Vec<artifact::Model>, ArtifactError> {
        if entity_id.is_empty() {
            return Err(ArtifactError::InvalidDescriptor(
                "entity id must not be empty".into(),
            ));
        }
        if descriptors.is_empty() {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        for descriptor in &descriptors {
            validate::validate_descriptor(descriptor)?;
            if !seen.insert(descriptor.key.clone()) {
                return Err(ArtifactError::DuplicateKey {
                    entity_id: entity_id.to_string(),
                    key: descriptor.key.clone(),
                });
            }
        }

        let prepared =
            future::try_join_all(descriptors.iter().map(|d| self.prepare(d))).await?;

        let keys: Vec<String> = prepared.iter().map(|p| p.key.clone()).collect();
        let namespace = self.namespace.clone();
        let entity = entity_id.to_string();

        let models = self
            .gateway
            .submit(move |txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    for row in prepared {
                        let model = artifact::ActiveModel {
                            id: Set(Uuid::now_v7()),
                            namespace: Set(namespace.clone()),
                            entity_id: Set(entity.clone()),
                            key: Set(row.key.clone()),
                            kind: Set(row.kind),
                            path_or_uri: Set(row.path_or_uri),
                            content_type: Set(row.content_type),
                            linked_version_id: Set(row.linked_version_id),
                            created_at: Set(now),
                            updated_at: Set(now),
                        };

                        let insert = artifact::Entity::insert(model);
                        let insert = if overwrite {
                            insert.on_conflict(
                                OnConflict::columns([
                                    artifact::Column::Namespace,
                                    artifact::Column::EntityId,
                                    artifact::Column::Key,
                                ])
                                .update_columns([
                                    artifact::Column::Kind,
                                    artifact::Column::PathOrUri,
                                    artifact::Column::ContentType,
                                    artifact::Column::LinkedVersionId,
                                    artifact::Column::UpdatedAt,
                                ])
                                .to_owned(),
                            )
                        } else {
                            insert
                        };

                        match insert.exec_without_returning(txn).await {
                            Ok(_) => {}
                            Err(e)
                                if matches!(
                                    e.sql_err(),
                                    Some(SqlErr::UniqueConstraintViolation(_))
                                ) =>
                            {
                                return Err(ArtifactError::DuplicateKey {
                                    entity_id: entity.clone(),
                                    key: row.key,
                                });
                            }
                            Err(e) => return Err(e.into()),
                        }
                    }

                    // Read the batch back so callers observe stored values.
                    let models = artifact::Entity::find()
                        .filter(artifact::Column::Namespace.eq(namespace.clone()))
                        .filter(artifact::Column::EntityId.eq(entity.clone()))
                        .filter(artifact::Column::Key.is_in(keys.clone()))
                        .order_by_asc(artifact::Column::Key)
                        .all(txn)
                        .await?;

                    Ok(models)
                })
            })
            .await?;

        debug!(entity_id, count = models.len(), "Recorded artifact batch");
        Ok(models)
    }

    /// List an entity's artifacts, optionally filtered by kind, ordered by
    /// creation time. Reference kinds carry registry metadata when the
    /// registry knows the version; the stored records are unchanged.
    #[instrument(skip(self), fields(namespace = %self.namespace))]
    pub async fn get_artifacts(
        &self,
        entity_id: &str,
        kind: Option<ArtifactKind>,
    ) -> Result<Vec<ArtifactView>, ArtifactError> {
        let mut query = artifact::Entity::find()
            .filter(artifact::Column::Namespace.eq(self.namespace.as_str()))
            .filter(artifact::Column::EntityId.eq(entity_id));
        if let Some(kind) = kind {
            query = query.filter(artifact::Column::Kind.eq(kind));
        }

        let records = query
            .order_by_asc(artifact::Column::CreatedAt)
            .all(self.gateway.connection())
            .await?;

        future::try_join_all(records.into_iter().map(|record| self.expand(record))).await
    }

    /// Fetch a single artifact by key.
    pub async fn get_artifact(
        &self,
        entity_id: &str,
        key: &str,
    ) -> Result<ArtifactView, ArtifactError> {
        let record = self
            .find_record(entity_id, key)
            .await?
            .ok_or_else(|| ArtifactError::no_artifact(key))?;
        self.expand(record).await
    }

    /// Remove metadata rows for the given keys.
    ///
    /// The batch is all-or-nothing: if any key is missing, nothing is
    /// deleted. Payload bytes and registry versions are left untouched; use
    /// [`delete_payloads`](Self::delete_payloads) for physical cleanup.
    #[instrument(skip(self, keys), fields(namespace = %self.namespace))]
    pub async fn delete_artifacts(
        &self,
        entity_id: &str,
        keys: &[String],
    ) -> Result<(), ArtifactError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut seen = HashSet::new();
        let mut unique: Vec<String> = Vec::with_capacity(keys.len());
        for key in keys {
            validate::validate_key(key)?;
            if seen.insert(key.clone()) {
                unique.push(key.clone());
            }
        }

        let namespace = self.namespace.clone();
        let entity = entity_id.to_string();
        let keys = unique;

        self.gateway
            .submit(move |txn| {
                Box::pin(async move {
                    let existing: Vec<String> = artifact::Entity::find()
                        .select_only()
                        .column(artifact::Column::Key)
                        .filter(artifact::Column::Namespace.eq(namespace.clone()))
                        .filter(artifact::Column::EntityId.eq(entity.clone()))
                        .filter(artifact::Column::Key.is_in(keys.clone()))
                        .into_tuple()
                        .all(txn)
                        .await?;

                    if let Some(missing) = keys.iter().find(|key| !existing.contains(*key)) {
                        return Err(ArtifactError::no_artifact(missing));
                    }

                    artifact::Entity::delete_many()
                        .filter(artifact::Column::Namespace.eq(namespace))
                        .filter(artifact::Column::EntityId.eq(entity))
                        .filter(artifact::Column::Key.is_in(keys))
                        .exec(txn)
                        .await?;

                    Ok(())
                })
            })
            .await?;

        debug!(entity_id, "Deleted artifact batch");
        Ok(())
    }

    /// Storage key addressing an artifact's payload bytes.
    ///
    /// Layout contract for external cleanup jobs: `namespace/entity_id/key`.
    pub fn payload_key(&self, entity_id: &str, key: &str) -> Result<StorageKey, ArtifactError> {
        StorageKey::from_segments([self.namespace.as_str(), entity_id, key]).map_err(Into::into)
    }

    /// Stream payload bytes into the artifact store for a blob record.
    #[instrument(skip(self, reader), fields(namespace = %self.namespace))]
    pub async fn store_payload(
        &self,
        entity_id: &str,
        key: &str,
        reader: BoxReader,
    ) -> Result<u64, ArtifactError> {
        self.require_blob_record(entity_id, key).await?;
        let storage_key = self.payload_key(entity_id, key)?;
        let size = self.store.put_stream(&storage_key, reader).await?;
        debug!(entity_id, key, size, "Stored artifact payload");
        Ok(size)
    }

    /// Open a streaming reader over a blob record's payload bytes.
    pub async fn open_payload(
        &self,
        entity_id: &str,
        key: &str,
    ) -> Result<BoxReader, ArtifactError> {
        self.require_blob_record(entity_id, key).await?;
        let storage_key = self.payload_key(entity_id, key)?;
        Ok(self.store.get_stream(&storage_key).await?)
    }

    /// Delete stored payload bytes for the given keys.
    ///
    /// This is the explicit physical-cleanup step, separate from metadata
    /// deletion: rows are left in place, and reference kinds are skipped
    /// because their versions belong to the registries. Fails `NotFound`
    /// before deleting anything when any key has no record.
    #[instrument(skip(self, keys), fields(namespace = %self.namespace))]
    pub async fn delete_payloads(
        &self,
        entity_id: &str,
        keys: &[String],
    ) -> Result<(), ArtifactError> {
        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            let record = self
                .find_record(entity_id, key)
                .await?
                .ok_or_else(|| ArtifactError::no_artifact(key))?;
            records.push(record);
        }

        for record in records {
            if record.kind != ArtifactKind::Blob {
                continue;
            }
            let storage_key = self.payload_key(entity_id, &record.key)?;
            let removed = self.store.delete(&storage_key).await?;
            debug!(entity_id, key = %record.key, removed, "Deleted artifact payload");
        }

        Ok(())
    }

    /// Turn a descriptor into row data, resolving reference kinds through
    /// the owning registry. No row is written until every descriptor in the
    /// batch has passed through here.
    async fn prepare(
        &self,
        descriptor: &ArtifactDescriptor,
    ) -> Result<PreparedArtifact, ArtifactError> {
        match &descriptor.payload {
            ArtifactPayload::Blob { path } => Ok(PreparedArtifact {
                key: descriptor.key.clone(),
                kind: ArtifactKind::Blob,
                path_or_uri: path.clone(),
                content_type: mime_guess::from_path(path).first().map(|m| m.to_string()),
                linked_version_id: None,
            }),
            ArtifactPayload::CodeVersion(request) => {
                let version_id = self.code_versions.resolve(request).await?;
                Ok(PreparedArtifact {
                    key: descriptor.key.clone(),
                    kind: ArtifactKind::CodeVersion,
                    path_or_uri: String::new(),
                    content_type: None,
                    linked_version_id: Some(version_id),
                })
            }
            ArtifactPayload::DatasetVersion(request) => {
                let resolved = self.dataset_versions.resolve(request).await?;
                Ok(PreparedArtifact {
                    key: descriptor.key.clone(),
                    kind: ArtifactKind::DatasetVersion,
                    path_or_uri: String::new(),
                    content_type: None,
                    linked_version_id: Some(resolved.version_id),
                })
            }
        }
    }

    async fn find_record(
        &self,
        entity_id: &str,
        key: &str,
    ) -> Result<Option<artifact::Model>, ArtifactError> {
        Ok(artifact::Entity::find()
            .filter(artifact::Column::Namespace.eq(self.namespace.as_str()))
            .filter(artifact::Column::EntityId.eq(entity_id))
            .filter(artifact::Column::Key.eq(key))
            .one(self.gateway.connection())
            .await?)
    }

    async fn require_blob_record(
        &self,
        entity_id: &str,
        key: &str,
    ) -> Result<artifact::Model, ArtifactError> {
        let record = self
            .find_record(entity_id, key)
            .await?
            .ok_or_else(|| ArtifactError::no_artifact(key))?;
        if record.kind != ArtifactKind::Blob {
            return Err(ArtifactError::InvalidDescriptor(format!(
                "artifact '{key}' is a {} reference and carries no payload",
                record.kind
            )));
        }
        Ok(record)
    }

    /// Attach registry metadata to reference records.
    async fn expand(&self, record: artifact::Model) -> Result<ArtifactView, ArtifactError> {
        let version = match (record.kind, record.linked_version_id.as_deref()) {
            (ArtifactKind::DatasetVersion, Some(version_id)) => {
                self.dataset_versions.describe(version_id).await?
            }
            (ArtifactKind::CodeVersion, Some(version_id)) => {
                self.code_versions.describe(version_id).await?
            }
            _ => None,
        };
        Ok(ArtifactView::from_record(record, version))
    }
}
