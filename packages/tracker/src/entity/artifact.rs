use common::ArtifactKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artifact")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Attachment namespace (e.g. "artifacts", "inputs", "outputs").
    #[sea_orm(unique_key = "owner_key")]
    pub namespace: String,

    /// Owning entity ID (canonical string form).
    #[sea_orm(unique_key = "owner_key")]
    pub entity_id: String,

    /// Artifact name, unique within the owner's namespace.
    #[sea_orm(unique_key = "owner_key")]
    pub key: String,

    pub kind: ArtifactKind,

    /// Logical location hint for blob artifacts; empty for reference kinds.
    pub path_or_uri: String,

    /// MIME type guessed from the path. NULL for reference kinds.
    pub content_type: Option<String>,

    /// Version identifier minted by the owning registry. NULL for blobs.
    pub linked_version_id: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
