use std::time::Duration;

use sea_orm::sea_query::{Index, MysqlQueryBuilder, PostgresQueryBuilder, SqliteQueryBuilder};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr};
use tracing::info;

use crate::entity::artifact;

/// Connect to the metadata store with default pool bounds.
pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    init_db_with_pool(db_url, 100, 5).await
}

/// Connect to the metadata store, sync the schema, and ensure indexes.
pub async fn init_db_with_pool(
    db_url: &str,
    max_connections: u32,
    min_connections: u32,
) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    opt.max_connections(max_connections)
        .min_connections(min_connections)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("tracker::entity::*")
        .sync(&db)
        .await?;

    ensure_indexes(&db).await?;

    Ok(db)
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so the entity listing index is created manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_artifact_namespace_entity")
        .table(artifact::Entity)
        .col(artifact::Column::Namespace)
        .col(artifact::Column::EntityId)
        .to_owned();

    let sql = match db.get_database_backend() {
        DbBackend::Postgres => stmt.to_string(PostgresQueryBuilder),
        DbBackend::Sqlite => stmt.to_string(SqliteQueryBuilder),
        DbBackend::MySql => stmt.to_string(MysqlQueryBuilder),
        _ => unreachable!("unsupported database backend"),
    };

    match db.execute_unprepared(&sql).await {
        Ok(_) => {
            info!("Ensured index idx_artifact_namespace_entity exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_artifact_namespace_entity: {}", e);
        }
    }

    Ok(())
}
