use std::future::Future;
use std::pin::Pin;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionError, TransactionTrait};

use crate::error::ArtifactError;

/// Executes units of work against the relational metadata store.
///
/// A unit of work is a closure over one transaction: every statement in it
/// is applied together or not at all, at the store's default isolation
/// level. Failed units are not retried here; the failure surfaces to the
/// caller as-is, and nothing is compensated.
pub struct DbGateway {
    db: DatabaseConnection,
}

impl DbGateway {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Pooled connection for reads outside a unit of work.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Run one atomic unit of work.
    pub async fn submit<T, F>(&self, unit: F) -> Result<T, ArtifactError>
    where
        T: Send,
        F: for<'c> FnOnce(
                &'c DatabaseTransaction,
            )
                -> Pin<Box<dyn Future<Output = Result<T, ArtifactError>> + Send + 'c>>
            + Send,
    {
        self.db.transaction(unit).await.map_err(|err| match err {
            TransactionError::Connection(db_err) => db_err.into(),
            TransactionError::Transaction(artifact_err) => artifact_err,
        })
    }
}
