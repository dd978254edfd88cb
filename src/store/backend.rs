use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::models::Transaction;

/// Failures surfaced by the transaction store. Cloneable so the last one can
/// be kept around for display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Failed to reach transactions backend: {0}")]
    RemoteFetch(String),

    #[error("Local transaction storage failed: {0}")]
    LocalStorage(String),

    #[error("Transactions backend did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Where the authoritative collection lives.
#[async_trait]
pub trait TransactionBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// True when a confirmation rewrites the whole collection, so
    /// confirmations must run one at a time over the latest snapshot.
    fn writes_whole_collection(&self) -> bool {
        false
    }

    /// Fetches the whole collection.
    async fn load(&self) -> Result<Vec<Transaction>, StoreError>;

    /// Makes a status change durable. `snapshot` is the collection with the
    /// change already applied; backends that persist whole blobs write it,
    /// backends with a per-record endpoint ignore it.
    async fn confirm_status(
        &self,
        reference_code: &str,
        status: &str,
        snapshot: &[Transaction],
    ) -> Result<(), StoreError>;
}
