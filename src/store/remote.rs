use async_trait::async_trait;

use super::backend::{StoreError, TransactionBackend};
use crate::clients::transactions::TransactionsClient;
use crate::models::Transaction;

/// Backed by a REST resource; status changes go out one record at a time.
pub struct RemoteBackend {
    client: TransactionsClient,
}

impl RemoteBackend {
    #[must_use]
    pub const fn new(client: TransactionsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TransactionBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn load(&self) -> Result<Vec<Transaction>, StoreError> {
        self.client
            .list()
            .await
            .map_err(|e| StoreError::RemoteFetch(format!("{e:#}")))
    }

    async fn confirm_status(
        &self,
        reference_code: &str,
        status: &str,
        _snapshot: &[Transaction],
    ) -> Result<(), StoreError> {
        self.client
            .update_status(reference_code, status)
            .await
            .map_err(|e| StoreError::RemoteFetch(format!("{e:#}")))
    }
}
