use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::backend::{StoreError, TransactionBackend};
use super::fixture;
use crate::models::Transaction;

/// Keeps the whole collection as one pretty-printed JSON array on disk.
/// Writes are serialized; each goes through its own temp file and is renamed
/// over the target.
#[derive(Debug)]
pub struct LocalFileBackend {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalFileBackend {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn write_all(&self, items: &[Transaction]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(items)
            .map_err(|e| StoreError::LocalStorage(format!("Failed to serialize: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::LocalStorage(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let _writing = self.write_lock.lock().await;

        let tmp = self
            .path
            .with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4().simple()));
        fs::write(&tmp, &json).await.map_err(|e| {
            StoreError::LocalStorage(format!("Failed to write {}: {e}", tmp.display()))
        })?;
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            fs::remove_file(&tmp).await.ok();
            return Err(StoreError::LocalStorage(format!(
                "Failed to replace {}: {e}",
                self.path.display()
            )));
        }

        debug!(path = %self.path.display(), count = items.len(), "Persisted transactions");
        Ok(())
    }
}

#[async_trait]
impl TransactionBackend for LocalFileBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn load(&self) -> Result<Vec<Transaction>, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No saved transactions, using built-in data");
                return Ok(fixture::transactions());
            }
            Err(e) => {
                return Err(StoreError::LocalStorage(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::LocalStorage(format!("{} is not valid JSON: {e}", self.path.display()))
        })
    }

    fn writes_whole_collection(&self) -> bool {
        true
    }

    async fn confirm_status(
        &self,
        _reference_code: &str,
        _status: &str,
        snapshot: &[Transaction],
    ) -> Result<(), StoreError> {
        self.write_all(snapshot).await
    }
}
