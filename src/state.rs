use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::config::Config;
use crate::db::Store;
use crate::services::{SeaOrmUserService, UserService, build_notifier};
use crate::store::TransactionStore;

/// Build a shared HTTP client for outbound calls. The transaction backend and
/// the notifier share its connection pool.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(concat!("Bursar/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub user_service: Arc<dyn UserService>,

    pub transactions: Arc<TransactionStore>,
}

impl SharedState {
    /// Opens the database and loads the transaction collection. A failed
    /// transaction load is logged and kept as the store's last error; it
    /// does not stop startup.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client =
            build_shared_http_client(config.transactions.request_timeout_seconds)?;

        let notifier = build_notifier(&config.notifications, http_client.clone())?;

        let user_service = Arc::new(SeaOrmUserService::new(
            store.clone(),
            config.security.clone(),
            notifier,
            config.notifications.from_address.clone(),
        )) as Arc<dyn UserService>;

        let transactions = Arc::new(TransactionStore::from_config(
            &config.transactions,
            http_client,
        )?);

        if let Err(e) = transactions.load().await {
            warn!("Starting with an empty transaction list: {e}");
        }

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            user_service,
            transactions,
        })
    }
}
