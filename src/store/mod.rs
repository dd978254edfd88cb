//! In-process transaction store.
//!
//! Holds the collection loaded from a [`TransactionBackend`], derives the
//! sorted and filtered views, debounces the search query and applies status
//! changes optimistically, rolling them back when the backend refuses.

pub mod backend;
pub mod debounce;
pub mod fixture;
pub mod local;
pub mod remote;
pub mod view;

use anyhow::Result;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clients::transactions::TransactionsClient;
use crate::config::{BackendKind, LoadPolicy, TransactionsConfig};
use crate::models::{StudentAutofill, Transaction};

pub use backend::{StoreError, TransactionBackend};
pub use debounce::Debouncer;
pub use local::LocalFileBackend;
pub use remote::RemoteBackend;
pub use view::{TransactionFilter, filter_transactions, sort_by_date_desc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub debounce: Duration,
    pub timeout: Duration,
    pub load_policy: LoadPolicy,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(400),
            timeout: Duration::from_secs(10),
            load_policy: LoadPolicy::Surface,
        }
    }
}

impl From<&TransactionsConfig> for StoreOptions {
    fn from(config: &TransactionsConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            timeout: Duration::from_secs(config.request_timeout_seconds),
            load_policy: config.load_policy,
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    items: Vec<Transaction>,
    sorted: Option<Arc<Vec<Transaction>>>,
    last_error: Option<StoreError>,
    raw_search: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl StoreState {
    fn replace_items(&mut self, items: Vec<Transaction>) {
        self.items = items;
        self.sorted = None;
    }

    fn find_mut(&mut self, reference_code: &str) -> Option<&mut Transaction> {
        self.items
            .iter_mut()
            .find(|t| t.reference_code == reference_code)
    }
}

/// Marks a load in flight until dropped, so an abandoned load future cannot
/// leave the store stuck in the loading state.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct TransactionStore {
    backend: Arc<dyn TransactionBackend>,
    options: StoreOptions,
    state: RwLock<StoreState>,
    loads_in_flight: AtomicUsize,
    search: Arc<watch::Sender<String>>,
    debouncer: Debouncer,
    record_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    collection_lock: tokio::sync::Mutex<()>,
}

impl TransactionStore {
    #[must_use]
    pub fn new(backend: Arc<dyn TransactionBackend>, options: StoreOptions) -> Self {
        let (search, _) = watch::channel(String::new());

        Self {
            backend,
            options,
            state: RwLock::new(StoreState::default()),
            loads_in_flight: AtomicUsize::new(0),
            search: Arc::new(search),
            debouncer: Debouncer::new(options.debounce),
            record_locks: Mutex::new(HashMap::new()),
            collection_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Builds the backend named in the config. Nothing is loaded yet.
    pub fn from_config(config: &TransactionsConfig, client: reqwest::Client) -> Result<Self> {
        let backend: Arc<dyn TransactionBackend> = match config.backend {
            BackendKind::Local => Arc::new(LocalFileBackend::new(&config.local_path)),
            BackendKind::Remote => Arc::new(RemoteBackend::new(TransactionsClient::new(
                client,
                &config.remote_url,
            )?)),
        };

        info!(backend = backend.name(), "Transaction store configured");

        Ok(Self::new(backend, StoreOptions::from(config)))
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn load(&self) -> Result<(), StoreError> {
        self.load_cancellable(&CancellationToken::new()).await
    }

    /// Replaces the collection with the backend's. On failure the collection
    /// is left as it was, unless the load policy allows falling back to the
    /// built-in data for unreadable local storage.
    pub async fn load_cancellable(&self, cancel: &CancellationToken) -> Result<(), StoreError> {
        let _loading = LoadingGuard::enter(&self.loads_in_flight);

        let result = self.guarded(cancel, self.backend.load()).await;

        let mut state = self.state.write().await;
        match result {
            Ok(items) => {
                info!(backend = self.backend.name(), count = items.len(), "Transactions loaded");
                state.replace_items(items);
                state.last_error = None;
                Ok(())
            }
            Err(err @ StoreError::LocalStorage(_))
                if self.options.load_policy == LoadPolicy::FallbackToFixture =>
            {
                warn!("{err}; falling back to built-in transactions");
                state.replace_items(fixture::transactions());
                state.last_error = Some(err);
                Ok(())
            }
            Err(err) => {
                warn!(backend = self.backend.name(), "Failed to load transactions: {err}");
                state.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Replaces the collection with the built-in data and clears the error.
    pub async fn load_fixture(&self) {
        let mut state = self.state.write().await;
        state.replace_items(fixture::transactions());
        state.last_error = None;
    }

    /// Updates the raw query now and the debounced query once input settles.
    pub async fn set_search(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.write().await.raw_search.clone_from(&text);

        let search = self.search.clone();
        self.debouncer.schedule(async move {
            search.send_if_modified(|current| {
                if *current == text {
                    false
                } else {
                    *current = text;
                    true
                }
            });
        });
    }

    pub async fn raw_search(&self) -> String {
        self.state.read().await.raw_search.clone()
    }

    #[must_use]
    pub fn debounced_search(&self) -> String {
        self.search.borrow().clone()
    }

    /// Notified each time the debounced query changes.
    #[must_use]
    pub fn subscribe_search(&self) -> watch::Receiver<String> {
        self.search.subscribe()
    }

    pub async fn set_date_range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        let mut state = self.state.write().await;
        state.start_date = start;
        state.end_date = end;
    }

    /// The whole collection, newest first. Recomputed only after the
    /// collection changes.
    pub async fn sorted_view(&self) -> Arc<Vec<Transaction>> {
        if let Some(sorted) = &self.state.read().await.sorted {
            return sorted.clone();
        }

        let mut state = self.state.write().await;
        if let Some(sorted) = &state.sorted {
            return sorted.clone();
        }

        let sorted = Arc::new(sort_by_date_desc(&state.items));
        state.sorted = Some(sorted.clone());
        sorted
    }

    /// Sorted view narrowed by the current date range and debounced query.
    pub async fn filtered_view(&self) -> Vec<Transaction> {
        let (start, end) = {
            let state = self.state.read().await;
            (state.start_date, state.end_date)
        };
        let filter = TransactionFilter::new(self.debounced_search()).with_range(start, end);
        self.query(&filter).await
    }

    /// Sorted view narrowed by an explicit filter, bypassing the store's own
    /// search state.
    pub async fn query(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        filter_transactions(&self.sorted_view().await, filter)
    }

    pub async fn update_status(
        &self,
        reference_code: &str,
        status: &str,
    ) -> Result<bool, StoreError> {
        self.update_status_cancellable(reference_code, status, &CancellationToken::new())
            .await
    }

    /// Applies `status` immediately, then asks the backend to confirm it.
    /// `Ok(false)` when no record has this reference code. On failure the
    /// previous status is restored and the error is also kept in
    /// [`last_error`](Self::last_error).
    ///
    /// Updates to one record run one at a time. When the backend rewrites
    /// the whole collection, all updates do.
    pub async fn update_status_cancellable(
        &self,
        reference_code: &str,
        status: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, StoreError> {
        if self.find(reference_code).await.is_none() {
            debug!(reference_code, "Status update for unknown transaction ignored");
            return Ok(false);
        }

        let record_lock = self.record_lock(reference_code);
        let result = {
            let _record = record_lock.lock().await;
            let _collection = if self.backend.writes_whole_collection() {
                Some(self.collection_lock.lock().await)
            } else {
                None
            };
            self.apply_status(reference_code, status, cancel).await
        };
        self.release_record_lock(reference_code, &record_lock);

        result
    }

    async fn apply_status(
        &self,
        reference_code: &str,
        status: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, StoreError> {
        let (previous, snapshot) = {
            let mut state = self.state.write().await;
            // A reload may have dropped the record while this update waited
            let Some(record) = state.find_mut(reference_code) else {
                debug!(reference_code, "Status update for unknown transaction ignored");
                return Ok(false);
            };

            let previous = std::mem::replace(&mut record.status, status.to_string());
            state.sorted = None;
            state.last_error = None;
            (previous, state.items.clone())
        };

        let result = self
            .guarded(
                cancel,
                self.backend.confirm_status(reference_code, status, &snapshot),
            )
            .await;

        match result {
            Ok(()) => {
                info!(reference_code, from = %previous, to = status, "Transaction status updated");
                Ok(true)
            }
            Err(err) => {
                warn!(reference_code, "Status update rolled back: {err}");

                let mut state = self.state.write().await;
                // A reload may have replaced the record meanwhile
                if let Some(record) = state
                    .find_mut(reference_code)
                    .filter(|r| r.status == status)
                {
                    record.status = previous;
                }
                state.sorted = None;
                state.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loads_in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn last_error(&self) -> Option<StoreError> {
        self.state.read().await.last_error.clone()
    }

    pub async fn clear_error(&self) {
        self.state.write().await.last_error = None;
    }

    /// The collection in backend order.
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.state.read().await.items.clone()
    }

    pub async fn find(&self, reference_code: &str) -> Option<Transaction> {
        self.state
            .read()
            .await
            .items
            .iter()
            .find(|t| t.reference_code == reference_code)
            .cloned()
    }

    /// One autofill entry per transaction, in backend order.
    pub async fn student_autofill(&self) -> Vec<StudentAutofill> {
        self.state
            .read()
            .await
            .items
            .iter()
            .map(StudentAutofill::from)
            .collect()
    }

    /// Stops the pending debounce timer. The store stays usable.
    pub fn dispose(&self) {
        self.debouncer.cancel();
    }

    fn record_lock(&self, reference_code: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.record_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(reference_code.to_string())
            .or_default()
            .clone()
    }

    /// Drops the map entry once no other update holds or waits on it.
    fn release_record_lock(&self, reference_code: &str, lock: &Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self
            .record_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // One reference in the map, one held by the caller
        if Arc::strong_count(lock) <= 2 {
            locks.remove(reference_code);
        }
    }

    /// Bounds a backend call by the configured timeout and races it against
    /// `cancel`.
    async fn guarded<T, F>(&self, cancel: &CancellationToken, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let timeout = self.options.timeout;
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(StoreError::Cancelled),
            result = tokio::time::timeout(timeout, call) => {
                result.unwrap_or_else(|_| Err(StoreError::Timeout(timeout)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicBool;

    /// In-memory backend with switchable failures and latency.
    #[derive(Default)]
    struct MockBackend {
        items: std::sync::Mutex<Vec<Transaction>>,
        fail_load: Option<StoreError>,
        fail_confirm: AtomicBool,
        latency: Duration,
        confirms: AtomicUsize,
        whole_collection: bool,
        confirms_in_flight: AtomicUsize,
        max_concurrent_confirms: AtomicUsize,
    }

    impl MockBackend {
        fn with_fixture() -> Self {
            Self {
                items: std::sync::Mutex::new(fixture::transactions()),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl TransactionBackend for MockBackend {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn writes_whole_collection(&self) -> bool {
            self.whole_collection
        }

        async fn load(&self) -> Result<Vec<Transaction>, StoreError> {
            tokio::time::sleep(self.latency).await;
            if let Some(err) = &self.fail_load {
                return Err(err.clone());
            }
            Ok(self.items.lock().unwrap().clone())
        }

        async fn confirm_status(
            &self,
            _reference_code: &str,
            _status: &str,
            snapshot: &[Transaction],
        ) -> Result<(), StoreError> {
            let in_flight = self.confirms_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_concurrent_confirms.fetch_max(in_flight, Ordering::SeqCst);
            tokio::time::sleep(self.latency).await;
            self.confirms_in_flight.fetch_sub(1, Ordering::SeqCst);

            self.confirms.fetch_add(1, Ordering::SeqCst);
            if self.fail_confirm.load(Ordering::SeqCst) {
                return Err(StoreError::RemoteFetch("HTTP 500".to_string()));
            }
            *self.items.lock().unwrap() = snapshot.to_vec();
            Ok(())
        }
    }

    fn store_with(backend: MockBackend) -> (TransactionStore, Arc<MockBackend>) {
        let backend = Arc::new(backend);
        let store = TransactionStore::new(backend.clone(), StoreOptions::default());
        (store, backend)
    }

    fn status_of(items: &[Transaction], reference: &str) -> String {
        items
            .iter()
            .find(|t| t.reference_code == reference)
            .map(|t| t.status.clone())
            .unwrap()
    }

    #[tokio::test]
    async fn load_replaces_collection_and_clears_error() {
        let (store, _) = store_with(MockBackend::with_fixture());
        store.load().await.unwrap();

        assert_eq!(store.transactions().await.len(), 9);
        assert!(!store.is_loading());
        assert!(store.last_error().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn loading_flag_is_set_while_in_flight() {
        let (store, _) = store_with(MockBackend {
            latency: Duration::from_millis(100),
            ..MockBackend::with_fixture()
        });
        let store = Arc::new(store);

        let task = tokio::spawn({
            let store = store.clone();
            async move { store.load().await }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(store.is_loading());

        task.await.unwrap().unwrap();
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn failed_load_keeps_collection_and_sets_error() {
        let (store, _) = store_with(MockBackend {
            fail_load: Some(StoreError::RemoteFetch("connection refused".to_string())),
            ..MockBackend::default()
        });
        store.load_fixture().await;

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::RemoteFetch(_)));
        assert_eq!(store.last_error().await, Some(err));
        assert_eq!(store.transactions().await.len(), 9);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn corrupt_local_storage_surfaces_by_default() {
        let (store, _) = store_with(MockBackend {
            fail_load: Some(StoreError::LocalStorage("bad json".to_string())),
            ..MockBackend::default()
        });

        assert!(matches!(
            store.load().await,
            Err(StoreError::LocalStorage(_))
        ));
        assert!(store.transactions().await.is_empty());

        store.load_fixture().await;
        assert_eq!(store.transactions().await.len(), 9);
        assert!(store.last_error().await.is_none());
    }

    #[tokio::test]
    async fn corrupt_local_storage_falls_back_when_allowed() {
        let backend = Arc::new(MockBackend {
            fail_load: Some(StoreError::LocalStorage("bad json".to_string())),
            ..MockBackend::default()
        });
        let store = TransactionStore::new(
            backend,
            StoreOptions {
                load_policy: LoadPolicy::FallbackToFixture,
                ..StoreOptions::default()
            },
        );

        store.load().await.unwrap();
        assert_eq!(store.transactions().await.len(), 9);
        assert!(matches!(
            store.last_error().await,
            Some(StoreError::LocalStorage(_))
        ));
    }

    #[tokio::test]
    async fn update_status_confirms_and_persists() {
        let (store, backend) = store_with(MockBackend::with_fixture());
        store.load().await.unwrap();

        assert!(store.update_status("REF-001235", "Posted").await.unwrap());
        assert_eq!(status_of(&store.transactions().await, "REF-001235"), "Posted");
        assert_eq!(
            status_of(&backend.items.lock().unwrap(), "REF-001235"),
            "Posted"
        );
    }

    #[tokio::test]
    async fn unknown_reference_is_a_no_op() {
        let (store, backend) = store_with(MockBackend::with_fixture());
        store.load().await.unwrap();
        let before = store.transactions().await;

        assert!(!store.update_status("REF-999999", "Posted").await.unwrap());
        assert_eq!(store.transactions().await, before);
        assert!(store.last_error().await.is_none());
        assert_eq!(backend.confirms.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn record_locks_do_not_accumulate() {
        let (store, _) = store_with(MockBackend::with_fixture());
        store.load().await.unwrap();

        for i in 0..1_000 {
            assert!(!store.update_status(&format!("NOPE-{i}"), "Posted").await.unwrap());
        }
        assert!(store.record_locks.lock().unwrap().is_empty());

        assert!(store.update_status("REF-001235", "Posted").await.unwrap());
        assert!(store.record_locks.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn whole_collection_updates_confirm_latest_snapshot() {
        let (store, backend) = store_with(MockBackend {
            latency: Duration::from_millis(100),
            whole_collection: true,
            ..MockBackend::with_fixture()
        });
        let store = Arc::new(store);
        store.load().await.unwrap();

        let refs = ["REF-001234", "REF-001235", "REF-001236", "REF-001237"];
        let tasks: Vec<_> = refs
            .into_iter()
            .map(|reference| {
                let store = store.clone();
                tokio::spawn(async move { store.update_status(reference, "Refunded").await })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap().unwrap());
        }

        let persisted = backend.items.lock().unwrap().clone();
        assert_eq!(persisted, store.transactions().await);
        for reference in refs {
            assert_eq!(status_of(&persisted, reference), "Refunded");
        }
        assert_eq!(backend.max_concurrent_confirms.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_confirmation_rolls_back() {
        let (store, backend) = store_with(MockBackend::with_fixture());
        store.load().await.unwrap();
        let before = store.transactions().await;

        backend.fail_confirm.store(true, Ordering::SeqCst);
        let err = store.update_status("REF-001236", "Posted").await.unwrap_err();

        assert!(matches!(err, StoreError::RemoteFetch(_)));
        assert_eq!(store.transactions().await, before);
        assert_eq!(store.last_error().await, Some(err));
    }

    #[tokio::test(start_paused = true)]
    async fn update_is_visible_before_confirmation() {
        let (store, _) = store_with(MockBackend {
            latency: Duration::from_millis(200),
            ..MockBackend::with_fixture()
        });
        let store = Arc::new(store);
        store.load().await.unwrap();

        let task = tokio::spawn({
            let store = store.clone();
            async move { store.update_status("REF-001237", "Posted").await }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.find("REF-001237").await.unwrap().status, "Posted");

        assert!(task.await.unwrap().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_confirmation_times_out_and_rolls_back() {
        let backend = Arc::new(MockBackend {
            latency: Duration::from_secs(30),
            ..MockBackend::with_fixture()
        });
        let store = TransactionStore::new(
            backend.clone(),
            StoreOptions {
                timeout: Duration::from_secs(1),
                ..StoreOptions::default()
            },
        );
        store.load_fixture().await;

        let err = store.update_status("REF-001234", "Cancelled").await.unwrap_err();
        assert_eq!(err, StoreError::Timeout(Duration::from_secs(1)));
        assert_eq!(store.find("REF-001234").await.unwrap().status, "Posted");
    }

    #[tokio::test]
    async fn cancelled_update_rolls_back() {
        let (store, backend) = store_with(MockBackend::with_fixture());
        store.load().await.unwrap();

        let token = CancellationToken::new();
        token.cancel();

        let err = store
            .update_status_cancellable("REF-001234", "Cancelled", &token)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Cancelled);
        assert_eq!(store.find("REF-001234").await.unwrap().status, "Posted");
        assert_eq!(backend.confirms.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_mid_load_leaves_collection() {
        let (store, _) = store_with(MockBackend {
            latency: Duration::from_secs(5),
            ..MockBackend::with_fixture()
        });
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        assert_eq!(
            store.load_cancellable(&token).await,
            Err(StoreError::Cancelled)
        );
        assert!(store.transactions().await.is_empty());
        assert!(!store.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn same_record_updates_are_serialized() {
        let (store, backend) = store_with(MockBackend {
            latency: Duration::from_millis(100),
            ..MockBackend::with_fixture()
        });
        let store = Arc::new(store);
        store.load().await.unwrap();

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.update_status("REF-001239", "Posted").await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = tokio::spawn({
            let store = store.clone();
            async move { store.update_status("REF-001239", "Cancelled").await }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        // Second update is still waiting for the first to confirm
        assert_eq!(store.find("REF-001239").await.unwrap().status, "Posted");

        assert!(first.await.unwrap().unwrap());
        assert!(second.await.unwrap().unwrap());
        assert_eq!(store.find("REF-001239").await.unwrap().status, "Cancelled");
        assert_eq!(backend.confirms.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_search_settles_on_last_value() {
        let (store, _) = store_with(MockBackend::with_fixture());
        store.load().await.unwrap();
        let mut rx = store.subscribe_search();

        for text in ["c", "ca", "cas", "cash"] {
            store.set_search(text).await;
            assert_eq!(store.raw_search().await, text);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        assert_eq!(store.debounced_search(), "");
        assert!(!rx.has_changed().unwrap());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), "cash");
        assert!(!rx.has_changed().unwrap());

        let hits = store.filtered_view().await;
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|t| t.payment_method == "Cash"));
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_drops_pending_search() {
        let (store, _) = store_with(MockBackend::with_fixture());
        store.set_search("gcash").await;
        store.dispose();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.debounced_search(), "");
        assert_eq!(store.raw_search().await, "gcash");
    }

    #[tokio::test]
    async fn sorted_view_is_memoized_until_change() {
        let (store, _) = store_with(MockBackend::with_fixture());
        store.load().await.unwrap();

        let a = store.sorted_view().await;
        let b = store.sorted_view().await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a[0].reference_code, "REF-001240");

        store.update_status("REF-001240", "Posted").await.unwrap();
        let c = store.sorted_view().await;
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(c[0].status, "Posted");
    }

    #[tokio::test]
    async fn date_range_narrows_filtered_view() {
        let (store, _) = store_with(MockBackend::with_fixture());
        store.load().await.unwrap();

        store
            .set_date_range(
                NaiveDate::from_ymd_opt(2025, 10, 1),
                NaiveDate::from_ymd_opt(2025, 10, 31),
            )
            .await;
        let refs: Vec<String> = store
            .filtered_view()
            .await
            .into_iter()
            .map(|t| t.reference_code)
            .collect();
        assert_eq!(refs, vec!["REF-001240", "REF-001234", "REF-001235", "REF-001236"]);

        store.set_date_range(None, None).await;
        assert_eq!(store.filtered_view().await.len(), 9);
    }

    #[tokio::test]
    async fn autofill_maps_every_transaction() {
        let (store, _) = store_with(MockBackend::with_fixture());
        store.load().await.unwrap();

        let autofill = store.student_autofill().await;
        let items = store.transactions().await;
        assert_eq!(autofill.len(), items.len());
        for (entry, item) in autofill.iter().zip(&items) {
            assert_eq!(entry.campus_id, item.campus_id);
        }
    }
}
