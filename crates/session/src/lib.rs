//! Coin list view-model: one fetch source, one cache, one filter engine.
//!
//! Every change to the current view bumps a revision on a `watch` channel.
//! Subscribers carry no payload and re-read [`CoinListSession::current_view`].

use coinlist_core::{
    filter::{FilterEngine, FilterState},
    model::Coin,
    traits::{CacheQuery, CoinStore},
};
use coinlist_network::{CoinSource, NetworkError};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] NetworkError),
}

pub struct CoinListSession<S, C> {
    source: S,
    store: C,
    engine: FilterEngine,
    loading: bool,
    updates: watch::Sender<u64>,
}

impl<S, C> CoinListSession<S, C>
where
    S: CoinSource,
    C: CoinStore,
{
    pub fn new(source: S, store: C) -> Self {
        let (updates, _) = watch::channel(0);
        Self {
            source,
            store,
            engine: FilterEngine::new(),
            loading: false,
            updates,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.updates.subscribe()
    }

    /// Current revision; increases by one per notification.
    pub fn revision(&self) -> u64 {
        *self.updates.borrow()
    }

    fn notify(&self) {
        self.updates.send_modify(|rev| *rev += 1);
    }

    /// Fetches the full list once. On success the list replaces the records,
    /// is written to the cache, and the view resets to it. On failure the view
    /// is left as it was.
    pub async fn refresh(&mut self) -> Result<usize, SessionError> {
        self.loading = true;
        let fetched = self.source.fetch_coins().await;
        self.loading = false;
        let coins = match fetched {
            Ok(coins) => coins,
            Err(e) => {
                warn!(error = %e, "coin fetch failed; keeping current view");
                return Err(e.into());
            }
        };
        let count = coins.len();
        info!(count, "coin list refreshed");
        if let Err(e) = self.store.save(&coins) {
            warn!(error = %e, "failed to cache fetched coins");
        }
        self.engine.set_records(coins);
        self.notify();
        Ok(count)
    }

    /// Loads whatever the cache holds. An unreadable or empty cache leaves the
    /// session untouched and returns 0.
    pub fn restore_from_cache(&mut self) -> usize {
        let coins = match self.store.load_all() {
            Ok(coins) => coins,
            Err(e) => {
                warn!(error = %e, "failed to read coin cache");
                Vec::new()
            }
        };
        if coins.is_empty() {
            debug!("coin cache empty");
            return 0;
        }
        let count = coins.len();
        self.engine.set_records(coins);
        self.notify();
        debug!(count, "restored coins from cache");
        count
    }

    /// Replaces the records directly, bypassing source and cache.
    pub fn set_records(&mut self, coins: Vec<Coin>) {
        self.engine.set_records(coins);
        self.notify();
    }

    pub fn apply_filters(&mut self, state: &FilterState) -> &[Coin] {
        self.engine.apply_filters(state);
        debug!(
            view = self.engine.current_view().len(),
            filter_active = self.engine.is_filter_active(),
            "filters applied"
        );
        self.notify();
        self.engine.current_view()
    }

    pub fn search(&mut self, query: &str) -> &[Coin] {
        self.engine.search(query);
        debug!(query, view = self.engine.current_view().len(), "search applied");
        self.notify();
        self.engine.current_view()
    }

    /// Applies the toggles of `state`, then its query if one is set.
    pub fn show(&mut self, state: &FilterState) -> &[Coin] {
        self.apply_filters(state);
        if let Some(query) = state.query.as_deref() {
            self.search(query);
        }
        self.engine.current_view()
    }

    pub fn current_view(&self) -> &[Coin] {
        self.engine.current_view()
    }

    pub fn records(&self) -> &[Coin] {
        self.engine.records()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_filter_active(&self) -> bool {
        self.engine.is_filter_active()
    }

    /// The cache's own conjunctive filter; errors are logged and read as empty.
    pub fn cached_filtered(&self, query: &CacheQuery) -> Vec<Coin> {
        match self.store.load_filtered(query) {
            Ok(coins) => coins,
            Err(e) => {
                warn!(error = %e, "failed to query coin cache");
                Vec::new()
            }
        }
    }

    pub fn clear_cache(&self) {
        if let Err(e) = self.store.clear_all() {
            warn!(error = %e, "failed to clear coin cache");
        }
    }

    pub fn store(&self) -> &C {
        &self.store
    }
}
