use coinlist_core::filter::{FilterEngine, FilterState};
use coinlist_core::model::Coin;
use coinlist_core::traits::CoinStore;
use coinlist_storage_ephemeral::EphemeralStorage;
use coinlist_storage_local::LocalStorage;

pub struct LocalStack {
    pub storage: LocalStorage,
    pub root: tempfile::TempDir,
}

impl LocalStack {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create local bench dir");
        let storage = LocalStorage::new(root.path());
        Self { storage, root }
    }
}

impl Default for LocalStack {
    fn default() -> Self {
        Self::new()
    }
}

pub fn ephemeral_with(coins: &[Coin]) -> EphemeralStorage {
    EphemeralStorage::with_coins(coins.to_vec())
}

pub fn measure_filter(engine: &mut FilterEngine, state: &FilterState) -> usize {
    engine.apply_filters(state).len()
}

/// Applies `state` and then narrows by `query`, as a user typing after
/// picking toggles would.
pub fn measure_search(engine: &mut FilterEngine, state: &FilterState, query: &str) -> usize {
    engine.apply_filters(state);
    engine.search(query).len()
}

pub fn measure_save<S>(storage: &S, coins: &[Coin])
where
    S: CoinStore,
{
    storage.save(coins).expect("storage save");
}
