use std::convert::Infallible;

use coinlist_core::{
    model::Coin,
    traits::{CacheQuery, CoinStore},
};
use parking_lot::RwLock;

/// Process-local cache; contents are gone when the store is dropped.
pub struct EphemeralStorage {
    coins: RwLock<Vec<Coin>>,
}

impl EphemeralStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coins(coins: Vec<Coin>) -> Self {
        Self {
            coins: RwLock::new(coins),
        }
    }

    pub fn len(&self) -> usize {
        self.coins.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.read().is_empty()
    }
}

impl Default for EphemeralStorage {
    fn default() -> Self {
        Self {
            coins: RwLock::new(Vec::new()),
        }
    }
}

impl CoinStore for EphemeralStorage {
    type Error = Infallible;

    fn save(&self, coins: &[Coin]) -> Result<(), Self::Error> {
        let mut guard = self.coins.write();
        guard.clear();
        guard.extend_from_slice(coins);
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Coin>, Self::Error> {
        Ok(self.coins.read().clone())
    }

    fn load_filtered(&self, query: &CacheQuery) -> Result<Vec<Coin>, Self::Error> {
        let coins = self.coins.read();
        Ok(coins.iter().filter(|c| query.matches(c)).cloned().collect())
    }

    fn clear_all(&self) -> Result<(), Self::Error> {
        self.coins.write().clear();
        Ok(())
    }
}
