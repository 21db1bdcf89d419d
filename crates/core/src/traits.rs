use crate::model::Coin;
use serde::{Deserialize, Serialize};

/// Conjunctive filter evaluated by a [`CoinStore`]. Every present field must
/// match; absent fields are ignored. `coin_type` compares the raw wire string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheQuery {
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_new: Option<bool>,
    #[serde(default)]
    pub coin_type: Option<String>,
}

impl CacheQuery {
    pub fn matches(&self, coin: &Coin) -> bool {
        self.is_active.map_or(true, |v| coin.is_active == v)
            && self.is_new.map_or(true, |v| coin.is_new == v)
            && self
                .coin_type
                .as_deref()
                .map_or(true, |t| coin.r#type == t)
    }

    pub fn is_empty(&self) -> bool {
        self.is_active.is_none() && self.is_new.is_none() && self.coin_type.is_none()
    }
}

/// Local cache mirroring the last fetched coin list.
/// No async in core; callers should use spawn_blocking when invoking from async contexts.
pub trait CoinStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Replaces everything previously cached.
    fn save(&self, coins: &[Coin]) -> Result<(), Self::Error>;
    /// All cached coins in the order they were saved.
    fn load_all(&self) -> Result<Vec<Coin>, Self::Error>;
    fn load_filtered(&self, query: &CacheQuery) -> Result<Vec<Coin>, Self::Error>;
    fn clear_all(&self) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CoinType;

    #[test]
    fn cache_query_is_conjunctive() {
        let eth = Coin::new("Ethereum", "ETH", CoinType::Coin).with_new(true);
        let btc = Coin::new("Bitcoin", "BTC", CoinType::Coin);
        let q = CacheQuery {
            is_active: Some(true),
            is_new: Some(true),
            coin_type: Some("coin".into()),
        };
        assert!(q.matches(&eth));
        assert!(!q.matches(&btc));
        assert!(CacheQuery::default().matches(&btc));
        assert!(CacheQuery::default().is_empty());
    }
}
