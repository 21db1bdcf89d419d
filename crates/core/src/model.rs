use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;

pub const TYPE_COIN: &str = "coin";
pub const TYPE_TOKEN: &str = "token";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinType {
    Coin,
    Token,
}

impl CoinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoinType::Coin => TYPE_COIN,
            CoinType::Token => TYPE_TOKEN,
        }
    }

    /// Exact, case-sensitive match against the wire strings.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            TYPE_COIN => Some(CoinType::Coin),
            TYPE_TOKEN => Some(CoinType::Token),
            _ => None,
        }
    }
}

impl fmt::Display for CoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoinType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CoinType::parse(s).ok_or_else(|| ValidationError::InvalidType(s.to_owned()))
    }
}

/// One entry of the remote coin list.
///
/// `type` is kept as the raw wire string so that unknown kinds survive a
/// cache round trip; use [`Coin::coin_type`] for the parsed form.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Coin {
    pub name: String,
    pub symbol: String,
    pub is_new: bool,
    pub is_active: bool,
    #[serde(rename = "type")]
    pub r#type: String,
}

impl Coin {
    pub fn new(name: &str, symbol: &str, r#type: CoinType) -> Self {
        Self {
            name: name.to_owned(),
            symbol: symbol.to_owned(),
            is_new: false,
            is_active: true,
            r#type: r#type.as_str().to_owned(),
        }
    }

    #[must_use]
    pub fn with_new(mut self, is_new: bool) -> Self {
        self.is_new = is_new;
        self
    }

    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn coin_type(&self) -> Option<CoinType> {
        CoinType::parse(&self.r#type)
    }

    /// Case-insensitive substring match on name or symbol.
    /// `needle` must already be lowercased.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.symbol.to_lowercase().contains(needle)
    }
}
