//! Filter and search over an in-memory coin list.
//!
//! Toggles combine additively: every set toggle contributes its own partition
//! of the full list and the partitions are concatenated in a fixed order. A
//! coin that satisfies two set toggles is therefore listed twice.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;
use crate::model::{Coin, CoinType};

/// Named toggles as offered to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterToggle {
    ActiveCoins,
    InactiveCoins,
    OnlyTokens,
    OnlyCoins,
    NewCoins,
}

impl FilterToggle {
    pub const ALL: [FilterToggle; 5] = [
        FilterToggle::ActiveCoins,
        FilterToggle::InactiveCoins,
        FilterToggle::OnlyTokens,
        FilterToggle::OnlyCoins,
        FilterToggle::NewCoins,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FilterToggle::ActiveCoins => "Active Coins",
            FilterToggle::InactiveCoins => "Inactive Coins",
            FilterToggle::OnlyTokens => "Only Tokens",
            FilterToggle::OnlyCoins => "Only Coins",
            FilterToggle::NewCoins => "New Coins",
        }
    }
}

impl fmt::Display for FilterToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FilterToggle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        FilterToggle::ALL
            .iter()
            .copied()
            .find(|t| t.label() == trimmed)
            .ok_or_else(|| ValidationError::UnknownToggle(s.to_owned()))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub active_only: bool,
    #[serde(default)]
    pub inactive_only: bool,
    #[serde(default)]
    pub coin_type: Option<CoinType>,
    #[serde(default)]
    pub new_only: bool,
    #[serde(default)]
    pub query: Option<String>,
}

impl FilterState {
    /// Builds a state from selected toggles, in any order. `OnlyTokens` and
    /// `OnlyCoins` share the type slot and `OnlyTokens` wins when both are
    /// selected.
    pub fn from_toggles<I>(toggles: I) -> Self
    where
        I: IntoIterator<Item = FilterToggle>,
    {
        let mut state = Self::default();
        for toggle in toggles {
            state.set(toggle);
        }
        state
    }

    pub fn set(&mut self, toggle: FilterToggle) {
        match toggle {
            FilterToggle::ActiveCoins => self.active_only = true,
            FilterToggle::InactiveCoins => self.inactive_only = true,
            FilterToggle::OnlyTokens => self.coin_type = Some(CoinType::Token),
            FilterToggle::OnlyCoins => {
                self.coin_type.get_or_insert(CoinType::Coin);
            }
            FilterToggle::NewCoins => self.new_only = true,
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: &str) -> Self {
        self.query = Some(query.to_owned());
        self
    }

    /// True when at least one toggle is set. The query does not count.
    pub fn has_toggles(&self) -> bool {
        self.active_only || self.inactive_only || self.coin_type.is_some() || self.new_only
    }
}

/// Concatenates the partitions selected by `state`, in the order
/// active, inactive, type, new. Falls back to all of `records` when the
/// concatenation is empty. `state.query` is ignored here.
pub fn filter_records(records: &[Coin], state: &FilterState) -> Vec<Coin> {
    let active = partition(records, state.active_only, |c| c.is_active);
    let inactive = partition(records, state.inactive_only, |c| !c.is_active);
    let typed = match state.coin_type {
        Some(wanted) => partition(records, true, |c| c.coin_type() == Some(wanted)),
        None => Vec::new(),
    };
    let new = partition(records, state.new_only, |c| c.is_new);

    let mut combined = Vec::with_capacity(active.len() + inactive.len() + typed.len() + new.len());
    combined.extend(active);
    combined.extend(inactive);
    combined.extend(typed);
    combined.extend(new);

    if combined.is_empty() {
        records.to_vec()
    } else {
        combined
    }
}

fn partition<F>(records: &[Coin], enabled: bool, pred: F) -> Vec<Coin>
where
    F: Fn(&Coin) -> bool,
{
    if !enabled {
        return Vec::new();
    }
    records.iter().filter(|&c| pred(c)).cloned().collect()
}

/// Keeps the entries of `view` whose name or symbol contains `query`,
/// ignoring case. An empty query matches everything.
pub fn search_records(view: &[Coin], query: &str) -> Vec<Coin> {
    let needle = query.to_lowercase();
    view.iter()
        .filter(|c| c.matches_lowercase(&needle))
        .cloned()
        .collect()
}

/// Filters `records` by `state` and then narrows by `state.query`, with the
/// same empty-query rule as [`FilterEngine::search`].
pub fn compute_view(records: &[Coin], state: &FilterState) -> Vec<Coin> {
    let filtered = filter_records(records, state);
    match state.query.as_deref() {
        None => filtered,
        Some("") if state.has_toggles() => filtered,
        Some("") => records.to_vec(),
        Some(q) => search_records(&filtered, q),
    }
}

/// Holds the full coin list and the current view derived from it.
#[derive(Debug, Default, Clone)]
pub struct FilterEngine {
    records: Vec<Coin>,
    view: Vec<Coin>,
    filter_active: bool,
}

impl FilterEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Coin>) -> Self {
        let mut engine = Self::new();
        engine.set_records(records);
        engine
    }

    /// Replaces the full list and resets the view to it. Whether a filter
    /// is active is left as it was.
    pub fn set_records(&mut self, records: Vec<Coin>) {
        self.view = records.clone();
        self.records = records;
    }

    pub fn apply_filters(&mut self, state: &FilterState) -> &[Coin] {
        self.view = filter_records(&self.records, state);
        self.filter_active = state.has_toggles();
        &self.view
    }

    /// Narrows the current view, not the full list. An empty query restores
    /// the full list when no toggle is applied and otherwise leaves the view
    /// untouched.
    pub fn search(&mut self, query: &str) -> &[Coin] {
        if query.is_empty() {
            if !self.filter_active {
                self.view = self.records.clone();
            }
        } else {
            self.view = search_records(&self.view, query);
        }
        &self.view
    }

    pub fn records(&self) -> &[Coin] {
        &self.records
    }

    pub fn current_view(&self) -> &[Coin] {
        &self.view
    }

    pub fn is_filter_active(&self) -> bool {
        self.filter_active
    }
}
