//! Core domain model, filter engine, and traits.
//! No async and no IO within this crate.

pub mod errors;
pub mod filter;
pub mod model;
pub mod traits;
pub mod validate;

pub use crate::errors::ValidationError;
pub use crate::filter::{
    compute_view, filter_records, search_records, FilterEngine, FilterState, FilterToggle,
};
pub use crate::model::{Coin, CoinType};
pub use crate::traits::{CacheQuery, CoinStore};
pub use crate::validate::{is_valid_type, normalize_type, parse_toggles, validate_coin};
