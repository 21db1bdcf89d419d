use crate::errors::ValidationError;
use crate::filter::FilterToggle;
use crate::model::{Coin, CoinType};

pub fn is_valid_type(t: &str) -> bool {
    CoinType::parse(t).is_some()
}

/// Checks a coin arriving from an import file. Unknown types are allowed
/// through; they only stop matching type filters.
pub fn validate_coin(coin: &Coin) -> Result<(), ValidationError> {
    if coin.symbol.trim().is_empty() {
        return Err(ValidationError::EmptySymbol);
    }
    Ok(())
}

/// Parses toggle labels, e.g. from repeated `--filter` flags.
pub fn parse_toggles<S: AsRef<str>>(labels: &[S]) -> Result<Vec<FilterToggle>, ValidationError> {
    labels.iter().map(|l| l.as_ref().parse()).collect()
}

/// Lowercases and trims a type given on the command line, rejecting
/// anything other than `coin` or `token`.
pub fn normalize_type(t: Option<&str>) -> Result<Option<String>, ValidationError> {
    match t.map(|v| v.trim().to_lowercase()) {
        Some(v) if is_valid_type(&v) => Ok(Some(v)),
        Some(v) => Err(ValidationError::InvalidType(v)),
        None => Ok(None),
    }
}
