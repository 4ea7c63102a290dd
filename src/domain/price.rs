use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceParseError {
    #[error("no digits found in price text {0:?}")]
    NoDigitsFound(String),
    #[error("price text {0:?} does not fit in a u64")]
    Overflow(String),
}

/// Whole-unit price with every formatting character stripped.
///
/// Decimal separators are treated like any other noise, so `"1,299.50"`
/// becomes `129950`. This mirrors how both storefronts render listing prices
/// (whole rupees) and is a known limitation for sites that show paise/cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NormalizedPrice(u64);

impl NormalizedPrice {
    pub fn new(value: u64) -> Self {
        NormalizedPrice(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NormalizedPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn parse_price(signal: &str) -> Result<NormalizedPrice, PriceParseError> {
    let digits: Vec<u64> = signal
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(u64::from)
        .collect();

    if digits.is_empty() {
        return Err(PriceParseError::NoDigitsFound(signal.to_string()));
    }

    digits
        .into_iter()
        .try_fold(0u64, |acc, d| acc.checked_mul(10)?.checked_add(d))
        .map(NormalizedPrice)
        .ok_or_else(|| PriceParseError::Overflow(signal.to_string()))
}
