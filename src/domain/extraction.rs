use std::{fmt, path::PathBuf};

use crate::error::ExtractionError;

use super::price::NormalizedPrice;

/// Unparsed text believed to contain a price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPriceSignal(pub String);

impl RawPriceSignal {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RawPriceSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Page state captured when a retailer's price could not be located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticBundle {
    pub markup_excerpt: String,
    pub screenshot: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceReading {
    pub retailer: String,
    pub raw: RawPriceSignal,
    pub price: NormalizedPrice,
}

#[derive(Debug)]
pub enum ExtractionResult {
    Success(PriceReading),
    Failure(ExtractionError),
}

impl From<Result<PriceReading, ExtractionError>> for ExtractionResult {
    fn from(value: Result<PriceReading, ExtractionError>) -> Self {
        match value {
            Ok(reading) => ExtractionResult::Success(reading),
            Err(e) => ExtractionResult::Failure(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionState {
    NotStarted,
    Navigated,
    SearchSubmitted,
    PriceFound,
    PriceNotFound,
}

impl ExtractionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExtractionState::PriceFound | ExtractionState::PriceNotFound
        )
    }
}
