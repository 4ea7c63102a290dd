use std::time::Duration;

use thiserror::Error;

use crate::domain::{extraction::DiagnosticBundle, price::PriceParseError};

#[derive(Debug, Error)]
pub enum PageError {
    #[error("no element matching `{selector}` appeared")]
    ElementNotFound { selector: String },

    #[error("webdriver error: {0}")]
    Driver(#[from] thirtyfour::error::WebDriverError),

    #[error("artifact io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unusable screenshot capture: {0}")]
    Capture(String),
}

impl PageError {
    pub fn is_absent(&self) -> bool {
        matches!(self, PageError::ElementNotFound { .. })
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("[{retailer}] landing page check failed: {reason}")]
    Navigation { retailer: String, reason: String },

    #[error(
        "[{retailer}] no price found on search results (screenshot: {})",
        display_screenshot(.bundle)
    )]
    PriceNotFound {
        retailer: String,
        bundle: DiagnosticBundle,
    },

    #[error("[{retailer}] could not parse price text: {source}")]
    Parse {
        retailer: String,
        #[source]
        source: PriceParseError,
    },

    #[error("[{retailer}] browser error: {source}")]
    Browser {
        retailer: String,
        #[source]
        source: PageError,
    },
}

impl ExtractionError {
    pub fn retailer(&self) -> &str {
        match self {
            ExtractionError::Navigation { retailer, .. }
            | ExtractionError::PriceNotFound { retailer, .. }
            | ExtractionError::Parse { retailer, .. }
            | ExtractionError::Browser { retailer, .. } => retailer,
        }
    }

    pub fn diagnostics(&self) -> Option<&DiagnosticBundle> {
        match self {
            ExtractionError::PriceNotFound { bundle, .. } => Some(bundle),
            _ => None,
        }
    }
}

fn display_screenshot(bundle: &DiagnosticBundle) -> String {
    bundle
        .screenshot
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "none".to_string())
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("could not open browser session: {0}")]
    Browser(#[from] PageError),

    #[error("run did not finish within {0:?}")]
    Timeout(Duration),
}
