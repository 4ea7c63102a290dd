use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use crate::{
    configuration::PriceStrategySettings, domain::extraction::RawPriceSignal, error::PageError,
};

use super::BrowserPage;

/// Finds the first price-like fragment on a search results page.
///
/// `Ok(None)` means the page was readable but held no price within the
/// locator's bound.
#[async_trait]
pub trait PriceLocator: Send + Sync {
    async fn locate(&self, page: &dyn BrowserPage) -> Result<Option<RawPriceSignal>, PageError>;
}

/// Regex over the whole page's visible text.
pub struct FullTextScan {
    pattern: Regex,
}

impl FullTextScan {
    pub fn new(pattern: Regex) -> Self {
        FullTextScan { pattern }
    }

    pub fn scan(&self, text: &str) -> Option<RawPriceSignal> {
        self.pattern
            .find(text)
            .map(|m| RawPriceSignal(m.as_str().to_string()))
    }
}

#[async_trait]
impl PriceLocator for FullTextScan {
    async fn locate(&self, page: &dyn BrowserPage) -> Result<Option<RawPriceSignal>, PageError> {
        let text = page.visible_text().await?;
        Ok(self.scan(&text))
    }
}

/// Waits for a retailer-specific price element and reads its text.
pub struct TargetedElement {
    selector: String,
    timeout: Duration,
}

impl TargetedElement {
    pub fn new(selector: String, timeout: Duration) -> Self {
        TargetedElement { selector, timeout }
    }
}

#[async_trait]
impl PriceLocator for TargetedElement {
    async fn locate(&self, page: &dyn BrowserPage) -> Result<Option<RawPriceSignal>, PageError> {
        match page.wait_for(&self.selector, self.timeout).await {
            Ok(()) => {}
            Err(e) if e.is_absent() => return Ok(None),
            Err(e) => return Err(e),
        }

        let text = page.inner_text(&self.selector).await?;
        Ok(Some(RawPriceSignal(text)))
    }
}

pub fn price_locator_from_settings(
    settings: &PriceStrategySettings,
) -> Result<Box<dyn PriceLocator>, regex::Error> {
    let locator: Box<dyn PriceLocator> = match settings {
        PriceStrategySettings::FullText { pattern } => {
            Box::new(FullTextScan::new(Regex::new(pattern)?))
        }
        PriceStrategySettings::Element {
            selector,
            timeout_ms,
        } => Box::new(TargetedElement::new(
            selector.clone(),
            Duration::from_millis(*timeout_ms),
        )),
    };

    Ok(locator)
}
