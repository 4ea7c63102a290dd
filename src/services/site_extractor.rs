use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use regex::Regex;

use crate::{
    configuration::{InterstitialSettings, ResultsReadySettings, RetailerSettings},
    domain::{
        extraction::{ExtractionState, PriceReading},
        price::parse_price,
        product_query::ProductQuery,
    },
    error::{ExtractionError, PageError},
};

use super::{collect_diagnostics, price_locator_from_settings, BrowserPage, PriceLocator};

/// Drives one retailer's search flow and reads the first listed price.
pub struct SiteExtractor {
    name: String,
    landing_url: String,
    title_pattern: Regex,
    url_pattern: Regex,
    search_input: String,
    search_timeout: Duration,
    interstitial: Option<InterstitialSettings>,
    results_ready: Option<ResultsReadySettings>,
    settle: Duration,
    navigation_attempts: u32,
    locator: Box<dyn PriceLocator>,
    artifact_dir: PathBuf,
    excerpt_len: usize,
}

impl SiteExtractor {
    pub fn from_settings(
        settings: &RetailerSettings,
        artifact_dir: &Path,
        excerpt_len: usize,
    ) -> Result<Self, regex::Error> {
        Ok(SiteExtractor {
            name: settings.name.clone(),
            landing_url: settings.landing_url.clone(),
            title_pattern: Regex::new(&settings.title_pattern)?,
            url_pattern: Regex::new(&settings.url_pattern)?,
            search_input: settings.search_input.clone(),
            search_timeout: Duration::from_millis(settings.search_timeout_ms),
            interstitial: settings.interstitial.clone(),
            results_ready: settings.results_ready.clone(),
            settle: Duration::from_millis(settings.settle_ms),
            navigation_attempts: settings.navigation_attempts.max(1),
            locator: price_locator_from_settings(&settings.price)?,
            artifact_dir: artifact_dir.to_path_buf(),
            excerpt_len,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn extract(
        &self,
        page: &dyn BrowserPage,
        query: &ProductQuery,
    ) -> Result<PriceReading, ExtractionError> {
        let state = ExtractionState::NotStarted;

        self.open_landing(page).await?;
        let state = self.advance(state, ExtractionState::Navigated);

        page.fill_and_submit(&self.search_input, query.as_str(), self.search_timeout)
            .await
            .map_err(|e| self.browser_error(e))?;
        let state = self.advance(state, ExtractionState::SearchSubmitted);

        self.wait_for_results(page).await;

        let signal = match self.locator.locate(page).await {
            Ok(signal) => signal,
            Err(e) => {
                log::error!("{} page could not be read for a price: {}", self.name, e);
                collect_diagnostics(page, &self.name, &self.artifact_dir, self.excerpt_len).await;
                return Err(self.browser_error(e));
            }
        };

        let Some(raw) = signal else {
            self.advance(state, ExtractionState::PriceNotFound);
            let bundle =
                collect_diagnostics(page, &self.name, &self.artifact_dir, self.excerpt_len).await;
            return Err(ExtractionError::PriceNotFound {
                retailer: self.name.clone(),
                bundle,
            });
        };
        self.advance(state, ExtractionState::PriceFound);
        log::info!("{} price text: {}", self.name, raw);

        let price = parse_price(raw.as_str()).map_err(|source| ExtractionError::Parse {
            retailer: self.name.clone(),
            source,
        })?;

        Ok(PriceReading {
            retailer: self.name.clone(),
            raw,
            price,
        })
    }

    async fn open_landing(&self, page: &dyn BrowserPage) -> Result<(), ExtractionError> {
        let mut attempt = 1;

        loop {
            page.goto(&self.landing_url)
                .await
                .map_err(|e| self.browser_error(e))?;
            self.dismiss_interstitial(page).await;

            match self.validate_landing(page).await {
                Err(e @ ExtractionError::Navigation { .. }) if attempt < self.navigation_attempts => {
                    log::warn!(
                        "{} (attempt {}/{}), navigating again",
                        e,
                        attempt,
                        self.navigation_attempts
                    );
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn dismiss_interstitial(&self, page: &dyn BrowserPage) {
        let Some(interstitial) = &self.interstitial else {
            return;
        };

        let timeout = Duration::from_millis(interstitial.timeout_ms);
        match page.click(&interstitial.selector, timeout).await {
            Ok(()) => log::debug!("{} interstitial dismissed", self.name),
            Err(e) if e.is_absent() => log::debug!("{} showed no interstitial", self.name),
            Err(e) => log::warn!(
                "{} interstitial `{}` present but not dismissed: {}",
                self.name,
                interstitial.selector,
                e
            ),
        }
    }

    async fn validate_landing(&self, page: &dyn BrowserPage) -> Result<(), ExtractionError> {
        let title = page.title().await.map_err(|e| self.browser_error(e))?;
        if !self.title_pattern.is_match(&title) {
            return Err(self.navigation_error(format!(
                "title {:?} does not match /{}/",
                title, self.title_pattern
            )));
        }

        let url = page.current_url().await.map_err(|e| self.browser_error(e))?;
        if !self.url_pattern.is_match(url.as_str()) {
            return Err(self.navigation_error(format!(
                "address {} does not match /{}/",
                url, self.url_pattern
            )));
        }

        Ok(())
    }

    async fn wait_for_results(&self, page: &dyn BrowserPage) {
        if let Some(ready) = &self.results_ready {
            let timeout = Duration::from_millis(ready.timeout_ms);
            match page.wait_for(&ready.selector, timeout).await {
                Ok(()) => return,
                Err(e) => log::warn!(
                    "{} results indicator `{}` not seen ({}), waiting a fixed {:?}",
                    self.name,
                    ready.selector,
                    e,
                    self.settle
                ),
            }
        }

        tokio::time::sleep(self.settle).await;
    }

    fn advance(&self, from: ExtractionState, to: ExtractionState) -> ExtractionState {
        log::debug!("{}: {:?} -> {:?}", self.name, from, to);
        if to.is_terminal() {
            log::debug!("{} extraction finished", self.name);
        }
        to
    }

    fn navigation_error(&self, reason: String) -> ExtractionError {
        ExtractionError::Navigation {
            retailer: self.name.clone(),
            reason,
        }
    }

    fn browser_error(&self, source: PageError) -> ExtractionError {
        ExtractionError::Browser {
            retailer: self.name.clone(),
            source,
        }
    }
}
