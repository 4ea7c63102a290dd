use std::{path::Path, time::Duration};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};
use thirtyfour::{error::WebDriverError, extensions::cdp::ChromeDevTools, prelude::*};
use url::Url;

use crate::error::PageError;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// The browsing operations a retailer extractor needs.
///
/// `visible_text` and `inner_text` return whatever rendered text the browser
/// exposes at call time, untouched. Selectors are CSS selectors.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    async fn goto(&self, url: &str) -> Result<(), PageError>;

    async fn title(&self) -> Result<String, PageError>;

    async fn current_url(&self) -> Result<Url, PageError>;

    /// Clicks the first match once it shows up, giving up after `timeout`.
    async fn click(&self, selector: &str, timeout: Duration) -> Result<(), PageError>;

    /// Types `text` into the first match and presses Enter. The input may
    /// take up to `timeout` to appear.
    async fn fill_and_submit(
        &self,
        selector: &str,
        text: &str,
        timeout: Duration,
    ) -> Result<(), PageError>;

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), PageError>;

    async fn inner_text(&self, selector: &str) -> Result<String, PageError>;

    async fn visible_text(&self) -> Result<String, PageError>;

    async fn markup(&self) -> Result<String, PageError>;

    /// Saves a PNG of the whole page, beyond the visible viewport where the
    /// browser allows it.
    async fn screenshot(&self, path: &Path) -> Result<(), PageError>;
}

pub struct WebDriverPage {
    driver: WebDriver,
}

impl WebDriverPage {
    pub fn new(driver: WebDriver) -> Self {
        WebDriverPage { driver }
    }

    async fn first_within(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<WebElement, PageError> {
        self.driver
            .query(By::Css(selector))
            .wait(timeout, POLL_INTERVAL)
            .first()
            .await
            .map_err(|e| absent_or_driver(selector, e))
    }

    async fn full_page_png(&self) -> Result<Vec<u8>, PageError> {
        let dev_tools = ChromeDevTools::new(self.driver.handle.clone());
        let response = dev_tools
            .execute_cdp_with_params(
                "Page.captureScreenshot",
                json!({"captureBeyondViewport": true, "format": "png"}),
            )
            .await?;
        decode_capture(&response)
    }

    async fn first_now(&self, selector: &str) -> Result<WebElement, PageError> {
        self.driver
            .find(By::Css(selector))
            .await
            .map_err(|e| absent_or_driver(selector, e))
    }
}

fn absent_or_driver(selector: &str, error: WebDriverError) -> PageError {
    match error {
        WebDriverError::NoSuchElement(_) => PageError::ElementNotFound {
            selector: selector.to_string(),
        },
        other => PageError::Driver(other),
    }
}

/// PNG bytes from a `Page.captureScreenshot` response.
fn decode_capture(response: &Value) -> Result<Vec<u8>, PageError> {
    let data = response
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| PageError::Capture("response has no `data` field".to_string()))?;

    STANDARD
        .decode(data)
        .map_err(|e| PageError::Capture(e.to_string()))
}

#[async_trait]
impl BrowserPage for WebDriverPage {
    async fn goto(&self, url: &str) -> Result<(), PageError> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn title(&self) -> Result<String, PageError> {
        Ok(self.driver.title().await?)
    }

    async fn current_url(&self) -> Result<Url, PageError> {
        Ok(self.driver.current_url().await?)
    }

    async fn click(&self, selector: &str, timeout: Duration) -> Result<(), PageError> {
        let element = self.first_within(selector, timeout).await?;
        element.click().await?;
        Ok(())
    }

    async fn fill_and_submit(
        &self,
        selector: &str,
        text: &str,
        timeout: Duration,
    ) -> Result<(), PageError> {
        let input = self.first_within(selector, timeout).await?;
        input.clear().await?;
        input.send_keys(text).await?;
        input.send_keys(Key::Enter + "").await?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), PageError> {
        self.first_within(selector, timeout).await?;
        Ok(())
    }

    async fn inner_text(&self, selector: &str) -> Result<String, PageError> {
        let element = self.first_now(selector).await?;
        Ok(element.text().await?)
    }

    async fn visible_text(&self) -> Result<String, PageError> {
        let body = self.first_now("body").await?;
        Ok(body.text().await?)
    }

    async fn markup(&self) -> Result<String, PageError> {
        Ok(self.driver.source().await?)
    }

    async fn screenshot(&self, path: &Path) -> Result<(), PageError> {
        match self.full_page_png().await {
            Ok(png) => tokio::fs::write(path, png).await?,
            Err(e) => {
                log::warn!(
                    "Full-page capture failed ({}), saving the viewport only",
                    e
                );
                self.driver.screenshot(path).await?;
            }
        }
        Ok(())
    }
}
