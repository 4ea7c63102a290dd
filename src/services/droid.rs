use async_trait::async_trait;
use thirtyfour::{
    CapabilitiesHelper, ChromeCapabilities, ChromiumLikeCapabilities, DesiredCapabilities,
    PageLoadStrategy, WebDriver,
};
use tokio::sync::Mutex;

use crate::{configuration::BrowserSettings, error::PageError};

use super::{BrowserPage, WebDriverPage};

/// Opens the pages a run works on and closes all of them afterwards.
#[async_trait]
pub trait SessionSource: Send + Sync {
    type Page: BrowserPage;

    async fn open_page(&self) -> Result<Self::Page, PageError>;

    /// Closes every page opened so far, including after a timed-out run.
    async fn release(&self);
}

/// One simulated client identity. Every page opened from the same `Droid`
/// presents the same user agent, window size and locale.
pub struct Droid {
    webdriver_url: String,
    capabilities: ChromeCapabilities,
    sessions: Mutex<Vec<WebDriver>>,
}

impl Droid {
    pub fn new(settings: &BrowserSettings) -> Result<Self, PageError> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg(&format!("--user-agent={}", settings.user_agent))?;
        caps.add_arg(&format!(
            "--window-size={},{}",
            settings.window_width, settings.window_height
        ))?;
        caps.add_arg(&format!("--lang={}", settings.locale))?;
        if settings.headless {
            caps.set_headless()?;
        }
        // Return from navigation on DOMContentLoaded, not full load
        caps.set_page_load_strategy(PageLoadStrategy::Eager)?;

        Ok(Droid {
            webdriver_url: settings.webdriver_url.clone(),
            capabilities: caps,
            sessions: Mutex::new(vec![]),
        })
    }
}

#[async_trait]
impl SessionSource for Droid {
    type Page = WebDriverPage;

    async fn open_page(&self) -> Result<WebDriverPage, PageError> {
        let driver = WebDriver::new(&self.webdriver_url, self.capabilities.clone()).await?;
        self.sessions.lock().await.push(driver.clone());

        log::debug!("Opened browser session at {}", self.webdriver_url);

        Ok(WebDriverPage::new(driver))
    }

    async fn release(&self) {
        let sessions: Vec<WebDriver> = self.sessions.lock().await.drain(..).collect();
        let count = sessions.len();

        for driver in sessions {
            if let Err(e) = driver.quit().await {
                log::error!("Failed to quit browser session: {:?}", e);
            }
        }

        log::info!("Released {} browser session(s)", count);
    }
}
