use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use pricecheck::{
    configuration::{
        BrowserSettings, InterstitialSettings, PriceStrategySettings, RetailerPair,
        RetailerSettings, RunSettings, Settings,
    },
    domain::verdict::PricePredicate,
    error::PageError,
    services::{BrowserPage, SessionSource},
};
use url::Url;

/// In-memory page whose elements are looked up by exact selector string.
pub struct FakePage {
    pub title: String,
    pub url: String,
    pub body_text: String,
    pub elements: HashMap<String, String>,
    pub unclickable: Vec<String>,
    /// Selectors that only appear after the given delay.
    pub late_elements: HashMap<String, Duration>,
    pub unreadable: bool,
    pub stall: Option<Duration>,
    pub title_sequence: Mutex<Vec<String>>,
    pub visits: Mutex<Vec<String>>,
    pub searches: Mutex<Vec<String>>,
    pub clicks: Mutex<Vec<String>>,
    pub screenshots: Mutex<Vec<PathBuf>>,
}

impl FakePage {
    pub fn new(title: &str, url: &str) -> Self {
        FakePage {
            title: title.to_string(),
            url: url.to_string(),
            body_text: String::new(),
            elements: HashMap::new(),
            unclickable: vec![],
            late_elements: HashMap::new(),
            unreadable: false,
            stall: None,
            title_sequence: Mutex::new(vec![]),
            visits: Mutex::new(vec![]),
            searches: Mutex::new(vec![]),
            clicks: Mutex::new(vec![]),
            screenshots: Mutex::new(vec![]),
        }
    }

    pub fn with_element(mut self, selector: &str, text: &str) -> Self {
        self.elements.insert(selector.to_string(), text.to_string());
        self
    }

    pub fn with_body_text(mut self, text: &str) -> Self {
        self.body_text = text.to_string();
        self
    }

    /// Titles returned by the first calls to `title`, before `title` applies.
    pub fn with_title_sequence(self, titles: &[&str]) -> Self {
        *self.title_sequence.lock().unwrap() = titles.iter().rev().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_unclickable(mut self, selector: &str) -> Self {
        self.unclickable.push(selector.to_string());
        self
    }

    pub fn with_late_element(mut self, selector: &str, delay: Duration) -> Self {
        self.elements.insert(selector.to_string(), String::new());
        self.late_elements.insert(selector.to_string(), delay);
        self
    }

    /// Page text can no longer be read, as when the tab has crashed.
    pub fn unreadable(mut self) -> Self {
        self.unreadable = true;
        self
    }

    /// Navigation hangs for `delay` before completing.
    pub fn stalling(mut self, delay: Duration) -> Self {
        self.stall = Some(delay);
        self
    }

    async fn appear_within(&self, selector: &str, timeout: Duration) -> Result<(), PageError> {
        if !self.elements.contains_key(selector) {
            return Err(Self::absent(selector));
        }
        let Some(delay) = self.late_elements.get(selector).copied() else {
            return Ok(());
        };

        tokio::time::sleep(delay.min(timeout)).await;
        match delay <= timeout {
            true => Ok(()),
            false => Err(Self::absent(selector)),
        }
    }

    fn absent(selector: &str) -> PageError {
        PageError::ElementNotFound {
            selector: selector.to_string(),
        }
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn goto(&self, url: &str) -> Result<(), PageError> {
        if let Some(delay) = self.stall {
            tokio::time::sleep(delay).await;
        }
        self.visits.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn title(&self) -> Result<String, PageError> {
        Ok(self
            .title_sequence
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| self.title.clone()))
    }

    async fn current_url(&self) -> Result<Url, PageError> {
        Ok(Url::parse(&self.url).unwrap())
    }

    async fn click(&self, selector: &str, _timeout: Duration) -> Result<(), PageError> {
        if self.unclickable.iter().any(|s| s == selector) {
            return Err(PageError::Io(std::io::Error::other("element not interactable")));
        }
        if !self.elements.contains_key(selector) {
            return Err(Self::absent(selector));
        }
        self.clicks.lock().unwrap().push(selector.to_string());
        Ok(())
    }

    async fn fill_and_submit(
        &self,
        selector: &str,
        text: &str,
        timeout: Duration,
    ) -> Result<(), PageError> {
        self.appear_within(selector, timeout).await?;
        self.searches.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), PageError> {
        self.appear_within(selector, timeout).await
    }

    async fn inner_text(&self, selector: &str) -> Result<String, PageError> {
        self.elements
            .get(selector)
            .cloned()
            .ok_or_else(|| Self::absent(selector))
    }

    async fn visible_text(&self) -> Result<String, PageError> {
        if self.unreadable {
            return Err(PageError::Io(std::io::Error::other("tab crashed")));
        }
        Ok(self.body_text.clone())
    }

    async fn markup(&self) -> Result<String, PageError> {
        Ok(format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            self.title, self.body_text
        ))
    }

    async fn screenshot(&self, path: &Path) -> Result<(), PageError> {
        self.screenshots.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// Hands out pre-built pages in order and counts what was opened and released.
pub struct FakeSessions {
    pages: Mutex<Vec<Result<FakePage, PageError>>>,
    pub opened: AtomicUsize,
    pub released: AtomicUsize,
    pub release_calls: AtomicUsize,
}

impl FakeSessions {
    pub fn new(pages: Vec<Result<FakePage, PageError>>) -> Self {
        FakeSessions {
            pages: Mutex::new(pages.into_iter().rev().collect()),
            opened: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            release_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SessionSource for FakeSessions {
    type Page = FakePage;

    async fn open_page(&self) -> Result<FakePage, PageError> {
        let next = self
            .pages
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(PageError::Io(std::io::Error::other("no session left"))));
        if next.is_ok() {
            self.opened.fetch_add(1, Ordering::SeqCst);
        }
        next
    }

    async fn release(&self) {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        self.released
            .store(self.opened.load(Ordering::SeqCst), Ordering::SeqCst);
    }
}

pub fn test_settings(test_name: &str, timeout_secs: u64) -> Settings {
    Settings {
        browser: BrowserSettings {
            webdriver_url: "http://localhost:9515".to_string(),
            user_agent: "pricecheck-tests".to_string(),
            window_width: 1280,
            window_height: 800,
            locale: "en-US".to_string(),
            headless: true,
        },
        run: RunSettings {
            query: "iphone 15 plus".to_string(),
            timeout_secs,
            artifact_dir: artifact_dir(test_name).display().to_string(),
            predicate: PricePredicate::LessThan,
            markup_excerpt_len: 2000,
        },
        retailers: RetailerPair {
            left: flipkart_settings(),
            right: amazon_settings(),
        },
    }
}

pub fn flipkart_settings() -> RetailerSettings {
    RetailerSettings {
        name: "flipkart".to_string(),
        landing_url: "https://www.flipkart.com".to_string(),
        title_pattern: "Online Shopping Site".to_string(),
        url_pattern: r"flipkart\.com".to_string(),
        search_input: r#"input[name="q"]"#.to_string(),
        search_timeout_ms: 1000,
        interstitial: Some(InterstitialSettings {
            selector: "button._2KpZ6l._2doB4z".to_string(),
            timeout_ms: 10,
        }),
        results_ready: None,
        settle_ms: 0,
        navigation_attempts: 1,
        price: PriceStrategySettings::FullText {
            pattern: r"₹\s?[0-9,]+".to_string(),
        },
    }
}

pub fn amazon_settings() -> RetailerSettings {
    RetailerSettings {
        name: "amazon".to_string(),
        landing_url: "https://www.amazon.in".to_string(),
        title_pattern: "Amazon".to_string(),
        url_pattern: r"amazon\.in".to_string(),
        search_input: "input#twotabsearchtextbox".to_string(),
        search_timeout_ms: 1000,
        interstitial: None,
        results_ready: None,
        settle_ms: 0,
        navigation_attempts: 1,
        price: PriceStrategySettings::Element {
            selector: "span.a-price-whole".to_string(),
            timeout_ms: 10,
        },
    }
}

pub fn flipkart_page(body_text: &str) -> FakePage {
    FakePage::new(
        "Online Shopping Site for Mobiles, Electronics, Furniture, Grocery, Lifestyle, Books & More. Best Offers!",
        "https://www.flipkart.com/",
    )
    .with_element(r#"input[name="q"]"#, "")
    .with_body_text(body_text)
}

pub fn amazon_page(price_text: Option<&str>) -> FakePage {
    let page = FakePage::new(
        "Online Shopping site in India: Shop Online for Mobiles, Books, Watches, Shoes and More - Amazon.in",
        "https://www.amazon.in/",
    )
    .with_element("input#twotabsearchtextbox", "");

    match price_text {
        Some(text) => page.with_element("span.a-price-whole", text),
        None => page,
    }
}

pub fn artifact_dir(test_name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("pricecheck-{}", test_name))
}
