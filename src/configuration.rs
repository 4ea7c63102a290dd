use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::verdict::PricePredicate;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub browser: BrowserSettings,
    pub run: RunSettings,
    pub retailers: RetailerPair,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub user_agent: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub window_width: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub window_height: u32,
    pub locale: String,
    pub headless: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunSettings {
    pub query: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
    pub artifact_dir: String,
    pub predicate: PricePredicate,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub markup_excerpt_len: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetailerPair {
    pub left: RetailerSettings,
    pub right: RetailerSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetailerSettings {
    pub name: String,
    pub landing_url: String,
    pub title_pattern: String,
    pub url_pattern: String,
    pub search_input: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub search_timeout_ms: u64,
    pub interstitial: Option<InterstitialSettings>,
    pub results_ready: Option<ResultsReadySettings>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub settle_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub navigation_attempts: u32,
    pub price: PriceStrategySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterstitialSettings {
    pub selector: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultsReadySettings {
    pub selector: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum PriceStrategySettings {
    FullText {
        pattern: String,
    },
    Element {
        selector: String,
        #[serde(deserialize_with = "deserialize_number_from_string")]
        timeout_ms: u64,
    },
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| config::ConfigError::Foreign(e.into()))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(
            config::File::from(configuration_directory.join(environment_filename)).required(false),
        )
        // E.g. `APP_RUN__QUERY="pixel 8"` sets `Settings.run.query`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
