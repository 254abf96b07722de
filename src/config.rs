use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the watcher, built once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Search results page to poll
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Origin that relative listing links are resolved against
    #[serde(default = "default_site_origin")]
    pub site_origin: String,

    /// Webhook receiving one message per new listing
    #[serde(default)]
    pub webhook_url: Option<WebhookUrl>,

    /// Newline-delimited keyword file
    #[serde(default = "default_keywords_path")]
    pub keywords_path: PathBuf,

    /// JSON array of already-notified listing URLs
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Delay between the end of one poll cycle and the start of the next
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Upper bound for navigation and for the first listing to appear
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    /// Run the browser without a window
    #[serde(default)]
    pub headless: bool,

    /// User agent announced by the browser
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// CSS selectors describing the results page markup
    #[serde(default)]
    pub selectors: Selectors,
}

/// CSS selectors for the parts of a listing card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// One element per listing; its `href` is the relative ad link
    pub listing: String,
    /// Title within a listing
    pub title: String,
    /// Price within a listing
    pub price: String,
    /// Spec fields within a listing; the first is the year, the second the mileage
    pub spec_field: String,
    /// Value element inside a spec field
    pub spec_value: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            listing: "a[data-test-id='ad']".to_string(),
            title: "p[data-qa-id='aditem_title']".to_string(),
            price: "p[data-test-id='price']".to_string(),
            spec_field: "div.relative.h-full.whitespace-nowrap".to_string(),
            spec_value: "p:last-child".to_string(),
        }
    }
}

/// Webhook endpoint; the URL embeds a token so it is never printed
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WebhookUrl(String);

impl WebhookUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for WebhookUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WebhookUrl(<redacted>)")
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            site_origin: default_site_origin(),
            webhook_url: None,
            keywords_path: default_keywords_path(),
            database_path: default_database_path(),
            webdriver_url: default_webdriver_url(),
            poll_interval_secs: default_poll_interval_secs(),
            wait_timeout_secs: default_wait_timeout_secs(),
            headless: false,
            user_agent: default_user_agent(),
            selectors: Selectors::default(),
        }
    }
}

impl WatcherConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `WEBDRIVER_URL` and `WEBHOOK_URL` from the environment when set
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(webdriver_url) = lookup("WEBDRIVER_URL").filter(|v| !v.is_empty()) {
            self.webdriver_url = webdriver_url;
        }
        if let Some(webhook_url) = lookup("WEBHOOK_URL").filter(|v| !v.is_empty()) {
            self.webhook_url = Some(WebhookUrl::new(webhook_url));
        }
    }

    /// Reject values the watcher cannot run with
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.search_url)
            .map_err(|e| Error::Config(format!("search_url: {}", e)))?;
        url::Url::parse(&self.site_origin)
            .map_err(|e| Error::Config(format!("site_origin: {}", e)))?;
        if self.wait_timeout_secs == 0 {
            return Err(Error::Config("wait_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

/// Default value for search_url
fn default_search_url() -> String {
    "https://www.leboncoin.fr/recherche?category=2&fuel=2&price=min-3500&mileage=min-250000&sort=time"
        .to_string()
}

fn default_site_origin() -> String {
    "https://www.leboncoin.fr".to_string()
}

fn default_keywords_path() -> PathBuf {
    PathBuf::from("keywords.txt")
}

fn default_database_path() -> PathBuf {
    PathBuf::from("database.json")
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_poll_interval_secs() -> u64 {
    20
}

fn default_wait_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}
