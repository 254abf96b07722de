use crate::config::WatcherConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::time::Duration;
use tokio::time::timeout;

/// Something that can render the search results page
#[async_trait]
pub trait SearchPage: Send {
    /// Navigates to `url`, waits up to `wait` for `ready_selector` to match,
    /// and returns the rendered page source
    async fn load(&mut self, url: &str, ready_selector: &str, wait: Duration) -> Result<String>;
}

/// Search page rendered by a browser behind a WebDriver server
pub struct WebDriverPage {
    client: Client,
}

impl WebDriverPage {
    /// Opens a browser session, trying common local WebDriver ports if the
    /// configured one is unreachable
    pub async fn connect(config: &WatcherConfig) -> Result<Self> {
        let caps = capabilities(config);

        let err = match open_session(&config.webdriver_url, &caps).await {
            Ok(client) => return Ok(Self { client }),
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    config.webdriver_url,
                    e
                );
                e
            }
        };

        let fallback_urls = [
            "http://localhost:9515", // ChromeDriver default
            "http://127.0.0.1:4444", // Try with IP instead of localhost
        ];

        for url in fallback_urls.iter() {
            if *url == config.webdriver_url {
                continue;
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = open_session(url, &caps).await {
                return Ok(Self { client });
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(err)
    }

    /// Handle to the underlying session, for closing it from elsewhere
    pub fn session(&self) -> Client {
        self.client.clone()
    }

    /// Ends the browser session
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}

#[async_trait]
impl SearchPage for WebDriverPage {
    async fn load(&mut self, url: &str, ready_selector: &str, wait: Duration) -> Result<String> {
        let started = std::time::Instant::now();

        timeout(wait, self.client.goto(url))
            .await
            .map_err(|_| Error::Timeout("navigating to the search page"))??;

        self.client
            .wait()
            .at_most(wait)
            .for_element(Locator::Css(ready_selector))
            .await?;

        let html = self.client.source().await?;

        ::log::debug!(
            "Rendered search page in {:.2} seconds",
            started.elapsed().as_secs_f64()
        );
        Ok(html)
    }
}

async fn open_session(webdriver_url: &str, caps: &Map<String, Value>) -> Result<Client> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(caps.clone());
    let client = builder.connect(webdriver_url).await?;
    ::log::debug!("Connected to WebDriver at {}", webdriver_url);
    Ok(client)
}

/// Chrome capabilities for the browsing context
fn capabilities(config: &WatcherConfig) -> Map<String, Value> {
    let mut args = vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        format!("--user-agent={}", config.user_agent),
        "--window-size=1280,720".to_string(),
    ];
    if config.headless {
        args.push("--headless=new".to_string());
    }

    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}
