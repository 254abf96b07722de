use ad_watch::WatcherConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ad-watch")]
#[command(about = "Polls a classified-ads search page and forwards new keyword matches to a webhook")]
#[command(version)]
pub struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Newline-delimited keyword file
    #[arg(short, long)]
    pub keywords: Option<PathBuf>,

    /// Seen-listings store
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// Search results page to poll
    #[arg(long)]
    pub search_url: Option<String>,

    /// WebDriver server URL
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Seconds between poll cycles
    #[arg(long)]
    pub interval: Option<u64>,

    /// Seconds to wait for the search page to render
    #[arg(long)]
    pub wait_timeout: Option<u64>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,
}

impl Args {
    /// Overlay command-line values onto `config`
    pub fn apply(self, config: &mut WatcherConfig) {
        if let Some(path) = self.keywords {
            config.keywords_path = path;
        }
        if let Some(path) = self.database {
            config.database_path = path;
        }
        if let Some(url) = self.search_url {
            config.search_url = url;
        }
        if let Some(url) = self.webdriver_url {
            config.webdriver_url = url;
        }
        if let Some(secs) = self.interval {
            config.poll_interval_secs = secs;
        }
        if let Some(secs) = self.wait_timeout {
            config.wait_timeout_secs = secs;
        }
        if self.headless {
            config.headless = true;
        }
    }
}
