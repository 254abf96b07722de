use ad_watch::browser::WebDriverPage;
use ad_watch::notify::{LogNotifier, Notifier, WebhookNotifier};
use ad_watch::schedule::{PeriodicTask, TokioClock};
use ad_watch::{Watcher, WatcherConfig, prepare};
use clap::Parser;
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match WatcherConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                ::log::error!("Failed to load configuration from {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => WatcherConfig::default(),
    };
    config.apply_env();
    args.apply(&mut config);

    let (keywords, seen) = match prepare(&config) {
        Ok(state) => state,
        Err(e) => {
            ::log::error!("{}, exiting", e);
            return ExitCode::FAILURE;
        }
    };

    let notifier: Box<dyn Notifier> = match config.webhook_url.clone() {
        Some(endpoint) => match WebhookNotifier::new(endpoint) {
            Ok(notifier) => Box::new(notifier),
            Err(e) => {
                ::log::error!("Failed to build the webhook client: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => {
            ::log::warn!("No webhook configured (set WEBHOOK_URL); new listings will only be logged");
            Box::new(LogNotifier)
        }
    };

    println!("Note: ad-watch requires a WebDriver server (e.g., ChromeDriver).");
    println!("Set WEBDRIVER_URL environment variable if not using the default http://localhost:4444");

    let page = match WebDriverPage::connect(&config).await {
        Ok(page) => page,
        Err(e) => {
            ::log::error!("Failed to start the browser: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let session = page.session();

    let watcher = match Watcher::new(&config, keywords, seen, page, notifier) {
        Ok(watcher) => watcher,
        Err(e) => {
            ::log::error!("{}", e);
            if let Err(e) = session.close().await {
                ::log::warn!("Failed to close browser session: {}", e);
            }
            return ExitCode::FAILURE;
        }
    };

    ::log::info!(
        "Watching {} every {} seconds",
        config.search_url,
        config.poll_interval_secs
    );
    let mut handle = PeriodicTask::new(config.poll_interval(), TokioClock).start(watcher);

    let ended = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                ::log::error!("Failed to listen for Ctrl-C: {}", e);
            }
            None
        }
        result = &mut handle => Some(result),
    };

    let (result, code) = match ended {
        None => {
            ::log::info!("Interrupted, finishing the current cycle");
            (handle.stop().await, ExitCode::SUCCESS)
        }
        Some(result) => (result, ExitCode::FAILURE),
    };

    let closed = match result {
        Ok(watcher) => watcher.into_page().close().await,
        Err(e) => {
            ::log::error!("Poll loop ended abnormally: {}", e);
            session.close().await.map_err(Into::into)
        }
    };
    if let Err(e) = closed {
        ::log::warn!("Failed to close browser session: {}", e);
    }

    code
}
