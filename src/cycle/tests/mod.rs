
use crate::browser::SearchPage;
use crate::config::WatcherConfig;
use crate::cycle::Watcher;
use crate::error::{Error, Result};
use crate::keywords::Keywords;
use crate::listing::Listing;
use crate::notify::Notifier;
use crate::store::SeenSet;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Serves a fixed page source, or a wait timeout
pub(crate) struct FakePage {
    html: Option<String>,
    loads: Arc<Mutex<u32>>,
}

#[async_trait]
impl SearchPage for FakePage {
    async fn load(&mut self, _url: &str, _ready_selector: &str, _wait: Duration) -> Result<String> {
        *self.loads.lock().unwrap() += 1;
        self.html
            .clone()
            .ok_or(Error::Timeout("waiting for listings"))
    }
}

/// Records every listing it is asked to deliver
#[derive(Clone, Default)]
pub(crate) struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Listing>>>,
}

impl RecordingNotifier {
    pub(crate) fn sent(&self) -> Vec<Listing> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, listing: &Listing) {
        self.sent.lock().unwrap().push(listing.clone());
    }
}

pub(crate) struct Harness {
    pub dir: TempDir,
    pub notifier: RecordingNotifier,
    pub loads: Arc<Mutex<u32>>,
    pub watcher: Watcher<FakePage, RecordingNotifier>,
}

impl Harness {
    pub(crate) fn database(&self) -> std::path::PathBuf {
        self.dir.path().join("database.json")
    }
}

/// Builds a watcher over `html` (None simulates a timeout) with origin `https://site`
pub(crate) fn harness(keywords: &[&str], seen: &[&str], html: Option<String>) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config = WatcherConfig {
        site_origin: "https://site".to_string(),
        search_url: "https://site/recherche".to_string(),
        database_path: dir.path().join("database.json"),
        ..WatcherConfig::default()
    };

    let notifier = RecordingNotifier::default();
    let loads = Arc::new(Mutex::new(0));
    let page = FakePage {
        html,
        loads: loads.clone(),
    };
    let watcher = Watcher::new(
        &config,
        Keywords::from_iter(keywords.iter().copied()),
        seen.iter().copied().collect(),
        page,
        notifier.clone(),
    )
    .unwrap();

    Harness {
        dir,
        notifier,
        loads,
        watcher,
    }
}

/// One listing card in the target site's markup
pub(crate) fn card(href: &str, title: &str, price: Option<&str>, specs: &[&str]) -> String {
    let price = price
        .map(|p| format!("<p data-test-id=\"price\">{}</p>", p))
        .unwrap_or_default();
    let specs = specs
        .iter()
        .map(|s| {
            format!(
                "<div class=\"relative h-full whitespace-nowrap\"><p>Label</p><p>{}</p></div>",
                s
            )
        })
        .collect::<String>();
    format!(
        "<a data-test-id=\"ad\" href=\"{}\"><p data-qa-id=\"aditem_title\">{}</p>{}{}</a>",
        href, title, price, specs
    )
}

pub(crate) fn page(cards: &[String]) -> String {
    format!("<html><body><main>{}</main></body></html>", cards.concat())
}

pub(crate) fn stored(harness: &Harness) -> SeenSet {
    SeenSet::load(harness.database()).unwrap()
}
