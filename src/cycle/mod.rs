use crate::browser::SearchPage;
use crate::config::WatcherConfig;
use crate::error::{Error, Result};
use crate::extract::{self, CompiledSelectors, ElementOutcome, ExtractError};
use crate::keywords::Keywords;
use crate::notify::Notifier;
use crate::schedule::Tick;
use crate::store::SeenSet;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[cfg(test)]
mod tests;

/// What happened during one poll cycle
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Listing elements present on the page
    pub found: usize,
    /// Elements whose title matched a keyword and whose link formed a valid URL
    pub matched: usize,
    /// Matches already notified earlier
    pub already_seen: usize,
    /// Matches handed to the notifier
    pub notified: usize,
    /// Elements passed over without error
    pub skipped: usize,
    /// Per-element extraction failures
    pub failures: Vec<ExtractError>,
    /// Set when the page never rendered; nothing else was done
    pub page_error: Option<Error>,
    /// Set when the seen set could not be written back
    pub save_error: Option<Error>,
}

impl CycleReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.page_error.is_none() && self.save_error.is_none()
    }
}

/// Owns everything one poll cycle needs
pub struct Watcher<P, N> {
    page: P,
    notifier: N,
    keywords: Keywords,
    seen: SeenSet,
    selectors: CompiledSelectors,
    search_url: String,
    origin: String,
    wait_timeout: Duration,
    database_path: PathBuf,
}

impl<P: SearchPage, N: Notifier> Watcher<P, N> {
    pub fn new(
        config: &WatcherConfig,
        keywords: Keywords,
        seen: SeenSet,
        page: P,
        notifier: N,
    ) -> Result<Self> {
        Ok(Self {
            page,
            notifier,
            keywords,
            seen,
            selectors: CompiledSelectors::new(&config.selectors)?,
            search_url: config.search_url.clone(),
            origin: validated_origin(&config.site_origin)?,
            wait_timeout: config.wait_timeout(),
            database_path: config.database_path.clone(),
        })
    }

    /// Runs one navigate, extract, filter, notify, persist pass
    ///
    /// Never fails: problems are logged and recorded in the report.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        ::log::info!("Navigating to the search page");
        let html = match self
            .page
            .load(&self.search_url, self.selectors.listing_css(), self.wait_timeout)
            .await
        {
            Ok(html) => html,
            Err(e) => {
                ::log::error!("Failed to load the search page: {}", e);
                report.page_error = Some(e);
                return report;
            }
        };

        let outcomes = extract::scan(&html, &self.selectors, &self.origin, &self.keywords);
        report.found = outcomes.len();
        ::log::info!("Found {} listings on the search page", report.found);

        for outcome in outcomes {
            match outcome {
                ElementOutcome::Candidate(listing) => {
                    report.matched += 1;
                    if !self.seen.add(listing.url.as_str()) {
                        ::log::trace!("Skipping already notified listing: {}", listing.url);
                        report.already_seen += 1;
                        continue;
                    }

                    self.notifier.notify(&listing).await;
                    report.notified += 1;
                    ::log::info!(
                        "New listing: {} | {} | {} | {}",
                        listing.title,
                        listing.price,
                        listing.year,
                        listing.mileage
                    );
                }
                ElementOutcome::Skipped(reason) => {
                    ::log::trace!("Skipped listing element: {:?}", reason);
                    report.skipped += 1;
                }
                ElementOutcome::Failed(e) => {
                    ::log::warn!("Failed to process a listing: {}", e);
                    report.failures.push(e);
                }
            }
        }

        if let Err(e) = self.seen.save(&self.database_path) {
            ::log::error!(
                "Failed to save seen listings to {}: {}",
                self.database_path.display(),
                e
            );
            report.save_error = Some(e);
        }

        report
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    /// Gives back the page, e.g. to close the browser session
    pub fn into_page(self) -> P {
        self.page
    }
}

#[async_trait]
impl<P, N> Tick for Watcher<P, N>
where
    P: SearchPage + 'static,
    N: Notifier + 'static,
{
    async fn tick(&mut self) {
        let report = self.run_cycle().await;
        if report.is_clean() {
            ::log::info!(
                "Cycle done: {} found, {} matched, {} new, {} already seen",
                report.found,
                report.matched,
                report.notified,
                report.already_seen
            );
        } else if report.page_error.is_none() {
            ::log::warn!(
                "Cycle done with errors: {} found, {} new, {} failed, store saved: {}",
                report.found,
                report.notified,
                report.failures.len(),
                report.save_error.is_none()
            );
        }
    }
}

fn validated_origin(origin: &str) -> Result<String> {
    Url::parse(origin)?;
    Ok(origin.to_string())
}
