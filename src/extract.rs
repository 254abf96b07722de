//! Listing extraction from a rendered search results page.
//!
//! Every listing element is handled on its own and yields exactly one
//! [`ElementOutcome`], so a malformed card never hides its siblings.

use crate::config::Selectors;
use crate::error::{Error, Result};
use crate::keywords::Keywords;
use crate::listing::{Listing, UNSPECIFIED_MILEAGE, UNSPECIFIED_YEAR};
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use url::Url;

/// Selectors compiled once at startup
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    listing_css: String,
    listing: Selector,
    title: Selector,
    price: Selector,
    spec_field: Selector,
    spec_value: Selector,
}

impl CompiledSelectors {
    pub fn new(selectors: &Selectors) -> Result<Self> {
        Ok(Self {
            listing_css: selectors.listing.clone(),
            listing: compile(&selectors.listing)?,
            title: compile(&selectors.title)?,
            price: compile(&selectors.price)?,
            spec_field: compile(&selectors.spec_field)?,
            spec_value: compile(&selectors.spec_value)?,
        })
    }

    /// Raw selector for listing elements, used to wait for the page
    pub fn listing_css(&self) -> &str {
        &self.listing_css
    }
}

fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Selector(format!("{}: {}", css, e)))
}

/// Why an element was passed over without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No title element
    NoTitle,
    /// Title matched none of the keywords
    NoKeyword,
    /// No link attribute on the listing element
    NoLink,
}

/// A listing element that could not be extracted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The site origin followed by the link is not a valid URL
    InvalidLink { href: String, source: url::ParseError },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLink { href, source } => {
                write!(f, "invalid listing link {:?}: {}", href, source)
            }
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidLink { source, .. } => Some(source),
        }
    }
}

/// Result of extracting one listing element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementOutcome {
    /// Title matched a keyword and the link formed a valid URL
    Candidate(Listing),
    Skipped(SkipReason),
    Failed(ExtractError),
}

/// Extracts every listing element on the page, in document order
///
/// Listing URLs are `origin` with the raw `href` appended, so they stay
/// byte-for-byte comparable with previously stored ones.
pub fn scan(
    html: &str,
    selectors: &CompiledSelectors,
    origin: &str,
    keywords: &Keywords,
) -> Vec<ElementOutcome> {
    let doc = Html::parse_document(html);
    let outcomes = doc
        .select(&selectors.listing)
        .map(|element| extract_element(element, selectors, origin, keywords))
        .collect::<Vec<_>>();

    ::log::debug!("Scanned {} listing elements", outcomes.len());
    outcomes
}

fn extract_element(
    element: ElementRef<'_>,
    selectors: &CompiledSelectors,
    origin: &str,
    keywords: &Keywords,
) -> ElementOutcome {
    let title = match first_text(element, &selectors.title) {
        Some(title) => title,
        None => return ElementOutcome::Skipped(SkipReason::NoTitle),
    };

    if !keywords.matches(&title) {
        return ElementOutcome::Skipped(SkipReason::NoKeyword);
    }

    let href = match element.value().attr("href") {
        Some(href) if !href.is_empty() => href,
        _ => return ElementOutcome::Skipped(SkipReason::NoLink),
    };

    let url = format!("{}{}", origin.trim_end_matches('/'), href);
    if let Err(source) = Url::parse(&url) {
        return ElementOutcome::Failed(ExtractError::InvalidLink {
            href: href.to_string(),
            source,
        });
    }

    let mut listing = Listing::new(title, url);

    if let Some(price) = first_text(element, &selectors.price) {
        listing.price = price;
    }

    let fields = element.select(&selectors.spec_field).collect::<Vec<_>>();
    if fields.len() >= 2 {
        listing.year = first_text(fields[0], &selectors.spec_value)
            .unwrap_or_else(|| UNSPECIFIED_YEAR.to_string());
        listing.mileage = first_text(fields[1], &selectors.spec_value)
            .unwrap_or_else(|| UNSPECIFIED_MILEAGE.to_string());
    }

    ElementOutcome::Candidate(listing)
}

/// Whitespace-normalised text of the first match
///
/// An element that exists but has no text yields an empty string.
fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().map(normalized_text)
}

fn normalized_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::UNSPECIFIED_PRICE;

    fn selectors() -> CompiledSelectors {
        CompiledSelectors::new(&Selectors::default()).unwrap()
    }

    fn origin() -> &'static str {
        "https://site"
    }

    fn card(href: Option<&str>, title: Option<&str>, price: Option<&str>, specs: &[&str]) -> String {
        let href = href.map(|h| format!(" href=\"{}\"", h)).unwrap_or_default();
        let title = title
            .map(|t| format!("<p data-qa-id=\"aditem_title\">{}</p>", t))
            .unwrap_or_default();
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
        format!("<a data-test-id=\"ad\"{}>{}{}{}</a>", href, title, price, specs)
    }

    fn page(cards: &[String]) -> String {
        format!("<html><body><div>{}</div></body></html>", cards.concat())
    }

    #[test]
    fn test_full_listing() {
        let html = page(&[card(
            Some("/ad/1"),
            Some("Renault Clio 2015"),
            Some("3 500 €"),
            &["2015", "180 000 km"],
        )]);
        let keywords = Keywords::from_iter(["clio"]);
        let outcomes = scan(&html, &selectors(), origin(), &keywords);

        assert_eq!(
            outcomes,
            vec![ElementOutcome::Candidate(Listing {
                title: "Renault Clio 2015".to_string(),
                price: "3 500 €".to_string(),
                year: "2015".to_string(),
                mileage: "180 000 km".to_string(),
                url: "https://site/ad/1".to_string(),
            })]
        );
    }

    #[test]
    fn test_missing_fields_use_sentinels() {
        let html = page(&[card(Some("/ad/2"), Some("Clio II"), None, &["2004"])]);
        let keywords = Keywords::from_iter(["clio"]);
        let outcomes = scan(&html, &selectors(), origin(), &keywords);

        match &outcomes[..] {
            [ElementOutcome::Candidate(listing)] => {
                assert_eq!(listing.price, UNSPECIFIED_PRICE);
                assert_eq!(listing.year, UNSPECIFIED_YEAR);
                assert_eq!(listing.mileage, UNSPECIFIED_MILEAGE);
            }
            other => panic!("unexpected outcomes: {:?}", other),
        }
    }

    #[test]
    fn test_skip_reasons() {
        let html = page(&[
            card(Some("/ad/1"), None, None, &[]),
            card(Some("/ad/2"), Some("Peugeot 208"), None, &[]),
            card(Some("/ad/5"), Some(""), None, &[]),
            card(None, Some("Clio"), None, &[]),
            card(Some(""), Some("Clio"), None, &[]),
        ]);
        let keywords = Keywords::from_iter(["clio"]);
        let outcomes = scan(&html, &selectors(), origin(), &keywords);

        assert_eq!(
            outcomes,
            vec![
                ElementOutcome::Skipped(SkipReason::NoTitle),
                ElementOutcome::Skipped(SkipReason::NoKeyword),
                ElementOutcome::Skipped(SkipReason::NoKeyword),
                ElementOutcome::Skipped(SkipReason::NoLink),
                ElementOutcome::Skipped(SkipReason::NoLink),
            ]
        );
    }

    #[test]
    fn test_bad_link_fails_only_its_element() {
        let html = page(&[
            card(Some("/ad/1"), Some("Clio 1"), None, &[]),
            card(Some(":notaport"), Some("Clio 2"), None, &[]),
            card(Some("/ad/3"), Some("Clio 3"), None, &[]),
        ]);
        let keywords = Keywords::from_iter(["clio"]);
        let outcomes = scan(&html, &selectors(), origin(), &keywords);

        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes[0], ElementOutcome::Candidate(_)));
        assert!(matches!(
            outcomes[1],
            ElementOutcome::Failed(ExtractError::InvalidLink { .. })
        ));
        assert!(matches!(outcomes[2], ElementOutcome::Candidate(_)));
    }

    #[test]
    fn test_title_whitespace_is_normalised() {
        let html = page(&[card(Some("/ad/1"), Some("  Renault\n   Clio  "), None, &[])]);
        let keywords = Keywords::from_iter(["renault clio"]);
        let outcomes = scan(&html, &selectors(), origin(), &keywords);

        match &outcomes[..] {
            [ElementOutcome::Candidate(listing)] => assert_eq!(listing.title, "Renault Clio"),
            other => panic!("unexpected outcomes: {:?}", other),
        }
    }

    #[test]
    fn test_inline_markup_does_not_split_title() {
        let html = page(&[card(Some("/ad/1"), Some("Clio<b>V</b> RS"), None, &[])]);
        let keywords = Keywords::from_iter(["cliov"]);
        let outcomes = scan(&html, &selectors(), origin(), &keywords);

        match &outcomes[..] {
            [ElementOutcome::Candidate(listing)] => assert_eq!(listing.title, "ClioV RS"),
            other => panic!("unexpected outcomes: {:?}", other),
        }
    }

    #[test]
    fn test_url_is_origin_followed_by_raw_href() {
        let html = page(&[
            card(Some("/ad/voitures/clio léger 1"), Some("Clio 1"), None, &[]),
            card(Some("//other.example/ad/2"), Some("Clio 2"), None, &[]),
            card(Some("/ad/../x/3"), Some("Clio 3"), None, &[]),
        ]);
        let keywords = Keywords::from_iter(["clio"]);
        let urls = scan(&html, &selectors(), "https://www.leboncoin.fr/", &keywords)
            .into_iter()
            .map(|outcome| match outcome {
                ElementOutcome::Candidate(listing) => listing.url,
                other => panic!("unexpected outcome: {:?}", other),
            })
            .collect::<Vec<_>>();

        assert_eq!(
            urls,
            vec![
                "https://www.leboncoin.fr/ad/voitures/clio léger 1",
                "https://www.leboncoin.fr//other.example/ad/2",
                "https://www.leboncoin.fr/ad/../x/3",
            ]
        );
    }

    #[test]
    fn test_empty_fields_are_kept_empty() {
        let html = page(&[card(Some("/ad/1"), Some("Clio"), Some(""), &["", ""])]);
        let keywords = Keywords::from_iter(["clio"]);
        let outcomes = scan(&html, &selectors(), origin(), &keywords);

        match &outcomes[..] {
            [ElementOutcome::Candidate(listing)] => {
                assert_eq!(listing.price, "");
                assert_eq!(listing.year, "");
                assert_eq!(listing.mileage, "");
            }
            other => panic!("unexpected outcomes: {:?}", other),
        }
    }

    #[test]
    fn test_no_listings() {
        let html = "<html><body><p>Aucune annonce</p></body></html>";
        let keywords = Keywords::from_iter(["clio"]);
        assert!(scan(html, &selectors(), origin(), &keywords).is_empty());
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let selectors = Selectors {
            title: "p[".to_string(),
            ..Selectors::default()
        };
        assert!(matches!(
            CompiledSelectors::new(&selectors),
            Err(Error::Selector(_))
        ));
    }
}
