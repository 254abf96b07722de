use serde::{Deserialize, Serialize};

/// Shown when a listing has no price element
pub const UNSPECIFIED_PRICE: &str = "Non spécifié";

/// Shown when a listing has no year field
pub const UNSPECIFIED_YEAR: &str = "Non spécifiée";

/// Shown when a listing has no mileage field
pub const UNSPECIFIED_MILEAGE: &str = "Non spécifié";

/// A classified ad scraped from the search results page
///
/// Identified by its absolute URL only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Title as displayed on the page
    pub title: String,

    /// Free-form price text, or [`UNSPECIFIED_PRICE`]
    pub price: String,

    /// Model year, or [`UNSPECIFIED_YEAR`]
    pub year: String,

    /// Mileage text, or [`UNSPECIFIED_MILEAGE`]
    pub mileage: String,

    /// Absolute URL of the ad
    pub url: String,
}

impl Listing {
    /// Create a listing with every optional field set to its sentinel
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            price: UNSPECIFIED_PRICE.to_string(),
            year: UNSPECIFIED_YEAR.to_string(),
            mileage: UNSPECIFIED_MILEAGE.to_string(),
            url: url.into(),
        }
    }
}
