//! Error types for ad-watch.

use std::fmt;

/// Crate-wide error type.
#[derive(Debug)]
pub enum Error {
    /// Filesystem error (keyword file, seen-set store).
    Io(std::io::Error),
    /// JSON serialization/deserialization error.
    Json(serde_json::Error),
    /// HTTP request to the webhook failed.
    Http(reqwest::Error),
    /// A WebDriver command failed.
    WebDriver(fantoccini::error::CmdError),
    /// No WebDriver session could be opened.
    Session(fantoccini::error::NewSessionError),
    /// A URL could not be parsed or joined.
    Url(url::ParseError),
    /// A CSS selector failed to compile.
    Selector(String),
    /// An operation did not finish in time.
    Timeout(&'static str),
    /// Invalid configuration.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
            Self::Http(e) => write!(f, "HTTP error: {}", e),
            Self::WebDriver(e) => write!(f, "WebDriver error: {}", e),
            Self::Session(e) => write!(f, "WebDriver session error: {}", e),
            Self::Url(e) => write!(f, "URL error: {}", e),
            Self::Selector(msg) => write!(f, "Invalid selector: {}", msg),
            Self::Timeout(what) => write!(f, "Timed out while {}", what),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Http(e) => Some(e),
            Self::WebDriver(e) => Some(e),
            Self::Session(e) => Some(e),
            Self::Url(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        // The webhook URL carries a secret token.
        Self::Http(e.without_url())
    }
}

impl From<fantoccini::error::CmdError> for Error {
    fn from(e: fantoccini::error::CmdError) -> Self {
        Self::WebDriver(e)
    }
}

impl From<fantoccini::error::NewSessionError> for Error {
    fn from(e: fantoccini::error::NewSessionError) -> Self {
        Self::Session(e)
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Self::Url(e)
    }
}

/// Result type for ad-watch operations.
pub type Result<T> = std::result::Result<T, Error>;
