use crate::error::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Lowercased match terms, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keywords {
    terms: Vec<String>,
}

impl Keywords {
    /// Parses newline-delimited keywords, dropping blank lines
    ///
    /// Each line is trimmed and lowercased. Duplicates are kept as-is.
    pub fn parse(text: &str) -> Self {
        let terms = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_lowercase)
            .collect();
        Self { terms }
    }

    /// True if any keyword is a substring of the lowercased title
    pub fn matches(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.terms.iter().any(|term| title.contains(term.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Keywords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let text = iter.into_iter().map(Into::into).collect::<Vec<_>>().join("\n");
        Self::parse(&text)
    }
}

/// Loads the keyword file at `path`
///
/// A missing file is reported to the operator and yields an empty set; the
/// caller decides whether that is fatal. Other read errors are returned.
pub fn load_keywords(path: impl AsRef<Path>) -> Result<Keywords> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(text) => {
            let keywords = Keywords::parse(&text);
            ::log::info!("Loaded {} keywords from {}", keywords.len(), path.display());
            Ok(keywords)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            ::log::error!(
                "Keyword file {} not found. Create it with one keyword per line.",
                path.display()
            );
            Ok(Keywords::default())
        }
        Err(e) => Err(e.into()),
    }
}
