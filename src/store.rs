use crate::error::Result;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// URLs of listings that have already been notified
///
/// Kept in insertion order so the file on disk stays stable between saves;
/// only membership matters.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    urls: Vec<String>,
    index: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the store at `path`, or an empty set if the file does not exist
    ///
    /// Malformed content is an error. Duplicate entries collapse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                ::log::info!("No store at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };

        let urls: Vec<String> = serde_json::from_str(&contents)?;
        let seen: Self = urls.into_iter().collect();
        ::log::info!("Loaded {} seen listings from {}", seen.len(), path.display());
        Ok(seen)
    }

    /// Overwrites `path` with the full set
    ///
    /// Writes to a sibling temporary file first and renames it into place, so
    /// an interrupted save leaves the previous contents intact.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let tmp = temp_path(path);

        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            let formatter = PrettyFormatter::with_indent(b"    ");
            let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
            self.urls.serialize(&mut ser)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }

        fs::rename(&tmp, path)?;
        ::log::debug!("Saved {} seen listings to {}", self.len(), path.display());
        Ok(())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains(url)
    }

    /// Records `url`; returns false if it was already present
    pub fn add(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if !self.index.insert(url.clone()) {
            return false;
        }
        self.urls.push(url);
        true
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SeenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut seen = Self::new();
        for url in iter {
            seen.add(url);
        }
        seen
    }
}

impl PartialEq for SeenSet {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for SeenSet {}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
