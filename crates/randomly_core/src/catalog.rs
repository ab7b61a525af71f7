//! Locale-keyed word and record lists.
//!
//! A catalog is a numbered `.properties` file (`nouns.1=river`,
//! `nouns.2=mountain`, ...). For base `text/nouns/nouns` and locale `de-DE`
//! the loader tries `text/nouns/nouns_de_DE.properties`, then
//! `text/nouns/nouns_de.properties`, and fails with [`Error::NotFound`]
//! otherwise. There is no fallback language.
//!
//! Entries are returned in ascending number order. Selection from a catalog
//! goes through [`Stream::index`](crate::rng::Stream::index) and friends only.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::error::{require, Error, Result};
use crate::locale::Locale;

/// Catalogs compiled into the crate.
const BUNDLED: &[(&str, &str)] = &[
    (
        "text/nouns/nouns_en.properties",
        include_str!("../catalog/text/nouns/nouns_en.properties"),
    ),
    (
        "text/nouns/nouns_de.properties",
        include_str!("../catalog/text/nouns/nouns_de.properties"),
    ),
    (
        "text/verbs/verbs_en.properties",
        include_str!("../catalog/text/verbs/verbs_en.properties"),
    ),
    (
        "text/verbs/verbs_de.properties",
        include_str!("../catalog/text/verbs/verbs_de.properties"),
    ),
    (
        "text/adjectives/adjectives_en.properties",
        include_str!("../catalog/text/adjectives/adjectives_en.properties"),
    ),
    (
        "text/adjectives/adjectives_de.properties",
        include_str!("../catalog/text/adjectives/adjectives_de.properties"),
    ),
    (
        "text/udhr_en.properties",
        include_str!("../catalog/text/udhr_en.properties"),
    ),
    (
        "text/udhr_de.properties",
        include_str!("../catalog/text/udhr_de.properties"),
    ),
    (
        "finance/stocks_en.properties",
        include_str!("../catalog/finance/stocks_en.properties"),
    ),
    (
        "finance/stocks_de_DE.properties",
        include_str!("../catalog/finance/stocks_de_DE.properties"),
    ),
];

#[derive(Clone, Debug)]
enum Source {
    Bundled,
    Directory(PathBuf),
}

/// Loads and caches catalogs. Cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct Catalog {
    source: Source,
    cache: Mutex<HashMap<(String, String), Arc<[String]>>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::bundled()
    }
}

impl Catalog {
    /// Catalogs shipped with the crate (`en`, `de`).
    pub fn bundled() -> Self {
        Self::with_source(Source::Bundled)
    }

    /// Catalogs read from `.properties` files below `root`.
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self::with_source(Source::Directory(root.into()))
    }

    fn with_source(source: Source) -> Self {
        Self {
            source,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Ordered entries of catalog `base` for `locale`.
    pub fn load(&self, base: &str, locale: &Locale) -> Result<Arc<[String]>> {
        if base.trim().is_empty() {
            return Err(Error::MissingReference("catalog base path"));
        }
        let key = (base.to_string(), locale.to_language_tag());
        if let Some(entries) = self.lock_cache().get(&key) {
            trace!(base, locale = %key.1, "catalog cache hit");
            return Ok(Arc::clone(entries));
        }

        let entries = self.load_uncached(base, locale)?;
        Ok(Arc::clone(self.lock_cache().entry(key).or_insert(entries)))
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), Arc<[String]>>> {
        // The cache only ever holds fully built entries, so a poisoned lock
        // still guards consistent data.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load_uncached(&self, base: &str, locale: &Locale) -> Result<Arc<[String]>> {
        for suffix in locale.catalog_suffixes() {
            let resource = format!("{base}{suffix}.properties");
            if let Some(text) = self.read(&resource)? {
                let entries = parse_numbered(&text, Path::new(&resource))?;
                return Ok(entries.into());
            }
        }
        Err(Error::NotFound {
            base: base.to_string(),
            locale: locale.to_language_tag(),
        })
    }

    fn read(&self, resource: &str) -> Result<Option<String>> {
        match &self.source {
            Source::Bundled => Ok(BUNDLED
                .iter()
                .find(|(name, _)| *name == resource)
                .map(|(_, text)| (*text).to_string())),
            Source::Directory(root) => {
                let path = root.join(resource);
                match std::fs::read_to_string(&path) {
                    Ok(text) => Ok(Some(text)),
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(source) => Err(Error::Io { path, source }),
                }
            }
        }
    }
}

/// Parse `name.N=value` lines into a list ordered by `N`.
///
/// Blank lines, `#`/`!` comments and keys without a numeric suffix are
/// skipped. `:` is accepted as separator as well as `=`.
fn parse_numbered(text: &str, path: &Path) -> Result<Vec<String>> {
    let mut ordered = BTreeMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let Some(split) = line.find(&['=', ':'][..]) else {
            continue;
        };
        let key = line[..split].trim();
        let value = line[split + 1..].trim();
        let Some((_, number)) = key.rsplit_once('.') else {
            continue;
        };
        if let Ok(number) = number.parse::<u32>() {
            ordered.insert(number, value.to_string());
        }
    }

    if ordered.is_empty() {
        return Err(Error::Catalog {
            path: path.to_path_buf(),
            reason: "no numbered keys like name.1, name.2, ...".to_string(),
        });
    }
    Ok(ordered.into_values().collect())
}

/// Split a pipe-delimited catalog row into exactly `expected` columns; any
/// further pipes stay inside the last column.
pub fn parse_columns(raw: &str, expected: usize) -> Result<Vec<&str>> {
    require!(expected >= 1, "invalid expected column count: {expected}");
    let parts: Vec<&str> = raw.splitn(expected, '|').collect();
    require!(
        parts.len() >= expected,
        "invalid catalog entry (expected {expected} columns, got {}): {raw}",
        parts.len()
    );
    Ok(parts)
}
