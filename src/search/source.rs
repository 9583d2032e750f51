//! Snapshot retrieval from a file or over HTTP, with a prefetch cache.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::expand_tilde;
use crate::snapshot::{self, Decoded};
use crate::storage::StorageError;
use crate::storage::local::write_atomic;

/// Default timeout for HTTP snapshot requests.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur while fetching a snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid snapshot from {origin}: {source}")]
    Parse {
        origin: String,
        source: serde_json::Error,
    },
}

/// Where the snapshot is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSource {
    File(PathBuf),
    Http(String),
}

impl SnapshotSource {
    /// Interpret `location` as a URL when it has an http(s) scheme, else as
    /// a file path. The scheme is matched case-insensitively.
    #[must_use]
    pub fn parse(location: &str) -> Self {
        let is_url = ["http://", "https://"].iter().any(|scheme| {
            location
                .get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        });

        if is_url {
            Self::Http(location.to_string())
        } else {
            Self::File(expand_tilde(location))
        }
    }
}

impl fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Http(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedSnapshot {
    url: String,
    fetched_at: DateTime<Utc>,
    body: String,
}

/// On-disk cache of fetched snapshots, keyed by URL.
#[derive(Debug, Clone)]
pub struct PrefetchCache {
    dir: PathBuf,
    ttl: Duration,
}

impl PrefetchCache {
    #[must_use]
    pub fn new(dir: PathBuf, ttl: Duration) -> Self {
        Self { dir, ttl }
    }

    fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", slugify(url)))
    }

    /// Cached body for `url` if it is younger than the TTL.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<String> {
        let raw = fs::read_to_string(self.entry_path(url)).ok()?;
        let entry: CachedSnapshot = serde_json::from_str(&raw).ok()?;
        if entry.url != url {
            return None;
        }

        // A timestamp in the future counts as stale.
        let age = (Utc::now() - entry.fetched_at).to_std().ok()?;
        (age < self.ttl).then_some(entry.body)
    }

    /// Store `body` as the latest copy of `url`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cache entry cannot be written.
    pub fn put(&self, url: &str, body: &str) -> Result<(), StorageError> {
        let entry = CachedSnapshot {
            url: url.to_string(),
            fetched_at: Utc::now(),
            body: body.to_string(),
        };
        let contents =
            serde_json::to_string(&entry).map_err(|e| StorageError::SerializeError(e.to_string()))?;
        write_atomic(&self.entry_path(url), &contents)
    }
}

/// Fetches and decodes a snapshot from its source.
#[derive(Debug, Clone)]
pub struct SnapshotLoader {
    source: SnapshotSource,
    timeout: Duration,
    cache: Option<PrefetchCache>,
}

impl SnapshotLoader {
    #[must_use]
    pub fn new(source: SnapshotSource) -> Self {
        Self {
            source,
            timeout: DEFAULT_FETCH_TIMEOUT,
            cache: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use `cache` for HTTP sources. File sources are always read directly.
    #[must_use]
    pub fn with_cache(mut self, cache: PrefetchCache) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn source(&self) -> &SnapshotSource {
        &self.source
    }

    /// Fetch and decode the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the snapshot cannot be read or is not a JSON
    /// array. Malformed entries inside a valid array are skipped.
    pub fn load(&self) -> Result<Decoded, FetchError> {
        match &self.source {
            SnapshotSource::File(path) => {
                let text = fs::read_to_string(path).map_err(|source| FetchError::Io {
                    path: path.clone(),
                    source,
                })?;
                decode(&text, &self.source)
            }
            SnapshotSource::Http(url) => self.load_http(url),
        }
    }

    fn load_http(&self, url: &str) -> Result<Decoded, FetchError> {
        if let Some(cache) = &self.cache
            && let Some(body) = cache.get(url)
        {
            match snapshot::decode(&body) {
                Ok(decoded) => {
                    tracing::debug!(url, "using prefetched snapshot");
                    return Ok(decoded);
                }
                Err(e) => tracing::warn!(url, error = %e, "discarding corrupt prefetch entry"),
            }
        }

        let body = self.get(url)?;
        let decoded = decode(&body, &self.source)?;

        if let Some(cache) = &self.cache
            && let Err(e) = cache.put(url, &body)
        {
            tracing::warn!(url, error = %e, "could not cache snapshot");
        }

        Ok(decoded)
    }

    fn get(&self, url: &str) -> Result<String, FetchError> {
        let http_error = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(http_error)?;
        let response = client.get(url).send().map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(http_error)
    }
}

fn decode(text: &str, source: &SnapshotSource) -> Result<Decoded, FetchError> {
    snapshot::decode(text).map_err(|e| FetchError::Parse {
        origin: source.to_string(),
        source: e,
    })
}

/// Convert a URL to a file-name-safe slug.
fn slugify(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    const SNAPSHOT: &str = r#"[{"title":"Home","content":"welcome","link":"/"}]"#;

    mod slugify_tests {
        use super::*;

        #[test]
        fn url() {
            assert_eq!(
                slugify("https://example.com/assets/json/supersearch.json"),
                "https-example-com-assets-json-supersearch-json"
            );
        }

        #[test]
        fn query_string() {
            assert_eq!(slugify("http://a.b/s.json?v=2"), "http-a-b-s-json-v-2");
        }

        #[test]
        fn empty() {
            assert_eq!(slugify(""), "");
        }
    }

    mod source_tests {
        use super::*;

        #[test]
        fn parses_urls_and_paths() {
            assert_eq!(
                SnapshotSource::parse("https://example.com/s.json"),
                SnapshotSource::Http("https://example.com/s.json".to_string())
            );
            assert_eq!(
                SnapshotSource::parse("./assets/json/supersearch.json"),
                SnapshotSource::File(PathBuf::from("./assets/json/supersearch.json"))
            );
        }

        #[test]
        fn scheme_match_ignores_case() {
            assert_eq!(
                SnapshotSource::parse("HTTPS://Example.com/s.json"),
                SnapshotSource::Http("HTTPS://Example.com/s.json".to_string())
            );
            assert_eq!(
                SnapshotSource::parse("Http://example.com/s.json"),
                SnapshotSource::Http("Http://example.com/s.json".to_string())
            );
            assert!(matches!(
                SnapshotSource::parse("http-cache/s.json"),
                SnapshotSource::File(_)
            ));
        }

        #[test]
        fn loads_file_snapshot() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("s.json");
            fs::write(&path, SNAPSHOT).unwrap();

            let decoded = SnapshotLoader::new(SnapshotSource::File(path)).load().unwrap();
            assert_eq!(decoded.documents.len(), 1);
        }

        #[test]
        fn missing_file_is_io_error() {
            let dir = TempDir::new().unwrap();
            let loader = SnapshotLoader::new(SnapshotSource::File(dir.path().join("none.json")));
            assert!(matches!(loader.load(), Err(FetchError::Io { .. })));
        }

        #[test]
        fn non_array_file_is_parse_error() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("s.json");
            fs::write(&path, "{}").unwrap();

            let loader = SnapshotLoader::new(SnapshotSource::File(path));
            assert!(matches!(loader.load(), Err(FetchError::Parse { .. })));
        }

        #[test]
        fn unreachable_host_is_http_error() {
            let loader = SnapshotLoader::new(SnapshotSource::Http(
                "http://127.0.0.1:9/supersearch.json".to_string(),
            ))
            .with_timeout(Duration::from_secs(2));
            assert!(matches!(loader.load(), Err(FetchError::Http { .. })));
        }

        #[test]
        fn fresh_prefetch_entry_avoids_network() {
            let dir = TempDir::new().unwrap();
            let url = "http://127.0.0.1:9/supersearch.json";
            let cache = PrefetchCache::new(dir.path().to_path_buf(), Duration::from_secs(600));
            cache.put(url, SNAPSHOT).unwrap();

            let loader = SnapshotLoader::new(SnapshotSource::Http(url.to_string()))
                .with_timeout(Duration::from_secs(2))
                .with_cache(cache);
            assert_eq!(loader.load().unwrap().documents.len(), 1);
        }
    }

    mod cache_tests {
        use super::*;

        #[test]
        fn round_trips_fresh_entries() {
            let dir = TempDir::new().unwrap();
            let cache = PrefetchCache::new(dir.path().join("cache"), Duration::from_secs(60));

            cache.put("https://x.test/s.json", SNAPSHOT).unwrap();
            assert_eq!(cache.get("https://x.test/s.json").as_deref(), Some(SNAPSHOT));
        }

        #[test]
        fn zero_ttl_is_always_stale() {
            let dir = TempDir::new().unwrap();
            let cache = PrefetchCache::new(dir.path().to_path_buf(), Duration::ZERO);

            cache.put("https://x.test/s.json", SNAPSHOT).unwrap();
            assert_eq!(cache.get("https://x.test/s.json"), None);
        }

        #[test]
        fn expired_entries_are_ignored() {
            let dir = TempDir::new().unwrap();
            let cache = PrefetchCache::new(dir.path().to_path_buf(), Duration::from_secs(60));
            let url = "https://x.test/s.json";
            let stale = CachedSnapshot {
                url: url.to_string(),
                fetched_at: Utc::now() - chrono::Duration::seconds(120),
                body: SNAPSHOT.to_string(),
            };
            fs::write(cache.entry_path(url), serde_json::to_string(&stale).unwrap()).unwrap();

            assert_eq!(cache.get(url), None);
        }

        #[test]
        fn slug_collisions_do_not_leak_entries() {
            let dir = TempDir::new().unwrap();
            let cache = PrefetchCache::new(dir.path().to_path_buf(), Duration::from_secs(60));

            cache.put("https://x.test/a-b", SNAPSHOT).unwrap();
            assert_eq!(cache.get("https://x.test/a/b"), None);
        }
    }
}
