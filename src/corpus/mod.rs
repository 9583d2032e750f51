//! Content export loading.
//!
//! A content export is a directory holding `content.json`, the list of
//! content items the site publishes, plus optional HTML body files that
//! items reference by relative path.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Manifest file name inside an export directory.
pub const MANIFEST_FILE: &str = "content.json";

/// Status of items that are visible on the site.
pub const PUBLISHED: &str = "publish";

/// Errors that can occur when loading a content export.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Manifest not found at {0}")]
    ManifestNotFound(PathBuf),

    #[error("Failed to read manifest: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse manifest: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid body path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: &'static str },
}

/// One item of the content export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(default)]
    pub title: String,
    /// Canonical page URL, absolute or site-relative.
    #[serde(default)]
    pub link: String,
    #[serde(default = "default_post_type")]
    pub post_type: String,
    #[serde(default = "default_status")]
    pub status: String,
    /// Inline raw HTML body.
    #[serde(default)]
    pub body: Option<String>,
    /// Body file relative to the export root, used when `body` is absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_post_type() -> String {
    "post".to_string()
}

fn default_status() -> String {
    PUBLISHED.to_string()
}

/// The content.json structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    #[serde(default)]
    pub items: Vec<ContentItem>,
}

/// A published content item with its raw body resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedItem {
    pub title: String,
    /// Raw HTML body, `None` when the item has no readable body.
    pub body: Option<String>,
    pub link: String,
}

/// Read interface over a content store.
pub trait ContentSource {
    /// List published items of the given post types in source order.
    /// An empty `post_types` slice selects every type.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError` if the store itself cannot be read.
    fn list_published(&self, post_types: &[String]) -> Result<Vec<PublishedItem>, CorpusError>;
}

/// A loaded content export with its root path and manifest.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub root: PathBuf,
    pub manifest: Manifest,
}

impl Corpus {
    /// Load a content export from a directory containing content.json.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::ManifestNotFound` if content.json doesn't exist.
    /// Returns `CorpusError::ReadError` if the file cannot be read.
    /// Returns `CorpusError::ParseError` if the JSON is invalid.
    pub fn load(root: &Path) -> Result<Self, CorpusError> {
        let manifest_path = root.join(MANIFEST_FILE);

        if !manifest_path.exists() {
            return Err(CorpusError::ManifestNotFound(manifest_path));
        }

        let contents = fs::read_to_string(&manifest_path)?;
        let manifest: Manifest = serde_json::from_str(&contents)?;

        Ok(Self {
            root: root.to_path_buf(),
            manifest,
        })
    }

    #[must_use]
    pub fn items(&self) -> &[ContentItem] {
        &self.manifest.items
    }

    /// Resolve an item's raw body. Inline bodies win over body files.
    ///
    /// # Errors
    ///
    /// Returns an error if the body file is missing, unreadable or escapes
    /// the export root.
    pub fn read_body(&self, item: &ContentItem) -> Result<Option<String>, CorpusError> {
        if let Some(body) = &item.body {
            return Ok(Some(body.clone()));
        }

        let Some(relative) = &item.path else {
            return Ok(None);
        };

        let full_path = validate_path_within_root(&self.root, relative)?;
        Ok(Some(fs::read_to_string(full_path)?))
    }
}

impl ContentSource for Corpus {
    fn list_published(&self, post_types: &[String]) -> Result<Vec<PublishedItem>, CorpusError> {
        let mut published = Vec::new();

        for item in self.items() {
            if item.status != PUBLISHED {
                continue;
            }
            if !post_types.is_empty() && !post_types.iter().any(|t| *t == item.post_type) {
                continue;
            }

            // A broken body never aborts the listing; the item is indexed
            // with empty content instead.
            let body = match self.read_body(item) {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(title = %item.title, error = %e, "unreadable body, indexing as empty");
                    None
                }
            };

            published.push(PublishedItem {
                title: item.title.clone(),
                body,
                link: item.link.clone(),
            });
        }

        Ok(published)
    }
}

/// Validate that a relative path is safely contained within a root directory.
///
/// Rejects `..` components and absolute paths, then canonicalizes the target
/// so symlinks cannot point outside the root.
fn validate_path_within_root(root: &Path, relative_path: &Path) -> Result<PathBuf, CorpusError> {
    let invalid = |reason| CorpusError::InvalidPath {
        path: relative_path.to_path_buf(),
        reason,
    };

    if relative_path
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(invalid("contains '..' component"));
    }

    if relative_path.is_absolute() {
        return Err(invalid("must be relative"));
    }

    if relative_path.as_os_str().is_empty() {
        return Err(invalid("cannot be empty"));
    }

    let full_path = root.join(relative_path);
    let canonical_root = root.canonicalize()?;
    let canonical_path = full_path.canonicalize()?;

    if !canonical_path.starts_with(&canonical_root) {
        return Err(invalid("escapes the export root"));
    }

    Ok(canonical_path)
}
