//! Snapshot building from a content source.
//!
//! A rebuild always replaces the whole snapshot; there is no incremental
//! update or deletion tracking.

pub mod sanitize;

use thiserror::Error;

use crate::corpus::{ContentSource, CorpusError};
use crate::snapshot::Document;
use crate::storage::{SnapshotStore, StorageError};

pub use sanitize::sanitize;

/// Errors that abort a rebuild.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Content source unavailable: {0}")]
    Source(#[from] CorpusError),

    #[error(transparent)]
    Store(#[from] StorageError),
}

/// Documents produced from a content source.
#[derive(Debug, Clone, Default)]
pub struct Build {
    pub documents: Vec<Document>,
    /// Items dropped for lacking a title or link.
    pub skipped: usize,
}

/// Outcome of a successful rebuild.
#[derive(Debug, Clone)]
pub struct IndexReport {
    pub documents: usize,
    pub skipped: usize,
    pub location: String,
}

/// Turn every published item into a sanitized document, in source order.
///
/// # Errors
///
/// Returns `CorpusError` if the content source cannot be listed.
pub fn build<S>(source: &S, post_types: &[String]) -> Result<Build, CorpusError>
where
    S: ContentSource + ?Sized,
{
    let mut build = Build::default();

    for item in source.list_published(post_types)? {
        if item.title.trim().is_empty() || item.link.trim().is_empty() {
            tracing::warn!(title = %item.title, link = %item.link, "skipping item without title or link");
            build.skipped += 1;
            continue;
        }

        let content = item.body.as_deref().map(sanitize).unwrap_or_default();

        build.documents.push(Document {
            title: item.title,
            content,
            link: item.link,
        });
    }

    Ok(build)
}

/// Build the snapshot and write it through `store`.
///
/// Nothing is written unless the whole build succeeded, so an unavailable
/// source leaves the previous snapshot in place.
///
/// # Errors
///
/// Returns `IndexError::Source` if the content source fails and
/// `IndexError::Store` if the snapshot cannot be written.
pub fn rebuild<S>(
    source: &S,
    store: &dyn SnapshotStore,
    post_types: &[String],
) -> Result<IndexReport, IndexError>
where
    S: ContentSource + ?Sized,
{
    let build = build(source, post_types)?;
    store.write_snapshot(&build.documents)?;

    tracing::info!(
        documents = build.documents.len(),
        skipped = build.skipped,
        location = %store.location(),
        "index rebuilt"
    );

    Ok(IndexReport {
        documents: build.documents.len(),
        skipped: build.skipped,
        location: store.location(),
    })
}
