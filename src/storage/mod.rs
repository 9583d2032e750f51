//! Snapshot storage trait and implementations.
//!
//! This module abstracts where the index snapshot lives so the indexer and
//! the tooling around it do not care whether it is a local file or
//! something else.

pub mod local;

use crate::snapshot::{Decoded, Document};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Snapshot not found: {0}")]
    NotFound(String),

    #[error("Failed to read: {0}")]
    ReadError(String),

    #[error("Failed to write: {0}")]
    WriteError(String),

    #[error("Failed to parse snapshot: {0}")]
    ParseError(String),

    #[error("Failed to serialize: {0}")]
    SerializeError(String),
}

/// Trait for snapshot storage backends.
pub trait SnapshotStore: Send + Sync {
    /// Read and leniently decode the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot is missing, unreadable or not
    /// a JSON array.
    fn read_snapshot(&self) -> Result<Decoded, StorageError>;

    /// Replace the snapshot with `documents`. Readers never observe a
    /// partially written snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    fn write_snapshot(&self, documents: &[Document]) -> Result<(), StorageError>;

    /// Check if a snapshot exists.
    fn exists(&self) -> bool;

    /// Human-readable location of the snapshot.
    fn location(&self) -> String;
}
