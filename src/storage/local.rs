//! Local filesystem snapshot store.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::snapshot::{self, Decoded, Document};
use crate::storage::{SnapshotStore, StorageError};

/// Snapshot store backed by a single JSON file.
pub struct LocalSnapshotStore {
    path: PathBuf,
}

impl LocalSnapshotStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write `contents` to `path` through a temporary sibling file and a rename.
///
/// Creates the parent directory if needed.
///
/// # Errors
///
/// Returns `StorageError::WriteError` if any step fails. The target is left
/// untouched in that case.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), StorageError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    fs::create_dir_all(&parent).map_err(|e| {
        StorageError::WriteError(format!("create dir {}: {e}", parent.display()))
    })?;

    let mut tmp = NamedTempFile::new_in(&parent)
        .map_err(|e| StorageError::WriteError(format!("temp file in {}: {e}", parent.display())))?;

    tmp.write_all(contents.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| StorageError::WriteError(format!("{}: {e}", tmp.path().display())))?;

    // The temp file is removed on drop if persisting fails.
    tmp.persist(path)
        .map_err(|e| StorageError::WriteError(format!("{}: {}", path.display(), e.error)))?;

    if let Ok(dir) = fs::File::open(&parent) {
        let _ = dir.sync_all();
    }

    Ok(())
}

impl SnapshotStore for LocalSnapshotStore {
    fn read_snapshot(&self) -> Result<Decoded, StorageError> {
        if !self.path.exists() {
            return Err(StorageError::NotFound(self.path.display().to_string()));
        }

        let contents = fs::read_to_string(&self.path)
            .map_err(|e| StorageError::ReadError(format!("{}: {e}", self.path.display())))?;

        snapshot::decode(&contents)
            .map_err(|e| StorageError::ParseError(format!("{}: {e}", self.path.display())))
    }

    fn write_snapshot(&self, documents: &[Document]) -> Result<(), StorageError> {
        let contents =
            snapshot::encode(documents).map_err(|e| StorageError::SerializeError(e.to_string()))?;

        write_atomic(&self.path, &contents)?;
        tracing::info!(path = %self.path.display(), documents = documents.len(), "snapshot written");
        Ok(())
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn doc(title: &str) -> Document {
        Document {
            title: title.to_string(),
            content: format!("{title} content"),
            link: format!("/{}", title.to_lowercase()),
        }
    }

    #[test]
    fn creates_missing_output_directories() {
        let dir = TempDir::new().unwrap();
        let store = LocalSnapshotStore::new(dir.path().join("assets/json/supersearch.json"));

        store.write_snapshot(&[doc("Home")]).unwrap();

        assert!(store.exists());
        assert_eq!(store.read_snapshot().unwrap().documents, vec![doc("Home")]);
    }

    #[test]
    fn overwrites_previous_snapshot_wholesale() {
        let dir = TempDir::new().unwrap();
        let store = LocalSnapshotStore::new(dir.path().join("search.json"));

        store.write_snapshot(&[doc("One"), doc("Two")]).unwrap();
        store.write_snapshot(&[doc("Three")]).unwrap();

        assert_eq!(store.read_snapshot().unwrap().documents, vec![doc("Three")]);
    }

    #[test]
    fn leaves_no_temp_files_behind() {
        let dir = TempDir::new().unwrap();
        let store = LocalSnapshotStore::new(dir.path().join("search.json"));

        store.write_snapshot(&[doc("One")]).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn missing_snapshot_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = LocalSnapshotStore::new(dir.path().join("absent.json"));
        assert!(matches!(
            store.read_snapshot(),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn corrupt_snapshot_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("search.json");
        fs::write(&path, "{oops").unwrap();

        let store = LocalSnapshotStore::new(path);
        assert!(matches!(
            store.read_snapshot(),
            Err(StorageError::ParseError(_))
        ));
    }
}
