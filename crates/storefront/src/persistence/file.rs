//! File-backed snapshot storage.
//!
//! Each key maps to `<dir>/<key>.json`. Writes go to a sibling temp file
//! that is then renamed over the target, so a crash mid-write leaves the
//! previous snapshot intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{PersistError, SnapshotStorage};

/// Snapshot storage rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    ///
    /// # Errors
    ///
    /// Returns `PersistError::InvalidKey` if the key is empty or would
    /// escape the storage directory.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, PersistError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(PersistError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> PersistError {
    PersistError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl SnapshotStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| io_error(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_error(&path, e))?;

        tracing::trace!(path = %path.display(), bytes = value.len(), "snapshot written");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_for_rejects_unsafe_keys() {
        let storage = FileStorage::new("/tmp/snapshots");
        assert!(storage.path_for("fudsiti-store").is_ok());
        assert!(matches!(
            storage.path_for("../etc/passwd"),
            Err(PersistError::InvalidKey(_))
        ));
        assert!(matches!(storage.path_for(""), Err(PersistError::InvalidKey(_))));
        assert!(matches!(
            storage.path_for(".hidden"),
            Err(PersistError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_path_for_appends_json_extension() {
        let storage = FileStorage::new("/tmp/snapshots");
        let path = storage.path_for("fudsiti-store").ok();
        assert_eq!(
            path,
            Some(PathBuf::from("/tmp/snapshots/fudsiti-store.json"))
        );
    }
}
