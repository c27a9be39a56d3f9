//! Durable snapshot storage for the store.
//!
//! A snapshot is a single named key holding the persisted subset of the
//! state, wrapped in a small envelope:
//!
//! ```json
//! {"state": {"user": null, "isAuthenticated": false, "cart": [], "orders": []}, "version": 0}
//! ```
//!
//! There is no migration or conflict resolution: one writer, last write wins.
//!
//! # Backends
//!
//! - [`MemoryStorage`] - process-local, for tests and throwaway sessions
//! - [`FileStorage`] - one `<key>.json` file per key in a directory

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::PersistedState;

/// Default snapshot key.
pub const DEFAULT_KEY: &str = "fudsiti-store";

/// Envelope version written with every snapshot. Read back but not checked.
pub const SNAPSHOT_VERSION: u32 = 0;

/// Errors from a storage backend or snapshot codec.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem operation failed.
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot could not be encoded or decoded.
    #[error("snapshot codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Key is not usable as a storage name.
    #[error("invalid snapshot key: {0:?}")]
    InvalidKey(String),
}

/// A key-value store for serialized snapshots.
///
/// Mirrors the browser `localStorage` contract: string keys, string values,
/// synchronous access.
pub trait SnapshotStorage {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns `PersistError` if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `PersistError` if the backend cannot be written.
    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistError>;

    /// Delete the value under `key`. Succeeds if nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns `PersistError` if the backend cannot be modified.
    fn remove(&mut self, key: &str) -> Result<(), PersistError>;
}

impl<S: SnapshotStorage + ?Sized> SnapshotStorage for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        (**self).write(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        (**self).remove(key)
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: &'a PersistedState,
    version: u32,
}

#[derive(Deserialize)]
struct Envelope {
    state: PersistedState,
    #[serde(default)]
    #[allow(dead_code)]
    version: u32,
}

/// Encode a persisted state into its snapshot form.
///
/// # Errors
///
/// Returns `PersistError::Codec` if serialization fails.
pub fn encode(state: &PersistedState) -> Result<String, PersistError> {
    Ok(serde_json::to_string(&EnvelopeRef {
        state,
        version: SNAPSHOT_VERSION,
    })?)
}

/// Decode a snapshot produced by [`encode`].
///
/// # Errors
///
/// Returns `PersistError::Codec` if the snapshot is malformed.
pub fn decode(snapshot: &str) -> Result<PersistedState, PersistError> {
    let envelope: Envelope = serde_json::from_str(snapshot)?;
    Ok(envelope.state)
}

/// Read and decode the snapshot under `key`.
///
/// Missing, unreadable, or malformed snapshots all yield `None`; the failure
/// is logged and never surfaced.
pub fn load<S: SnapshotStorage + ?Sized>(storage: &S, key: &str) -> Option<PersistedState> {
    let raw = match storage.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::debug!(key, "no snapshot found, starting empty");
            return None;
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read snapshot, starting empty");
            return None;
        }
    };

    match decode(&raw) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!(key, error = %e, "malformed snapshot, starting empty");
            None
        }
    }
}

/// Encode `state` and overwrite the snapshot under `key`.
///
/// # Errors
///
/// Returns `PersistError` if encoding or the backend write fails.
pub fn save<S: SnapshotStorage + ?Sized>(
    storage: &mut S,
    key: &str,
    state: &PersistedState,
) -> Result<(), PersistError> {
    let encoded = encode(state)?;
    storage.write(key, &encoded)
}
