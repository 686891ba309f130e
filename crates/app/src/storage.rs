//! Durable key/value storage for client state.
//!
//! State is written inside a `{ "version": N, "state": ... }` envelope. Loading never fails:
//! a missing key, a version mismatch, or content that no longer decodes all hydrate to the
//! default state.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::warn;

/// Storage key for the persisted cart.
pub const CART_KEY: &str = "storefront-cart";

/// Storage key for the persisted session.
pub const AUTH_KEY: &str = "storefront-auth";

/// Storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing went wrong
    #[error("storage i/o failed for {key}: {source}")]
    Io {
        /// Key being read or written
        key: String,

        /// Underlying failure
        #[source]
        source: io::Error,
    },

    /// State could not be serialized
    #[error("failed to encode state for {key}: {source}")]
    Encode {
        /// Key being written
        key: String,

        /// Underlying failure
        #[source]
        source: serde_json::Error,
    },
}

/// Raw string storage by key.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// One JSON file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`. Nothing is created until the first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the files live in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_error(key: &str) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(io_error(key)(error)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(io_error(key))?;

        let path = self.path(key);
        let staging = path.with_extension("json.tmp");

        fs::write(&staging, value).map_err(io_error(key))?;
        fs::rename(&staging, &path).map_err(io_error(key))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)) {
            Err(error) if error.kind() != io::ErrorKind::NotFound => Err(io_error(key)(error)),
            _ => Ok(()),
        }
    }
}

/// Process-local storage, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<FxHashMap<String, String>>,
}

impl MemoryStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);

        Ok(())
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    state: &'a T,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    state: serde_json::Value,
}

/// Load versioned state, falling back to `T::default()` on any problem.
pub fn load_state<T>(storage: &dyn Storage, key: &str, version: u32) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(error) => {
            warn!(%error, key, "failed to read persisted state");
            return T::default();
        }
    };

    let envelope: Envelope = match serde_json::from_str(&raw) {
        Ok(envelope) => envelope,
        Err(error) => {
            warn!(%error, key, "discarding undecodable persisted state");
            return T::default();
        }
    };

    if envelope.version != version {
        warn!(
            key,
            found = envelope.version,
            expected = version,
            "discarding persisted state with another schema version"
        );
        return T::default();
    }

    serde_json::from_value(envelope.state).unwrap_or_else(|error| {
        warn!(%error, key, "discarding persisted state that no longer matches its schema");
        T::default()
    })
}

/// Write `state` inside a versioned envelope.
///
/// # Errors
///
/// Returns an error when encoding or writing fails.
pub fn save_state<T: Serialize>(
    storage: &dyn Storage,
    key: &str,
    version: u32,
    state: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(&EnvelopeRef { version, state }).map_err(|source| {
        StorageError::Encode {
            key: key.to_string(),
            source,
        }
    })?;

    storage.set(key, &raw)
}
