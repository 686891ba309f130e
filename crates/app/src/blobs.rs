//! Object URLs for in-memory documents.
//!
//! An [`ObjectUrl`] keeps its bytes registered for as long as it is alive and revokes them
//! when dropped, so every exit path releases the document.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use rustc_hash::FxHashMap;
use uuid::Uuid;

const URL_SCHEME: &str = "blob:storefront/";

/// Bytes registered behind an object URL.
#[derive(Clone, PartialEq, Eq)]
pub struct Blob {
    /// Type the bytes are served as
    pub mime_type: String,
    /// Payload
    pub bytes: Arc<[u8]>,
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Registry of live object URLs.
#[derive(Debug, Clone, Default)]
pub struct BlobRegistry {
    blobs: Arc<Mutex<FxHashMap<String, Blob>>>,
}

impl BlobRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` and return the URL that owns them.
    pub fn create(&self, bytes: impl Into<Arc<[u8]>>, mime_type: &str) -> ObjectUrl {
        let url = format!("{URL_SCHEME}{}", Uuid::now_v7());

        let blob = Blob {
            mime_type: mime_type.to_string(),
            bytes: bytes.into(),
        };

        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.clone(), blob);

        ObjectUrl {
            url,
            registry: self.clone(),
        }
    }

    /// Look up the bytes behind a live URL.
    pub fn resolve(&self, url: &str) -> Option<Blob> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    /// Number of URLs not yet revoked.
    pub fn live(&self) -> usize {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn revoke(&self, url: &str) {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(url);
    }
}

/// A registered object URL, revoked on drop.
pub struct ObjectUrl {
    url: String,
    registry: BlobRegistry,
}

impl ObjectUrl {
    /// The URL while it is live.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Revoke now rather than at end of scope.
    pub fn revoke(self) {
        drop(self);
    }
}

impl fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectUrl").field(&self.url).finish()
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.registry.revoke(&self.url);
    }
}
