//! Transient object references for rendering and saving blobs.
//!
//! A reference is live from [`ObjectUrlRegistry::create`] until it is revoked.
//! [`ObjectUrlGuard`] ties revocation to scope so a reference cannot outlive
//! the action that needed it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blob::Blob;

const SCHEME_PREFIX: &str = "blob:dropdesk/";

/// Opaque `blob:` reference to a registered blob
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    fn generate() -> Self {
        Self(format!("{}{}", SCHEME_PREFIX, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Table of live object references. Clones share the same table.
#[derive(Clone, Default)]
pub struct ObjectUrlRegistry {
    live: Arc<Mutex<HashMap<ObjectUrl, Blob>>>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<ObjectUrl, Blob>> {
        // A panic while holding the lock cannot leave the map half-updated
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a blob and hand out a fresh reference to it
    pub fn create(&self, blob: &Blob) -> ObjectUrl {
        let url = ObjectUrl::generate();
        self.table().insert(url.clone(), blob.clone());
        tracing::trace!(url = %url, name = blob.name(), "Object URL created");
        url
    }

    /// Create a reference that is revoked when the guard drops
    pub fn scoped(&self, blob: &Blob) -> ObjectUrlGuard {
        ObjectUrlGuard {
            url: self.create(blob),
            registry: self.clone(),
        }
    }

    /// Look up the blob behind a live reference
    pub fn resolve(&self, url: &ObjectUrl) -> Option<Blob> {
        self.table().get(url).cloned()
    }

    /// Release a reference. Returns false if it was not live.
    pub fn revoke(&self, url: &ObjectUrl) -> bool {
        let removed = self.table().remove(url).is_some();
        if removed {
            tracing::trace!(url = %url, "Object URL revoked");
        }
        removed
    }

    /// Number of references not yet revoked
    pub fn live(&self) -> usize {
        self.table().len()
    }
}

impl fmt::Debug for ObjectUrlRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectUrlRegistry")
            .field("live", &self.live())
            .finish()
    }
}

/// Scoped object reference, revoked on drop
pub struct ObjectUrlGuard {
    url: ObjectUrl,
    registry: ObjectUrlRegistry,
}

impl ObjectUrlGuard {
    pub fn url(&self) -> &ObjectUrl {
        &self.url
    }
}

impl Drop for ObjectUrlGuard {
    fn drop(&mut self) {
        self.registry.revoke(&self.url);
    }
}
