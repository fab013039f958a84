//! Opaque binary blobs with object identity.
//!
//! A [`Blob`] is what the drop surface hands to the staging area: a name, a
//! MIME type and the content bytes. Clones share the same allocation and
//! compare equal under [`Blob::same`]; two blobs built separately never do,
//! even with identical content.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{DeskError, Result};

/// Fallback MIME type when none can be guessed
pub const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug)]
struct BlobInner {
    name: String,
    mime_type: String,
    data: Bytes,
}

/// Cheaply clonable handle to a file's name, type and content
#[derive(Clone)]
pub struct Blob {
    inner: Arc<BlobInner>,
}

impl Blob {
    /// Create a blob from in-memory content
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            inner: Arc::new(BlobInner {
                name: name.into(),
                mime_type: mime_type.into(),
                data: data.into(),
            }),
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DeskError::path_not_found(path));
        }

        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| OCTET_STREAM.to_string());

        tracing::debug!(name = %name, mime = %mime_type, size = data.len(), "Loaded blob from disk");

        Ok(Self::new(name, mime_type, data))
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn mime_type(&self) -> &str {
        &self.inner.mime_type
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.inner.data.len() as u64
    }

    /// Content bytes (shared, no copy)
    pub fn bytes(&self) -> Bytes {
        self.inner.data.clone()
    }

    /// Object identity: true only for clones of the same handle
    pub fn same(&self, other: &Blob) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("name", &self.inner.name)
            .field("mime_type", &self.inner.mime_type)
            .field("size", &self.inner.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn identity_is_per_handle() {
        let a = Blob::new("a.txt", "text/plain", "same");
        let b = Blob::new("a.txt", "text/plain", "same");
        let a2 = a.clone();

        assert!(a.same(&a2));
        assert!(!a.same(&b));
    }

    #[test]
    fn size_is_byte_length() {
        let blob = Blob::new("emoji.txt", "text/plain", "👋");
        assert_eq!(blob.size(), 4);
    }

    #[tokio::test]
    async fn from_path_guesses_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&[0x89, b'P', b'N', b'G'])
            .unwrap();

        let blob = Blob::from_path(&path).await.unwrap();
        assert_eq!(blob.name(), "photo.png");
        assert_eq!(blob.mime_type(), "image/png");
        assert_eq!(blob.size(), 4);
    }

    #[tokio::test]
    async fn from_path_unknown_extension_is_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.zzqx");
        std::fs::write(&path, b"raw").unwrap();

        let blob = Blob::from_path(&path).await.unwrap();
        assert_eq!(blob.mime_type(), OCTET_STREAM);
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        let err = Blob::from_path("/definitely/not/here.txt").await.unwrap_err();
        assert!(matches!(err, DeskError::PathNotFound { .. }));
    }
}
