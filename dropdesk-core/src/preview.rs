//! Preview classification for staged files.
//!
//! The preview kind is decided once from the MIME type. Only plain text
//! needs more work: it starts as [`TextPreview::Pending`] and is resolved
//! later by the staging area's background read.

use serde::Serialize;

use crate::blob::Blob;
use crate::object_url::{ObjectUrl, ObjectUrlRegistry};

/// MIME patterns the drop surface advertises
pub const ACCEPTED_TYPES: &str = "image/*,video/*,text/plain";

/// Placeholder shown while a text read is in flight
pub const LOADING_TEXT: &str = "Loading text...";

/// Marker shown for files that have no preview
pub const UNSUPPORTED_TEXT: &str = "Cannot preview this file type";

/// Coarse MIME category used for preview dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeCategory {
    Image,
    Video,
    PlainText,
    Other,
}

impl MimeCategory {
    /// Classify a MIME string, ignoring parameters and case
    pub fn of(mime_type: &str) -> Self {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.split_once('/') {
            Some(("image", _)) => MimeCategory::Image,
            Some(("video", _)) => MimeCategory::Video,
            Some(("text", "plain")) => MimeCategory::PlainText,
            _ => MimeCategory::Other,
        }
    }
}

/// Whether a MIME type matches [`ACCEPTED_TYPES`]
pub fn is_accepted(mime_type: &str) -> bool {
    MimeCategory::of(mime_type) != MimeCategory::Other
}

/// State of a plain-text preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "content", rename_all = "snake_case")]
pub enum TextPreview {
    Pending,
    Ready(String),
    Failed(String),
}

impl TextPreview {
    pub fn is_pending(&self) -> bool {
        matches!(self, TextPreview::Pending)
    }
}

/// Renderable representation of a staged file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Preview {
    Image { url: ObjectUrl },
    Video { url: ObjectUrl },
    Text { text: TextPreview },
    Unsupported,
}

impl Preview {
    /// Object reference held by this preview, if any
    pub fn object_url(&self) -> Option<&ObjectUrl> {
        match self {
            Preview::Image { url } | Preview::Video { url } => Some(url),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Preview::Text { text } if text.is_pending())
    }

    /// Short human-readable rendering
    pub fn describe(&self) -> String {
        match self {
            Preview::Image { url } => format!("[image] {}", url),
            Preview::Video { url } => format!("[video] {}", url),
            Preview::Text { text: TextPreview::Pending } => LOADING_TEXT.to_string(),
            Preview::Text { text: TextPreview::Ready(content) } => content.clone(),
            Preview::Text { text: TextPreview::Failed(reason) } => {
                format!("Preview failed: {}", reason)
            }
            Preview::Unsupported => UNSUPPORTED_TEXT.to_string(),
        }
    }
}

/// Pick the initial preview for a blob.
///
/// Image and video previews register an object reference in `registry`;
/// the caller owns its revocation.
pub fn classify(blob: &Blob, registry: &ObjectUrlRegistry) -> Preview {
    match MimeCategory::of(blob.mime_type()) {
        MimeCategory::Image => Preview::Image {
            url: registry.create(blob),
        },
        MimeCategory::Video => Preview::Video {
            url: registry.create(blob),
        },
        MimeCategory::PlainText => Preview::Text {
            text: TextPreview::Pending,
        },
        MimeCategory::Other => Preview::Unsupported,
    }
}

/// Decode a blob's full content as text.
///
/// UTF-8 with invalid sequences replaced by U+FFFD; a leading byte-order
/// mark is dropped. Decoding itself never fails.
pub fn decode_text(blob: &Blob) -> TextPreview {
    let bytes = blob.bytes();
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes[..]);
    TextPreview::Ready(String::from_utf8_lossy(body).into_owned())
}
