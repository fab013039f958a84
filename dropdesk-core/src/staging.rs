//! File staging area: the working set of dropped files.
//!
//! The area is the single owner of its list. Plain-text previews are read on
//! a blocking worker and posted back over a channel as [`PreviewUpdate`]s;
//! only the owner applies them, matching the target row by blob identity so
//! drops and deletes in the meantime cannot misdirect an update.

use serde::Serialize;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::blob::Blob;
use crate::download::DownloadSink;
use crate::error::{DeskError, Result};
use crate::object_url::ObjectUrlRegistry;
use crate::preview::{self, Preview, TextPreview};

/// A file accepted into the working set, with its derived preview
#[derive(Debug, Clone)]
pub struct StagedFile {
    file: Blob,
    preview: Preview,
}

impl StagedFile {
    pub fn file(&self) -> &Blob {
        &self.file
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    /// Row label: `"<name> - <size> bytes"`
    pub fn summary(&self) -> String {
        format!("{} - {} bytes", self.file.name(), self.file.size())
    }

    /// Serializable snapshot for JSON output
    pub fn view(&self) -> StagedFileView {
        StagedFileView {
            name: self.file.name().to_string(),
            size: self.file.size(),
            mime_type: self.file.mime_type().to_string(),
            preview: self.preview.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StagedFileView {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub preview: Preview,
}

/// Completion of a background text read, keyed by the blob it was started for
#[derive(Debug)]
pub struct PreviewUpdate {
    pub blob: Blob,
    pub text: TextPreview,
}

/// Outcome of [`StagingArea::download_all`]
#[derive(Debug, Default)]
pub struct DownloadSummary {
    pub saved: usize,
    pub failures: Vec<DeskError>,
}

impl DownloadSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Ordered, session-scoped list of staged files
pub struct StagingArea {
    files: Vec<StagedFile>,
    urls: ObjectUrlRegistry,
    updates_tx: UnboundedSender<PreviewUpdate>,
    updates_rx: UnboundedReceiver<PreviewUpdate>,
}

impl Default for StagingArea {
    fn default() -> Self {
        Self::new()
    }
}

impl StagingArea {
    pub fn new() -> Self {
        Self::with_registry(ObjectUrlRegistry::new())
    }

    /// Use an existing registry for preview and download references
    pub fn with_registry(urls: ObjectUrlRegistry) -> Self {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        Self {
            files: Vec::new(),
            urls,
            updates_tx,
            updates_rx,
        }
    }

    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn urls(&self) -> &ObjectUrlRegistry {
        &self.urls
    }

    /// Number of rows still showing the loading placeholder
    pub fn pending_previews(&self) -> usize {
        self.files.iter().filter(|f| f.preview.is_pending()).count()
    }

    /// Append dropped files in order. Duplicates are kept.
    ///
    /// Must be called from within a Tokio runtime: plain-text files start a
    /// background read whose result arrives through [`Self::next_update`].
    pub fn accept_drop(&mut self, files: impl IntoIterator<Item = Blob>) -> usize {
        let before = self.files.len();

        for file in files {
            let preview = preview::classify(&file, &self.urls);
            if preview.is_pending() {
                self.spawn_text_read(file.clone());
            }
            tracing::debug!(
                name = file.name(),
                mime = file.mime_type(),
                size = file.size(),
                "Staged file"
            );
            self.files.push(StagedFile { file, preview });
        }

        let added = self.files.len() - before;
        tracing::info!(added, total = self.files.len(), "Accepted drop");
        added
    }

    fn spawn_text_read(&self, blob: Blob) {
        let tx = self.updates_tx.clone();
        tokio::spawn(async move {
            let read = blob.clone();
            let decoded = tokio::task::spawn_blocking(move || preview::decode_text(&read)).await;
            let text = match decoded {
                Ok(text) => text,
                Err(err) => TextPreview::Failed(format!("read aborted: {}", err)),
            };
            // Receiver gone means the area was dropped; nothing to update
            let _ = tx.send(PreviewUpdate { blob, text });
        });
    }

    /// Apply a finished text read to every pending row holding that blob.
    ///
    /// Returns how many rows changed. Zero means the blob was deleted before
    /// the read finished and the update was dropped.
    pub fn apply_update(&mut self, update: PreviewUpdate) -> usize {
        let mut changed = 0;
        for staged in self
            .files
            .iter_mut()
            .filter(|f| f.file.same(&update.blob) && f.preview.is_pending())
        {
            staged.preview = Preview::Text {
                text: update.text.clone(),
            };
            changed += 1;
        }

        if changed == 0 {
            tracing::debug!(name = update.blob.name(), "Dropped preview update for removed file");
        } else if let TextPreview::Failed(reason) = &update.text {
            tracing::warn!(name = update.blob.name(), %reason, "Text preview failed");
        }
        changed
    }

    /// Wait for and apply the next preview update.
    ///
    /// Returns `None` immediately when no row is pending.
    pub async fn next_update(&mut self) -> Option<usize> {
        if self.pending_previews() == 0 {
            return None;
        }
        let update = self.updates_rx.recv().await?;
        Some(self.apply_update(update))
    }

    /// Apply every update that has already arrived, without waiting
    pub fn drain_updates(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.updates_rx.try_recv() {
                Ok(update) => {
                    self.apply_update(update);
                    applied += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// Wait until no row shows the loading placeholder
    pub async fn settle(&mut self) {
        while self.next_update().await.is_some() {}
    }

    /// Remove every row holding `blob`. Unknown blobs are ignored.
    ///
    /// Returns whether anything was removed.
    pub fn delete_one(&mut self, blob: &Blob) -> bool {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|f| f.file.same(blob));
        self.files = kept;

        for staged in &removed {
            self.release(staged);
        }
        if !removed.is_empty() {
            tracing::debug!(name = blob.name(), rows = removed.len(), "Deleted staged file");
        }
        !removed.is_empty()
    }

    /// Remove every row
    pub fn delete_all(&mut self) {
        let removed = std::mem::take(&mut self.files);
        for staged in &removed {
            self.release(staged);
        }
        tracing::debug!(count = removed.len(), "Deleted all staged files");
    }

    fn release(&self, staged: &StagedFile) {
        if let Some(url) = staged.preview.object_url() {
            self.urls.revoke(url);
        }
    }

    /// Save a single blob under its original name.
    ///
    /// The download reference is revoked when this returns, whether or not
    /// the sink succeeded.
    pub fn download_one(&self, blob: &Blob, sink: &mut dyn DownloadSink) -> Result<()> {
        let guard = self.urls.scoped(blob);
        sink.save_as(guard.url(), blob.name(), blob)
    }

    /// Download every staged file in list order, continuing past failures
    pub fn download_all(&self, sink: &mut dyn DownloadSink) -> DownloadSummary {
        let mut summary = DownloadSummary::default();
        for staged in &self.files {
            match self.download_one(&staged.file, sink) {
                Ok(()) => summary.saved += 1,
                Err(err) => {
                    tracing::warn!(name = staged.file.name(), error = %err, "Download failed");
                    summary.failures.push(err);
                }
            }
        }
        summary
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        for staged in &self.files {
            self.release(staged);
        }
        tracing::trace!(count = self.files.len(), "Released staging area");
    }
}
