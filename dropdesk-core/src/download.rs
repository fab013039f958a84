//! Save-as targets for staged files.

use std::path::{Path, PathBuf};

use crate::blob::Blob;
use crate::error::{DeskError, Result};
use crate::object_url::ObjectUrl;

/// Host side of a save-as interaction
pub trait DownloadSink {
    /// Save `blob` under `name`. `url` is the live reference for the duration of the call.
    fn save_as(&mut self, url: &ObjectUrl, name: &str, blob: &Blob) -> Result<()>;
}

/// Writes downloads into a directory, like a browser's download folder
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl DirectorySink {
    /// Create the sink, creating `dir` if it does not exist
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            saved: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in order
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }

    /// First free path for `name`: `name`, then `stem (1).ext`, `stem (2).ext`, ...
    fn free_path(&self, name: &str) -> PathBuf {
        let candidate = self.dir.join(name);
        if !candidate.exists() {
            return candidate;
        }

        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (name, None),
        };

        (1..)
            .map(|n| match ext {
                Some(ext) => self.dir.join(format!("{} ({}).{}", stem, n, ext)),
                None => self.dir.join(format!("{} ({})", stem, n)),
            })
            .find(|path| !path.exists())
            .unwrap_or(candidate)
    }
}

impl DownloadSink for DirectorySink {
    fn save_as(&mut self, url: &ObjectUrl, name: &str, blob: &Blob) -> Result<()> {
        // Names come from the drop surface; never let them escape the directory
        let safe_name = Path::new(name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| DeskError::download(name, "invalid file name"))?;

        let path = self.free_path(&safe_name);
        std::fs::write(&path, blob.bytes())
            .map_err(|e| DeskError::download(name, e.to_string()))?;

        tracing::info!(url = %url, path = %path.display(), size = blob.size(), "Saved download");
        self.saved.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_url::ObjectUrlRegistry;

    #[test]
    fn saves_with_original_name_and_suffixes_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path().join("out")).unwrap();
        let registry = ObjectUrlRegistry::new();

        let first = Blob::new("notes.txt", "text/plain", "one");
        let second = Blob::new("notes.txt", "text/plain", "two");
        let bare = Blob::new("README", "text/plain", "x");
        let bare_again = Blob::new("README", "text/plain", "y");

        for blob in [&first, &second, &bare, &bare_again] {
            let guard = registry.scoped(blob);
            sink.save_as(guard.url(), blob.name(), blob).unwrap();
        }

        let out = dir.path().join("out");
        assert_eq!(std::fs::read_to_string(out.join("notes.txt")).unwrap(), "one");
        assert_eq!(std::fs::read_to_string(out.join("notes (1).txt")).unwrap(), "two");
        assert_eq!(std::fs::read_to_string(out.join("README")).unwrap(), "x");
        assert_eq!(std::fs::read_to_string(out.join("README (1)")).unwrap(), "y");
        assert_eq!(sink.saved().len(), 4);
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn strips_directory_components() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path()).unwrap();
        let registry = ObjectUrlRegistry::new();
        let blob = Blob::new("../../escape.txt", "text/plain", "nope");

        let url = registry.create(&blob);
        sink.save_as(&url, blob.name(), &blob).unwrap();

        assert!(dir.path().join("escape.txt").exists());
    }

    #[test]
    fn rejects_empty_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path()).unwrap();
        let registry = ObjectUrlRegistry::new();
        let blob = Blob::new("..", "text/plain", "x");

        let url = registry.create(&blob);
        let err = sink.save_as(&url, blob.name(), &blob).unwrap_err();
        assert!(matches!(err, DeskError::Download { .. }));
    }
}
