pub mod blob;
pub mod config;
pub mod download;
pub mod error;
pub mod object_url;
pub mod preview;
pub mod staging;
pub mod storage;
pub mod tasks;

pub use blob::Blob;
pub use config::DeskConfig;
pub use download::{DirectorySink, DownloadSink};
pub use error::{DeskError, Result};
pub use object_url::{ObjectUrl, ObjectUrlGuard, ObjectUrlRegistry};
pub use preview::{Preview, TextPreview};
pub use staging::{DownloadSummary, PreviewUpdate, StagedFile, StagingArea};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use tasks::{TaskList, TaskRecord};
