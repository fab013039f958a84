use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use dropdesk_core::preview::{self, ACCEPTED_TYPES};
use dropdesk_core::{Blob, DeskConfig, DirectorySink, StagedFile, StagingArea};

use super::tasks::OutputFormat;

#[derive(Parser, Debug)]
pub struct StageArgs {
    /// Files to stage, in drop order
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Download every staged file into this directory
    #[arg(long, value_name = "DIR")]
    pub download_to: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Load dropped paths as blobs, warning about types outside the accept filter
pub async fn load_blobs(paths: &[PathBuf]) -> Result<Vec<Blob>> {
    let mut blobs = Vec::with_capacity(paths.len());
    for path in paths {
        let blob = Blob::from_path(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if !preview::is_accepted(blob.mime_type()) {
            tracing::warn!(
                name = blob.name(),
                mime = blob.mime_type(),
                accepted = ACCEPTED_TYPES,
                "File type has no preview"
            );
        }
        blobs.push(blob);
    }
    Ok(blobs)
}

/// Render one numbered row: summary line, then the indented preview
pub fn render_row(number: usize, staged: &StagedFile) -> String {
    let preview = staged
        .preview()
        .describe()
        .lines()
        .map(|line| format!("     {}", line))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{:>3}. {}\n{}", number, staged.summary(), preview)
}

pub fn download_all_to(area: &StagingArea, dir: &Path) -> Result<usize> {
    let mut sink = DirectorySink::new(dir)
        .with_context(|| format!("Failed to create download directory {}", dir.display()))?;
    let summary = area.download_all(&mut sink);

    for failure in &summary.failures {
        eprintln!("✗ {}", failure);
    }
    if !summary.is_clean() {
        bail!(
            "{} of {} downloads failed",
            summary.failures.len(),
            summary.saved + summary.failures.len()
        );
    }
    Ok(summary.saved)
}

pub async fn run_stage(args: StageArgs, config: &DeskConfig) -> Result<()> {
    let blobs = load_blobs(&args.paths).await?;

    let mut area = StagingArea::new();
    area.accept_drop(blobs);
    area.settle().await;

    match args.format {
        OutputFormat::Json => {
            let views: Vec<_> = area.files().iter().map(StagedFile::view).collect();
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
        OutputFormat::Text => {
            for (index, staged) in area.files().iter().enumerate() {
                println!("{}", render_row(index + 1, staged));
            }
        }
    }

    if let Some(dir) = args.download_to.as_deref() {
        let saved = download_all_to(&area, dir)?;
        eprintln!("✓ Downloaded {} file(s) to {}", saved, dir.display());
    } else {
        tracing::debug!(default_dir = %config.downloads.dir.display(), "No download requested");
    }

    Ok(())
}
