//! Interactive staging session
//!
//! A line-oriented event loop over stdin. The staging area lives for the
//! whole session; text previews finish in the background and are applied
//! between commands.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use dropdesk_core::{Blob, DeskConfig, DirectorySink, StagingArea};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::stage::{download_all_to, load_blobs, render_row};

#[derive(Parser, Debug)]
pub struct SessionArgs {
    /// Directory for downloads (defaults to the configured download dir)
    #[arg(long, value_name = "DIR")]
    pub download_to: Option<PathBuf>,
}

const HELP: &str = "\
Commands:
  drop <path>...   stage files (appended in order)
  list             show staged files and previews
  delete <n>       remove file number n
  delete-all       remove every file
  download <n>     save file number n to the download directory
  download-all     save every file, in list order
  help             show this help
  quit             end the session";

/// Parsed session command
#[derive(Debug, PartialEq, Eq)]
enum SessionCommand {
    Drop(Vec<PathBuf>),
    List,
    Delete(usize),
    DeleteAll,
    Download(usize),
    DownloadAll,
    Help,
    Quit,
}

impl SessionCommand {
    fn parse(line: &str) -> Result<Option<Self>> {
        let words = shlex::split(line).ok_or_else(|| anyhow!("unbalanced quotes"))?;
        let Some((head, rest)) = words.split_first() else {
            return Ok(None);
        };

        let command = match head.as_str() {
            "drop" if !rest.is_empty() => Self::Drop(rest.iter().map(PathBuf::from).collect()),
            "drop" => bail!("usage: drop <path>..."),
            "list" | "ls" => Self::List,
            "delete" | "rm" => Self::Delete(parse_number(rest)?),
            "delete-all" => Self::DeleteAll,
            "download" => Self::Download(parse_number(rest)?),
            "download-all" => Self::DownloadAll,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => bail!("unknown command '{}' (try 'help')", other),
        };
        Ok(Some(command))
    }
}

fn parse_number(rest: &[String]) -> Result<usize> {
    match rest {
        [n] => n
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| anyhow!("expected a row number, got '{}'", n)),
        _ => bail!("expected exactly one row number"),
    }
}

/// Create the download sink on first use
fn ensure_sink<'a>(
    slot: &'a mut Option<DirectorySink>,
    dir: &Path,
) -> Result<&'a mut DirectorySink> {
    if slot.is_none() {
        let sink = DirectorySink::new(dir)
            .with_context(|| format!("Failed to create download directory {}", dir.display()))?;
        *slot = Some(sink);
    }
    slot.as_mut()
        .ok_or_else(|| anyhow!("download directory unavailable"))
}

struct Session {
    area: StagingArea,
    download_dir: PathBuf,
    sink: Option<DirectorySink>,
}

impl Session {
    fn blob_at(&self, number: usize) -> Result<Blob> {
        self.area
            .files()
            .get(number - 1)
            .map(|staged| staged.file().clone())
            .ok_or_else(|| anyhow!("no file number {} ({} staged)", number, self.area.len()))
    }

    fn print_list(&self) {
        if self.area.is_empty() {
            println!("(nothing staged)");
        }
        for (index, staged) in self.area.files().iter().enumerate() {
            println!("{}", render_row(index + 1, staged));
        }
    }

    /// Run one command. Returns false when the session should end.
    async fn handle(&mut self, command: SessionCommand) -> Result<bool> {
        match command {
            SessionCommand::Drop(paths) => {
                let blobs = load_blobs(&paths).await?;
                let added = self.area.accept_drop(blobs);
                println!("✓ Staged {} file(s), {} total", added, self.area.len());
            }
            SessionCommand::List => self.print_list(),
            SessionCommand::Delete(number) => {
                let blob = self.blob_at(number)?;
                self.area.delete_one(&blob);
                println!("✓ Removed {}", blob.name());
            }
            SessionCommand::DeleteAll => {
                self.area.delete_all();
                println!("✓ Cleared staging area");
            }
            SessionCommand::Download(number) => {
                let blob = self.blob_at(number)?;
                let sink = ensure_sink(&mut self.sink, &self.download_dir)?;
                self.area.download_one(&blob, sink)?;
                if let Some(path) = sink.saved().last() {
                    println!("✓ Saved {}", path.display());
                }
            }
            SessionCommand::DownloadAll => {
                let saved = download_all_to(&self.area, &self.download_dir)?;
                println!("✓ Saved {} file(s) to {}", saved, self.download_dir.display());
            }
            SessionCommand::Help => println!("{}", HELP),
            SessionCommand::Quit => return Ok(false),
        }
        Ok(true)
    }
}

pub async fn run_session(args: SessionArgs, config: &DeskConfig) -> Result<()> {
    let mut session = Session {
        area: StagingArea::new(),
        download_dir: args
            .download_to
            .unwrap_or_else(|| config.downloads.dir.clone()),
        sink: None,
    };

    println!("dropdesk session - type 'help' for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let pending = session.area.pending_previews() > 0;
        tokio::select! {
            Some(changed) = session.area.next_update(), if pending => {
                tracing::debug!(changed, "Applied preview update");
                if changed > 0 {
                    println!("· text preview ready (type 'list' to view)");
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                session.area.drain_updates();

                let command = match SessionCommand::parse(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(err) => {
                        eprintln!("✗ {}", err);
                        continue;
                    }
                };
                match session.handle(command).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(err) => eprintln!("✗ {:#}", err),
                }
            }
        }
    }

    tracing::debug!(staged = session.area.len(), "Session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(SessionCommand::parse("").unwrap(), None);
        assert_eq!(SessionCommand::parse("list").unwrap(), Some(SessionCommand::List));
        assert_eq!(
            SessionCommand::parse("drop a.png 'my notes.txt'").unwrap(),
            Some(SessionCommand::Drop(vec![
                PathBuf::from("a.png"),
                PathBuf::from("my notes.txt")
            ]))
        );
        assert_eq!(
            SessionCommand::parse("delete 2").unwrap(),
            Some(SessionCommand::Delete(2))
        );
        assert_eq!(
            SessionCommand::parse("download-all").unwrap(),
            Some(SessionCommand::DownloadAll)
        );
        assert_eq!(SessionCommand::parse("quit").unwrap(), Some(SessionCommand::Quit));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(SessionCommand::parse("drop").is_err());
        assert!(SessionCommand::parse("delete").is_err());
        assert!(SessionCommand::parse("delete 0").is_err());
        assert!(SessionCommand::parse("delete two").is_err());
        assert!(SessionCommand::parse("frobnicate").is_err());
        assert!(SessionCommand::parse("drop 'unterminated").is_err());
    }

    #[tokio::test]
    async fn session_round_trip() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let note = src.path().join("note.txt");
        std::fs::write(&note, "hello").unwrap();

        let mut session = Session {
            area: StagingArea::new(),
            download_dir: out.path().to_path_buf(),
            sink: None,
        };

        assert!(session
            .handle(SessionCommand::Drop(vec![note.clone(), note.clone()]))
            .await
            .unwrap());
        session.area.settle().await;
        assert_eq!(session.area.files()[1].preview().describe(), "hello");

        session.handle(SessionCommand::Download(1)).await.unwrap();
        assert!(out.path().join("note.txt").exists());

        session.handle(SessionCommand::Delete(1)).await.unwrap();
        assert_eq!(session.area.len(), 1);
        assert!(session.handle(SessionCommand::Delete(5)).await.is_err());

        session.handle(SessionCommand::DeleteAll).await.unwrap();
        assert!(session.area.is_empty());
        assert!(!session.handle(SessionCommand::Quit).await.unwrap());
    }
}
