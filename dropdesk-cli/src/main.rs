//! dropdesk CLI - file staging and a persisted task list
//!
//! Entry point for the `dropdesk` command-line tool:
//! - Task list management backed by a local JSON storage file (`tasks` subcommand)
//! - One-shot staging with previews and bulk download (`stage` subcommand)
//! - Interactive staging session (`session` subcommand)
//! - Configuration management (`config` subcommand)

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use dropdesk_core::DeskConfig;

mod commands;
mod config;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "dropdesk",
    author,
    version,
    about = "Stage files with previews and keep a persisted to-do list",
    long_about = "Drop files into a staging area to preview and re-save them, and manage a small \
                  task list that is written to local storage after every change."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Storage file for the task list (overrides config)
    #[arg(long, global = true, value_name = "PATH", env = "DROPDESK_STORE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage the task list (add, list, toggle, delete)
    Tasks(commands::tasks::TasksArgs),
    /// Stage files, show their previews and optionally download them all
    Stage(commands::stage::StageArgs),
    /// Interactive staging session (drop, list, delete, download)
    Session(commands::session::SessionArgs),
    /// Manage dropdesk configuration (init, path, show)
    Config(config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Only commands that read the config fail on a broken file
    let loaded = DeskConfig::load_or_default();
    tracing_setup::init(&tracing_setup::TracingConfig {
        debug: cli.debug,
        default_level: loaded
            .as_ref()
            .ok()
            .and_then(|config| config.logging.level.clone()),
    })
    .ok();

    match cli.command {
        Commands::Tasks(args) => {
            let store_path = match cli.store {
                Some(path) => path,
                None => loaded?.storage.path,
            };
            commands::tasks::run_tasks(args, &store_path)?
        }
        Commands::Stage(args) => commands::stage::run_stage(args, &loaded?).await?,
        Commands::Session(args) => commands::session::run_session(args, &loaded?).await?,
        Commands::Config(args) => config::run_config(args, loaded)?,
        Commands::Completions(args) => run_completions(args)?,
    }

    Ok(())
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
