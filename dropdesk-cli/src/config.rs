use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dropdesk_core::DeskConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a config file with default values
    Init(InitArgs),
    /// Show config file path
    Path,
    /// Print the effective configuration as TOML
    Show,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

/// `loaded` is only required by `show`; `init` and `path` work over a broken file.
pub fn run_config(args: ConfigArgs, loaded: dropdesk_core::Result<DeskConfig>) -> Result<()> {
    match args.command {
        ConfigCommands::Init(args) => run_init(args),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => run_show(&loaded?),
    }
}

fn run_init(args: InitArgs) -> Result<()> {
    let config_path = DeskConfig::config_path();

    if config_path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists at {:?}\n\nUse --force to overwrite",
            config_path
        ));
    }

    DeskConfig::default()
        .save_to(&config_path)
        .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

    println!("✓ Wrote {}", config_path.display());
    Ok(())
}

fn run_path() -> Result<()> {
    println!("{}", DeskConfig::config_path().display());
    Ok(())
}

fn run_show(effective: &DeskConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(effective).context("Failed to render config as TOML")?;
    print!("{}", rendered);
    Ok(())
}
