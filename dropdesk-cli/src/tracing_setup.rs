//! Tracing setup for the dropdesk CLI
//!
//! Usage:
//!   dropdesk --debug ...               # Debug logging to stderr
//!   RUST_LOG=dropdesk_core=trace ...   # Fine-grained log control
//!
//! Precedence: RUST_LOG, then --debug, then `[logging] level` from config,
//! then `warn`. Logs go to stderr so command output stays pipeable.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Enable debug logging (used when RUST_LOG is not set)
    pub debug: bool,
    /// Default filter from the config file
    pub default_level: Option<String>,
}

fn build_filter(config: &TracingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config.debug {
            EnvFilter::new("debug")
        } else {
            let level = config.default_level.as_deref().unwrap_or("warn");
            EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
        }
    })
}

/// Initialize tracing with compact console output on stderr
pub fn init(config: &TracingConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(config))
        .with_target(config.debug) // Show targets in debug mode
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
