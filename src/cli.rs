//! CLI argument parsing and logging setup

use anyhow::Result;
use clap::Parser;
use env_logger::{Env, WriteStyle};

use crate::commands;

/// Pinfetch - Acquire many repositories at pinned revisions
#[derive(Parser, Debug)]
#[command(name = "pinfetch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    fetch: commands::fetch::FetchArgs,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level, &self.color);
        let output = pinfetch::output::OutputConfig::from_env_and_flag(&self.color);
        commands::fetch::execute(self.fetch, &output)
    }
}

/// Installs the global logger. `RUST_LOG` takes precedence over `--log-level`.
fn init_logging(level: &str, color: &str) {
    let write_style = match color.to_lowercase().as_str() {
        "always" => WriteStyle::Always,
        "never" => WriteStyle::Never,
        _ => WriteStyle::Auto,
    };
    // A logger may already be installed when running under a test harness.
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .write_style(write_style)
        .format_timestamp(None)
        .try_init();
}
