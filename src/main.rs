//! # Pinfetch CLI
//!
//! This is the binary entry point for the `pinfetch` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging.
//! - Handling top-level application errors and translating them into a
//!   non-zero exit status.
//!
//! The acquisition engine itself lives in the `pinfetch` library crate; the
//! binary is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
