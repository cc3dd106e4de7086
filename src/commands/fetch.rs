//! Fetch command implementation
//!
//! Reads the input list, resolves the run configuration and hands both to the
//! orchestrator:
//! 1. Parse every `<origin> <revision>` line (any bad line aborts the run)
//! 2. Merge flags over the optional config file over defaults
//! 3. Acquire all sources concurrently
//! 4. Print a summary

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

use pinfetch::config::{self, FileConfig, RunConfig};
use pinfetch::orchestrator::{BatchReport, DependencyOutcome, JobOutcome, Orchestrator};
use pinfetch::output::{OutputConfig, Status};
use pinfetch::source;

/// Arguments for the fetch command
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// File listing `<origin> <revision>` pairs, one per line
    #[arg(short, long, value_name = "PATH", env = "PINFETCH_INPUT")]
    pub input: PathBuf,

    /// Destination root directory [default: downloaded-sources]
    #[arg(short, long = "dst", value_name = "PATH")]
    pub destination: Option<PathBuf>,

    /// Also copy each project's Maven dependencies next to it
    #[arg(long, overrides_with = "no_with_dependencies")]
    pub with_dependencies: bool,

    /// Skip dependency copying even if the config file enables it
    #[arg(long, overrides_with = "with_dependencies")]
    pub no_with_dependencies: bool,

    /// Fail the run if any repository could not be acquired
    #[arg(long, overrides_with = "no_strict")]
    pub strict: bool,

    /// Keep going after failures even if the config file sets `strict`
    #[arg(long, overrides_with = "strict")]
    pub no_strict: bool,

    /// Maximum number of concurrent jobs [default: one per repository]
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub jobs: Option<u64>,

    /// Append the revision to each working directory name
    #[arg(long, overrides_with = "no_revision_suffix")]
    pub revision_suffix: bool,

    /// Use bare repository names even if the config file enables suffixes
    #[arg(long, overrides_with = "revision_suffix")]
    pub no_revision_suffix: bool,

    /// Path to a YAML config file
    #[arg(long, value_name = "PATH", env = "PINFETCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Suppress the summary
    #[arg(short, long)]
    pub quiet: bool,
}

impl FetchArgs {
    /// The layer of settings given on the command line.
    fn overrides(&self) -> FileConfig {
        FileConfig {
            destination: self.destination.clone(),
            with_dependencies: toggle(self.with_dependencies, self.no_with_dependencies),
            strict: toggle(self.strict, self.no_strict),
            jobs: self.jobs.map(|n| n as usize),
            revision_suffix: toggle(self.revision_suffix, self.no_revision_suffix),
            resolver_command: None,
        }
    }

    /// Resolve the run configuration: flags over config file over defaults.
    pub fn run_config(&self) -> Result<RunConfig> {
        let file = match &self.config {
            Some(path) => config::from_file(path)?,
            None => FileConfig::default(),
        };
        Ok(RunConfig::from_file_config(&file).merged(&self.overrides()))
    }
}

/// A `--flag`/`--no-flag` pair; `None` when neither was given.
fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

/// Execute the fetch command
pub fn execute(args: FetchArgs, output: &OutputConfig) -> Result<()> {
    let start_time = Instant::now();

    let sources = source::read_list(&args.input)
        .with_context(|| format!("Failed to read input list {}", args.input.display()))?;
    let run_config = args.run_config()?;

    if !args.quiet {
        println!(
            "{}",
            output.line(
                Status::Fetching,
                format_args!(
                    "Acquiring {} repositories into {}",
                    sources.len(),
                    run_config.destination.display()
                )
            )
        );
    }

    let report = Orchestrator::new(run_config).run(&sources)?;

    if !args.quiet {
        print_summary(&report, output);
        println!("   Finished in {:.2}s", start_time.elapsed().as_secs_f64());
    }
    Ok(())
}

fn print_summary(report: &BatchReport, output: &OutputConfig) {
    println!(
        "{}",
        output.line(
            Status::Ok,
            format_args!("{} of {} acquired", report.acquired(), report.total())
        )
    );
    if report.failed() > 0 || report.dependency_failures() > 0 {
        println!(
            "   {} failed, {} dependency failures",
            report.failed(),
            report.dependency_failures()
        );
    }

    for job in &report.jobs {
        match &job.outcome {
            JobOutcome::Failed(e) => {
                println!("{}", output.line(Status::Failed, e));
            }
            JobOutcome::Acquired {
                dependencies: DependencyOutcome::Failed(e),
                ..
            } => {
                println!("{}", output.line(Status::Warn, e));
            }
            JobOutcome::Acquired { .. } => {}
        }
    }
}
