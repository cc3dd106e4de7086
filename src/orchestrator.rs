//! # Fan-Out Orchestrator
//!
//! Runs one independent job per [`Source`]:
//!
//! ```text
//! prepare directory -> acquire pinned revision -> [dependency bootstrap]
//! ```
//!
//! Jobs run concurrently on a dedicated `rayon` pool. Within a job the steps
//! are strictly sequential; across jobs there is no ordering. The only state
//! shared between jobs is the [`DirectoryPreparer`] lock.
//!
//! ## Failure policy
//!
//! Every job runs to a terminal state before the batch outcome is decided.
//!
//! - **Acquisition failures** are logged with the job's origin and revision.
//!   In strict mode any such failure turns the batch into
//!   [`Error::AggregateFailure`]; otherwise the batch succeeds.
//! - **Dependency bootstrap failures** are always logged and never fail the
//!   batch.
//!
//! Failed working directories are left on disk for inspection.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use log::{debug, error, info, warn};
use rayon::prelude::*;

use crate::acquisition::{Checkout, PinnedCheckout};
use crate::config::RunConfig;
use crate::dependency::{BootstrapOutcome, DependencyBootstrap, DependencyResolver, MavenResolver};
use crate::error::{Error, Result};
use crate::filesystem::DirectoryPreparer;
use crate::repository::{GitOperations, SystemGitOperations};
use crate::source::Source;

/// What happened to a job's optional dependency bootstrap.
#[derive(Debug)]
pub enum DependencyOutcome {
    /// Bootstrap was not enabled for this run.
    NotRequested,
    /// The checkout has no manifest.
    Skipped,
    /// Dependencies were resolved. Counts the neutralized configuration blocks.
    Resolved { neutralized: usize },
    /// Bootstrap failed. Never fatal to the batch.
    Failed(Error),
}

/// Terminal state of one job.
#[derive(Debug)]
pub enum JobOutcome {
    Acquired {
        checkout: Checkout,
        dependencies: DependencyOutcome,
    },
    /// Acquisition failed. The error is wrapped in [`Error::Job`].
    Failed(Error),
}

/// One job's report.
#[derive(Debug)]
pub struct JobReport {
    pub source: Source,
    pub workdir: PathBuf,
    pub outcome: JobOutcome,
}

impl JobReport {
    pub fn is_acquired(&self) -> bool {
        matches!(self.outcome, JobOutcome::Acquired { .. })
    }
}

/// Reports of every job of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub jobs: Vec<JobReport>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.jobs.len()
    }

    pub fn acquired(&self) -> usize {
        self.jobs.iter().filter(|job| job.is_acquired()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.acquired()
    }

    pub fn dependency_failures(&self) -> usize {
        self.jobs
            .iter()
            .filter(|job| {
                matches!(
                    job.outcome,
                    JobOutcome::Acquired {
                        dependencies: DependencyOutcome::Failed(_),
                        ..
                    }
                )
            })
            .count()
    }

    /// Errors of all failed acquisitions.
    pub fn failures(&self) -> impl Iterator<Item = &Error> {
        self.jobs.iter().filter_map(|job| match &job.outcome {
            JobOutcome::Failed(e) => Some(e),
            JobOutcome::Acquired { .. } => None,
        })
    }
}

/// Drives a batch of sources under one [`RunConfig`].
pub struct Orchestrator {
    config: RunConfig,
    git: Box<dyn GitOperations>,
    resolver: Box<dyn DependencyResolver>,
    preparer: DirectoryPreparer,
}

impl Orchestrator {
    /// Orchestrator backed by the system `git` and the configured resolver.
    pub fn new(config: RunConfig) -> Self {
        let resolver = MavenResolver::new(config.resolver_command.clone());
        Self::with_operations(config, Box::new(SystemGitOperations), Box::new(resolver))
    }

    /// Orchestrator with injected backends.
    pub fn with_operations(
        config: RunConfig,
        git: Box<dyn GitOperations>,
        resolver: Box<dyn DependencyResolver>,
    ) -> Self {
        Self {
            config,
            git,
            resolver,
            preparer: DirectoryPreparer::new(),
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Runs every source to a terminal state and applies the failure policy.
    pub fn run(&self, sources: &[Source]) -> Result<BatchReport> {
        self.check_collisions(sources)?;
        if sources.is_empty() {
            info!("No sources to acquire");
            return Ok(BatchReport::default());
        }

        let workers = self.config.jobs.unwrap_or(sources.len()).max(1);
        debug!("Running {} jobs on {} workers", sources.len(), workers);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("pinfetch-worker-{}", i))
            .build()
            .map_err(|e| Error::WorkerPool {
                message: e.to_string(),
            })?;

        let jobs: Vec<JobReport> =
            pool.install(|| sources.par_iter().map(|source| self.run_job(source)).collect());
        let report = BatchReport { jobs };

        info!(
            "{} of {} sources acquired ({} failed, {} dependency failures)",
            report.acquired(),
            report.total(),
            report.failed(),
            report.dependency_failures()
        );

        if self.config.strict && report.failed() > 0 {
            return Err(Error::AggregateFailure {
                failed: report.failed(),
                total: report.total(),
                failures: report.failures().map(|e| e.to_string()).collect(),
            });
        }
        Ok(report)
    }

    /// Rejects batches where a working directory escapes the destination
    /// root or two sources would share one.
    fn check_collisions(&self, sources: &[Source]) -> Result<()> {
        let mut seen: HashMap<PathBuf, &Source> = HashMap::new();
        for source in sources {
            let workdir = self.workdir(source);
            if !stays_below(&self.config.destination, &workdir) {
                return Err(Error::Config {
                    message: format!(
                        "`{}` maps to {}, outside of {}",
                        source,
                        workdir.display(),
                        self.config.destination.display()
                    ),
                });
            }
            if let Some(previous) = seen.insert(workdir.clone(), source) {
                return Err(Error::Config {
                    message: format!(
                        "`{}` and `{}` both map to {}",
                        previous,
                        source,
                        workdir.display()
                    ),
                });
            }
        }
        Ok(())
    }

    fn workdir(&self, source: &Source) -> PathBuf {
        source.working_directory(&self.config.destination, self.config.revision_suffix)
    }

    fn run_job(&self, source: &Source) -> JobReport {
        let workdir = self.workdir(source);
        let outcome = match self.acquire(source, &workdir) {
            Ok(checkout) => JobOutcome::Acquired {
                checkout,
                dependencies: self.bootstrap(source, &workdir),
            },
            Err(e) => {
                let e = e.for_job(source.origin(), source.revision());
                if self.config.strict {
                    error!("{}", e);
                } else {
                    warn!("{} (continuing)", e);
                }
                JobOutcome::Failed(e)
            }
        };
        JobReport {
            source: source.clone(),
            workdir,
            outcome,
        }
    }

    fn acquire(&self, source: &Source, workdir: &Path) -> Result<Checkout> {
        self.preparer.prepare(workdir)?;
        let mut checkout = PinnedCheckout::new(self.git.as_ref(), source, workdir);
        let result = checkout.run();
        if result.is_err() {
            info!(
                "Leaving {} in place after {:?}",
                workdir.display(),
                checkout.state()
            );
        }
        result
    }

    fn bootstrap(&self, source: &Source, workdir: &Path) -> DependencyOutcome {
        if !self.config.with_dependencies {
            return DependencyOutcome::NotRequested;
        }
        match DependencyBootstrap::new(self.resolver.as_ref()).run(workdir) {
            Ok(BootstrapOutcome::Skipped) => DependencyOutcome::Skipped,
            Ok(BootstrapOutcome::Resolved { neutralized, .. }) => DependencyOutcome::Resolved {
                neutralized: neutralized.len(),
            },
            Err(e) => {
                let e = e.for_job(source.origin(), source.revision());
                warn!("Dependency bootstrap: {}", e);
                DependencyOutcome::Failed(e)
            }
        }
    }
}

/// True when `path` is `root` followed by at least one plain component.
fn stays_below(root: &Path, path: &Path) -> bool {
    match path.strip_prefix(root) {
        Ok(rest) => {
            rest.components().next().is_some()
                && rest.components().all(|c| matches!(c, Component::Normal(_)))
        }
        Err(_) => false,
    }
}
