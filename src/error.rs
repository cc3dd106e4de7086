//! # Error Handling
//!
//! This module defines the centralized error type for `pinfetch`. It uses the
//! `thiserror` library to describe every anticipated failure mode with enough
//! context to diagnose a failed job from the log alone.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Variants fall into four groups:
//!   - input and configuration errors raised before any job starts
//!     (`InvalidInput`, `Config`);
//!   - one variant per transition of the pinned-revision acquisition protocol
//!     (`Init`, `Remote`, `DefaultBranchUnresolved`, `Fetch`, `RefCreate`,
//!     `Resolve`, `Reset`);
//!   - dependency bootstrap errors (`ManifestParse`, `ManifestSerialize`,
//!     `ResolverInvocation`);
//!   - batch-level wrappers (`Job`, `AggregateFailure`).
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Acquisition errors are always surfaced wrapped in `Error::Job`, which
//! carries the origin and revision of the job that failed.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for pinfetch operations
#[derive(Error, Debug)]
pub enum Error {
    /// A line of the input list is not a valid `<origin> <revision>` descriptor.
    #[error("Invalid source descriptor {line:?}: {message}")]
    InvalidInput { line: String, message: String },

    /// The run configuration is unusable.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The working directory of a job could not be created.
    #[error("Failed to prepare directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// `git init` failed in the job's working directory.
    #[error("Repository initialization failed in {}: {message}", path.display())]
    Init { path: PathBuf, message: String },

    /// The remote could not be registered.
    #[error("Failed to add remote {remote} -> {url}: {message}")]
    Remote {
        remote: String,
        url: String,
        message: String,
    },

    /// The remote does not advertise a symbolic `HEAD`, or it could not be queried.
    #[error("Could not resolve the default branch of remote {remote}: {message}")]
    DefaultBranchUnresolved { remote: String, message: String },

    /// The shallow fetch of the pinned revision failed.
    #[error("Fetch of revision {revision} failed: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Fetch {
        revision: String,
        message: String,
        /// Optional hint for how to resolve the fetch issue
        hint: Option<String>,
    },

    /// The local branch reference could not be created.
    #[error("Cannot create branch ref refs/heads/{branch}: {message}")]
    RefCreate { branch: String, message: String },

    /// The pinned revision is not present in the object store.
    #[error("Cannot resolve revision {revision}: {message}")]
    Resolve { revision: String, message: String },

    /// The working tree could not be reset to the pinned commit.
    #[error("Hard reset to {commit} failed: {message}")]
    Reset { commit: String, message: String },

    /// The project manifest could not be read or parsed.
    #[error("Failed to parse manifest {}: {message}", path.display())]
    ManifestParse { path: PathBuf, message: String },

    /// The rewritten manifest could not be serialized or written.
    #[error("Failed to write manifest {}: {message}", path.display())]
    ManifestSerialize { path: PathBuf, message: String },

    /// The external dependency resolver could not be started or exited non-zero.
    #[error("Dependency resolver `{command}` failed: {message}")]
    ResolverInvocation { command: String, message: String },

    /// A job-level failure, carrying the job's origin and revision.
    #[error("Job {origin} @ {revision} failed: {error}")]
    Job {
        origin: String,
        revision: String,
        error: Box<Error>,
    },

    /// Strict mode observed at least one failed acquisition.
    #[error("{failed} of {total} jobs failed:{}", failures.iter().map(|f| format!("\n  - {}", f)).collect::<String>())]
    AggregateFailure {
        failed: usize,
        total: usize,
        failures: Vec<String>,
    },

    /// The worker pool could not be built.
    #[error("Worker pool error: {message}")]
    WorkerPool { message: String },

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Wraps `self` with the origin and revision of the job it belongs to.
    pub fn for_job(self, origin: &str, revision: &str) -> Self {
        Error::Job {
            origin: origin.to_string(),
            revision: revision.to_string(),
            error: Box::new(self),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
