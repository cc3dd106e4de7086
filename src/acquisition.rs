//! # Pinned-Revision Acquisition
//!
//! Most acquisition tooling fetches a named ref. Here the target is an opaque
//! commit id that need not be the tip of any branch, so a plain shallow clone
//! does not apply. [`PinnedCheckout`] drives the following sequence instead:
//!
//! ```text
//! Uninitialized -> Initialized -> RemoteAdded -> DefaultBranchResolved
//!     -> Fetched -> HeadRefCreated -> Reset
//! ```
//!
//! 1. **Initialize** an empty repository in the working directory.
//! 2. **Add remote** `origin` pointing at the source's origin.
//! 3. **Resolve default branch** from the remote's symbolic `HEAD`.
//! 4. **Fetch** the revision with depth 1, naming the commit id directly as the
//!    source side of the refspec: `+<rev>:refs/remotes/origin/<branch>`.
//! 5. **Create the local branch** as an unborn placeholder for `HEAD`.
//! 6. **Resolve and reset**: resolve the revision in the object store and
//!    hard-reset the branch and working tree onto it.
//!
//! Any failing transition moves the machine to `Failed` and aborts the job.
//! Whatever was already written to the working directory stays there for
//! inspection; jobs are not retried.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::defaults::REMOTE_NAME;
use crate::error::{Error, Result};
use crate::repository::GitOperations;
use crate::source::Source;

/// One transition of the acquisition protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Initialize,
    AddRemote,
    ResolveDefaultBranch,
    Fetch,
    CreateHeadRef,
    ResetToRevision,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transition::Initialize => "initialize",
            Transition::AddRemote => "add remote",
            Transition::ResolveDefaultBranch => "resolve default branch",
            Transition::Fetch => "fetch",
            Transition::CreateHeadRef => "create head ref",
            Transition::ResetToRevision => "reset",
        };
        f.write_str(name)
    }
}

/// Where a [`PinnedCheckout`] currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    Uninitialized,
    Initialized,
    RemoteAdded,
    DefaultBranchResolved,
    Fetched,
    HeadRefCreated,
    /// Terminal success.
    Reset,
    /// Terminal failure, recording the transition that failed.
    Failed(Transition),
}

impl AcquisitionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AcquisitionState::Reset | AcquisitionState::Failed(_))
    }
}

/// Result of a successful acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    /// The default branch the commit was filed under.
    pub branch: String,
    /// The commit the working tree is checked out at.
    pub commit: String,
}

/// Runs the acquisition protocol for one source in one working directory.
pub struct PinnedCheckout<'a> {
    git: &'a dyn GitOperations,
    source: &'a Source,
    workdir: PathBuf,
    state: AcquisitionState,
}

impl<'a> PinnedCheckout<'a> {
    pub fn new(git: &'a dyn GitOperations, source: &'a Source, workdir: &Path) -> Self {
        Self {
            git,
            source,
            workdir: workdir.to_path_buf(),
            state: AcquisitionState::Uninitialized,
        }
    }

    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Drives the machine to a terminal state.
    ///
    /// Errors are returned unwrapped; the caller adds job context.
    pub fn run(&mut self) -> Result<Checkout> {
        if self.state != AcquisitionState::Uninitialized {
            return Err(Error::Config {
                message: format!(
                    "acquisition of {} already ran (state {:?})",
                    self.source, self.state
                ),
            });
        }

        let git = self.git;
        let source = self.source;
        let workdir = self.workdir.clone();
        let origin = source.origin();
        let revision = source.revision();

        self.advance(Transition::Initialize, AcquisitionState::Initialized, || {
            git.init(&workdir)
        })?;

        self.advance(Transition::AddRemote, AcquisitionState::RemoteAdded, || {
            git.add_remote(&workdir, REMOTE_NAME, origin)
        })?;

        let branch = self.advance(
            Transition::ResolveDefaultBranch,
            AcquisitionState::DefaultBranchResolved,
            || git.default_branch(&workdir, REMOTE_NAME),
        )?;
        debug!("{}: default branch is {}", origin, branch);

        self.advance(Transition::Fetch, AcquisitionState::Fetched, || {
            git.fetch_revision(&workdir, REMOTE_NAME, revision, &branch)
        })?;

        self.advance(
            Transition::CreateHeadRef,
            AcquisitionState::HeadRefCreated,
            || git.create_branch_ref(&workdir, &branch),
        )?;

        let commit = self.advance(
            Transition::ResetToRevision,
            AcquisitionState::Reset,
            || {
                let commit = git.resolve_commit(&workdir, revision)?;
                git.reset_hard(&workdir, &commit)?;
                let head = git.head_commit(&workdir)?;
                if head != commit {
                    return Err(Error::Reset {
                        commit,
                        message: format!("working tree is at {} after reset", head),
                    });
                }
                Ok(commit)
            },
        )?;

        info!(
            "Checked out {} at {} ({})",
            origin,
            commit,
            self.workdir.display()
        );
        Ok(Checkout { branch, commit })
    }

    fn advance<T>(
        &mut self,
        transition: Transition,
        next: AcquisitionState,
        op: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        debug!("{}: {}", self.source.origin(), transition);
        match op() {
            Ok(value) => {
                self.state = next;
                Ok(value)
            }
            Err(e) => {
                self.state = AcquisitionState::Failed(transition);
                Err(e)
            }
        }
    }
}
