//! # Git Backend Seam
//!
//! The acquisition protocol talks to version control only through the
//! [`GitOperations`] trait. Each method corresponds to one transition of the
//! protocol, so the state machine in [`crate::acquisition`] stays independent
//! of how git is driven.
//!
//! In the main application [`SystemGitOperations`] is used, which wraps the
//! system `git` command. In tests it is replaced with recording mocks that
//! simulate failures at any transition without touching the network.

use std::path::Path;

use crate::error::Result;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Creates an empty repository rooted at `workdir`.
    fn init(&self, workdir: &Path) -> Result<()>;

    /// Registers `url` under the remote `name`.
    fn add_remote(&self, workdir: &Path, name: &str, url: &str) -> Result<()>;

    /// Returns the branch the remote's symbolic `HEAD` points at.
    fn default_branch(&self, workdir: &Path, remote: &str) -> Result<String>;

    /// Shallow-fetches `revision` into `refs/remotes/<remote>/<branch>`.
    fn fetch_revision(&self, workdir: &Path, remote: &str, revision: &str, branch: &str)
        -> Result<()>;

    /// Creates the local branch `branch` as an unborn placeholder for `HEAD`.
    fn create_branch_ref(&self, workdir: &Path, branch: &str) -> Result<()>;

    /// Resolves `revision` to a commit id present in the local object store.
    fn resolve_commit(&self, workdir: &Path, revision: &str) -> Result<String>;

    /// Hard-resets the current branch, index and working tree to `commit`.
    fn reset_hard(&self, workdir: &Path, commit: &str) -> Result<()>;

    /// The commit currently checked out.
    fn head_commit(&self, workdir: &Path) -> Result<String>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command to perform real Git operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemGitOperations;

impl GitOperations for SystemGitOperations {
    fn init(&self, workdir: &Path) -> Result<()> {
        crate::git::init(workdir)
    }

    fn add_remote(&self, workdir: &Path, name: &str, url: &str) -> Result<()> {
        crate::git::remote_add(workdir, name, url)
    }

    fn default_branch(&self, workdir: &Path, remote: &str) -> Result<String> {
        crate::git::default_branch(workdir, remote)
    }

    fn fetch_revision(
        &self,
        workdir: &Path,
        remote: &str,
        revision: &str,
        branch: &str,
    ) -> Result<()> {
        crate::git::fetch_revision(workdir, remote, revision, branch)
    }

    fn create_branch_ref(&self, workdir: &Path, branch: &str) -> Result<()> {
        crate::git::create_branch_ref(workdir, branch)
    }

    fn resolve_commit(&self, workdir: &Path, revision: &str) -> Result<String> {
        crate::git::resolve_commit(workdir, revision)
    }

    fn reset_hard(&self, workdir: &Path, commit: &str) -> Result<()> {
        crate::git::reset_hard(workdir, commit)
    }

    fn head_commit(&self, workdir: &Path) -> Result<String> {
        crate::git::head_commit(workdir)
    }
}
