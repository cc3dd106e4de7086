//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a local git "remote" that the acquisition protocol can
//! fetch pinned revisions from, plus a fixture for CLI runs.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     if !git_available() {
//!         return;
//!     }
//!     let remote = FixtureRemote::new("acme", "widget");
//!     let first = remote.commit("README.md", "v1");
//!     // ... test code
//! }
//! ```
//!
//! ## Fixture origins
//!
//! Sources must look like `host:org/repo`. Fixture remotes are addressed as
//! `fixture:<org>/<repo>.git`, and git is told to rewrite the `fixture:`
//! prefix to the remote root through `url.<base>.insteadOf`. The rewrite is
//! passed through `GIT_CONFIG_*` environment variables on the spawned command,
//! so nothing outside the temp directory is touched.

use std::path::{Path, PathBuf};
use std::process::Command;

use assert_fs::prelude::*;

/// Re-export commonly used test dependencies for convenience.
#[allow(unused_imports)]
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    pub use super::{git, git_available, FixtureRemote, TestFixture, FIXTURE_SCHEME};
}

/// Prefix of fixture origins, rewritten to the remote root by git.
pub const FIXTURE_SCHEME: &str = "fixture:";

/// Returns `true` if a `git` executable is on `PATH`.
///
/// Tests that need real git return early when it is missing.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Runs `git <args>` in `dir` and returns trimmed stdout, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=Pinfetch Tests",
            "-c",
            "user.email=tests@pinfetch.invalid",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {} failed in {}: {}",
        args.join(" "),
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A local repository served to the acquisition protocol as a remote.
pub struct FixtureRemote {
    root: assert_fs::TempDir,
    organization: String,
    repository: String,
}

#[allow(dead_code)]
impl FixtureRemote {
    /// Create `<root>/<org>/<repo>.git` with `main` as its default branch.
    pub fn new(organization: &str, repository: &str) -> Self {
        let root = assert_fs::TempDir::new().expect("Failed to create temp directory");
        let remote = Self {
            root,
            organization: organization.to_string(),
            repository: repository.to_string(),
        };
        let dir = remote.dir();
        std::fs::create_dir_all(&dir).expect("Failed to create remote directory");
        git(&dir, &["init", "--quiet"]);
        git(&dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        // Serve commits that are not the tip of any branch
        git(&dir, &["config", "uploadpack.allowAnySHA1InWant", "true"]);
        remote
    }

    /// Working tree of the remote repository.
    pub fn dir(&self) -> PathBuf {
        self.root
            .path()
            .join(&self.organization)
            .join(format!("{}.git", self.repository))
    }

    /// Write `path` with `contents`, commit it, and return the commit id.
    pub fn commit(&self, path: &str, contents: &str) -> String {
        let dir = self.dir();
        let file = dir.join(path);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file, contents).expect("Failed to write file");
        git(&dir, &["add", path]);
        git(&dir, &["commit", "--quiet", "-m", &format!("update {}", path)]);
        git(&dir, &["rev-parse", "HEAD"])
    }

    /// Origin as it appears in an input list.
    pub fn origin(&self) -> String {
        format!(
            "{}{}/{}.git",
            FIXTURE_SCHEME, self.organization, self.repository
        )
    }

    /// `file://` URL of the remote root, the `insteadOf` base for `fixture:`.
    pub fn base_url(&self) -> String {
        format!("file://{}/", self.root.path().display())
    }

    /// Translate a fixture origin to the real `file://` URL.
    pub fn resolve_url(&self, origin: &str) -> String {
        match origin.strip_prefix(FIXTURE_SCHEME) {
            Some(path) => format!("{}{}", self.base_url(), path),
            None => origin.to_string(),
        }
    }

    /// Environment that makes git rewrite `fixture:` to this remote.
    pub fn git_env(&self) -> Vec<(String, String)> {
        vec![
            ("GIT_CONFIG_COUNT".to_string(), "1".to_string()),
            (
                "GIT_CONFIG_KEY_0".to_string(),
                format!("url.{}.insteadOf", self.base_url()),
            ),
            ("GIT_CONFIG_VALUE_0".to_string(), FIXTURE_SCHEME.to_string()),
        ]
    }
}

/// A temp directory holding an input list and the destination tree of a run.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `sources.txt` with the given lines.
    pub fn with_input(self, lines: &[String]) -> Self {
        let mut content = lines.join("\n");
        content.push('\n');
        self.temp_dir
            .child("sources.txt")
            .write_str(&content)
            .expect("Failed to write input list");
        self
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn input_path(&self) -> PathBuf {
        self.temp_dir.path().join("sources.txt")
    }

    pub fn destination(&self) -> PathBuf {
        self.temp_dir.path().join("out")
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A `pinfetch` command reading this fixture's input into its destination.
    ///
    /// Git never prompts and ssh always fails, so unreachable origins fail fast.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("pinfetch");
        cmd.current_dir(self.path())
            .env_remove("PINFETCH_INPUT")
            .env_remove("PINFETCH_CONFIG")
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_SSH_COMMAND", "false")
            .arg("--input")
            .arg(self.input_path())
            .arg("--dst")
            .arg(self.destination())
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
