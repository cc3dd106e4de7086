//! # Dependency Bootstrap
//!
//! After a successful checkout the project's build-time dependencies can be
//! materialized next to it. This takes three steps:
//!
//! 1. Rewrite `pom.xml` into a sidecar with the dependency-copy plugin
//!    neutralized (see [`crate::manifest::rewrite`]).
//! 2. Create the fixed output directory.
//! 3. Hand the sidecar and the output directory to an external resolver.
//!
//! The resolver is a black box behind [`DependencyResolver`]; the default
//! [`MavenResolver`] shells out to `mvn dependency:copy-dependencies`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};

use crate::defaults::{self, DEPENDENCY_DIR, MANIFEST_FILE};
use crate::error::{Error, Result};
use crate::manifest::{self, Neutralized};

/// Number of stderr lines kept in a resolver failure.
const STDERR_TAIL_LINES: usize = 20;

/// Materializes the dependencies declared by a manifest into a directory.
pub trait DependencyResolver: Send + Sync {
    /// Resolves the dependencies of `manifest` into `output_dir`, running in
    /// `project_dir`.
    fn resolve(&self, project_dir: &Path, manifest: &Path, output_dir: &Path) -> Result<()>;
}

/// Resolver that invokes Maven's dependency plugin.
#[derive(Debug, Clone)]
pub struct MavenResolver {
    command: String,
}

impl MavenResolver {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Default for MavenResolver {
    fn default() -> Self {
        Self::new(defaults::resolver_command())
    }
}

impl DependencyResolver for MavenResolver {
    fn resolve(&self, project_dir: &Path, manifest: &Path, output_dir: &Path) -> Result<()> {
        // Both paths are handed to a process running in `project_dir`.
        let manifest = std::path::absolute(manifest)?;
        let output_dir = std::path::absolute(output_dir)?;
        let output_arg = format!("-DoutputDirectory={}", output_dir.display());
        debug!(
            "{} dependency:copy-dependencies {} -f {} (in {})",
            self.command,
            output_arg,
            manifest.display(),
            project_dir.display()
        );

        let output = Command::new(&self.command)
            .arg("--batch-mode")
            .arg("dependency:copy-dependencies")
            .arg(&output_arg)
            .arg("-f")
            .arg(&manifest)
            .current_dir(project_dir)
            .output()
            .map_err(|e| Error::ResolverInvocation {
                command: self.command.clone(),
                message: format!("failed to start: {}", e),
            })?;

        if output.status.success() {
            return Ok(());
        }

        // Maven reports build errors on stdout, so fall back to it.
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = if stderr.trim().is_empty() {
            tail(&stdout, STDERR_TAIL_LINES)
        } else {
            tail(&stderr, STDERR_TAIL_LINES)
        };
        Err(Error::ResolverInvocation {
            command: self.command.clone(),
            message: if detail.is_empty() {
                format!("exited with {}", output.status)
            } else {
                format!("exited with {}:\n{}", output.status, detail)
            },
        })
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.trim_end().lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}

/// Terminal state of one bootstrap.
#[derive(Debug, Clone)]
pub enum BootstrapOutcome {
    /// The project has no manifest.
    Skipped,
    Resolved {
        sidecar: PathBuf,
        output_dir: PathBuf,
        neutralized: Vec<Neutralized>,
    },
}

/// Rewrite, prepare, resolve, for one checked-out project.
pub struct DependencyBootstrap<'a> {
    resolver: &'a dyn DependencyResolver,
}

impl<'a> DependencyBootstrap<'a> {
    pub fn new(resolver: &'a dyn DependencyResolver) -> Self {
        Self { resolver }
    }

    pub fn run(&self, project_dir: &Path) -> Result<BootstrapOutcome> {
        let Some(rewritten) = manifest::rewrite(&project_dir.join(MANIFEST_FILE))? else {
            info!("{}: no {}, skipping dependencies", project_dir.display(), MANIFEST_FILE);
            return Ok(BootstrapOutcome::Skipped);
        };

        let output_dir = project_dir.join(DEPENDENCY_DIR);
        fs::create_dir_all(&output_dir).map_err(|source| Error::Directory {
            path: output_dir.clone(),
            source,
        })?;

        self.resolver
            .resolve(project_dir, &rewritten.sidecar, &output_dir)?;
        info!(
            "{}: dependencies copied to {}",
            project_dir.display(),
            output_dir.display()
        );

        Ok(BootstrapOutcome::Resolved {
            sidecar: rewritten.sidecar,
            output_dir,
            neutralized: rewritten.neutralized,
        })
    }
}
