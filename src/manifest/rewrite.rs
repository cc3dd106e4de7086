//! Neutralization of the dependency-copy plugin.
//!
//! The resolver is invoked with an explicit output directory. Any
//! `<configuration>` the project already carries for the dependency-copy
//! plugin could override it, either on the plugin itself or per
//! `<execution>`, so both layers are removed. The original manifest is never
//! touched; the result goes to a sidecar file in the same directory.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::{Manifest, PluginSite};
use crate::defaults::{DEPENDENCY_PLUGIN, SIDECAR_MANIFEST_FILE};
use crate::error::Result;

/// Where a configuration block was removed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Plugin,
    Execution(Option<String>),
}

/// One configuration block removed by [`neutralize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neutralized {
    pub site: PluginSite,
    pub profile_id: Option<String>,
    pub scope: Scope,
    /// Keys the removed block carried.
    pub cleared_keys: Vec<String>,
}

impl fmt::Display for Neutralized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.site)?;
        if let Some(id) = &self.profile_id {
            write!(f, " (profile {})", id)?;
        }
        match &self.scope {
            Scope::Plugin => f.write_str(": plugin configuration")?,
            Scope::Execution(Some(id)) => write!(f, ": execution {} configuration", id)?,
            Scope::Execution(None) => f.write_str(": execution configuration")?,
        }
        if !self.cleared_keys.is_empty() {
            write!(f, " [{}]", self.cleared_keys.join(", "))?;
        }
        Ok(())
    }
}

/// Result of rewriting one project's manifest.
#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    /// The sidecar manifest handed to the resolver.
    pub sidecar: PathBuf,
    pub neutralized: Vec<Neutralized>,
}

/// Removes plugin and execution configuration from every declaration of
/// `artifact_id`, across all plugin lists.
///
/// Declarations are matched on `<artifactId>` alone, since Maven fills in
/// `org.apache.maven.plugins` for plugins that omit `<groupId>`.
pub fn neutralize(manifest: &mut Manifest, artifact_id: &str) -> Result<Vec<Neutralized>> {
    let targets: Vec<_> = manifest
        .plugin_declarations()
        .into_iter()
        .filter(|decl| decl.artifact_id.as_deref() == Some(artifact_id))
        .collect();

    let mut removed = Vec::new();
    for decl in &targets {
        if let Some(props) = manifest.remove_plugin_configuration(decl)? {
            removed.push(Neutralized {
                site: decl.site,
                profile_id: decl.profile_id.clone(),
                scope: Scope::Plugin,
                cleared_keys: props.keys().map(str::to_string).collect(),
            });
        }
        for (id, props) in manifest.remove_execution_configurations(decl)? {
            removed.push(Neutralized {
                site: decl.site,
                profile_id: decl.profile_id.clone(),
                scope: Scope::Execution(id),
                cleared_keys: props.keys().map(str::to_string).collect(),
            });
        }
    }
    Ok(removed)
}

/// Rewrites the manifest at `manifest_path` into its sidecar.
///
/// A missing manifest is not an error: the project simply has nothing to
/// bootstrap and `Ok(None)` is returned.
pub fn rewrite(manifest_path: &Path) -> Result<Option<RewriteOutcome>> {
    if !manifest_path.is_file() {
        debug!("No manifest at {}, skipping rewrite", manifest_path.display());
        return Ok(None);
    }

    let mut manifest = Manifest::load(manifest_path)?;
    let neutralized = neutralize(&mut manifest, DEPENDENCY_PLUGIN)?;
    for entry in &neutralized {
        info!("{}: cleared {}", manifest_path.display(), entry);
    }

    let sidecar = manifest_path.with_file_name(SIDECAR_MANIFEST_FILE);
    manifest.write_to(&sidecar).inspect_err(|e| {
        warn!("{}", e);
    })?;

    Ok(Some(RewriteOutcome {
        sidecar,
        neutralized,
    }))
}
