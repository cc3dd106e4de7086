//! # Run Configuration
//!
//! Every knob of a run lives in one immutable [`RunConfig`], built once at
//! startup and handed to the [`crate::orchestrator::Orchestrator`]. Nothing
//! reads global state after that point.
//!
//! Values come from three layers, highest precedence first:
//!
//! 1. command-line flags
//! 2. an optional YAML file (`--config` / `PINFETCH_CONFIG`)
//! 3. the built-in defaults in [`crate::defaults`]
//!
//! ## File format
//!
//! ```yaml
//! destination: mirror
//! with-dependencies: true
//! strict: false
//! jobs: 8
//! revision-suffix: false
//! resolver-command: ./mvnw
//! ```
//!
//! Every key is optional. Unknown keys are rejected so typos do not silently
//! fall back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};

/// Contents of a configuration file. `None` means "not set at this layer".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub destination: Option<PathBuf>,
    #[serde(default)]
    pub with_dependencies: Option<bool>,
    #[serde(default)]
    pub strict: Option<bool>,
    #[serde(default)]
    pub jobs: Option<usize>,
    #[serde(default)]
    pub revision_suffix: Option<bool>,
    #[serde(default)]
    pub resolver_command: Option<String>,
}

/// Parse a configuration file from YAML text.
///
/// An empty document is a valid, empty configuration.
pub fn parse(yaml: &str) -> Result<FileConfig> {
    if yaml.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    let config: FileConfig = serde_yaml::from_str(yaml)?;
    if config.jobs == Some(0) {
        return Err(Error::Config {
            message: "jobs must be at least 1".to_string(),
        });
    }
    Ok(config)
}

/// Read and parse the configuration file at `path`.
pub fn from_file(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("cannot read {}: {}", path.display(), e),
    })?;
    parse(&content)
}

/// The resolved configuration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Root under which every `<organization>/<repository>` tree is created.
    pub destination: PathBuf,
    /// Run dependency bootstrap after each successful acquisition.
    pub with_dependencies: bool,
    /// Fail the run if any acquisition failed.
    pub strict: bool,
    /// Worker cap. `None` runs one worker per source.
    pub jobs: Option<usize>,
    /// Append `-<revision>` to each working directory name.
    pub revision_suffix: bool,
    /// Executable used for dependency resolution.
    pub resolver_command: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            destination: PathBuf::from(defaults::DESTINATION_DIR),
            with_dependencies: false,
            strict: false,
            jobs: None,
            revision_suffix: false,
            resolver_command: defaults::resolver_command().to_string(),
        }
    }
}

impl RunConfig {
    /// Defaults overlaid with the values set in `file`.
    pub fn from_file_config(file: &FileConfig) -> Self {
        let base = Self::default();
        Self {
            destination: file.destination.clone().unwrap_or(base.destination),
            with_dependencies: file.with_dependencies.unwrap_or(base.with_dependencies),
            strict: file.strict.unwrap_or(base.strict),
            jobs: file.jobs.or(base.jobs),
            revision_suffix: file.revision_suffix.unwrap_or(base.revision_suffix),
            resolver_command: file
                .resolver_command
                .clone()
                .unwrap_or(base.resolver_command),
        }
    }

    /// Overlays `overrides` (typically from the command line) onto `self`.
    pub fn merged(self, overrides: &FileConfig) -> Self {
        Self {
            destination: overrides.destination.clone().unwrap_or(self.destination),
            with_dependencies: overrides
                .with_dependencies
                .unwrap_or(self.with_dependencies),
            strict: overrides.strict.unwrap_or(self.strict),
            jobs: overrides.jobs.or(self.jobs),
            revision_suffix: overrides.revision_suffix.unwrap_or(self.revision_suffix),
            resolver_command: overrides
                .resolver_command
                .clone()
                .unwrap_or(self.resolver_command),
        }
    }
}
