//! Default values for pinfetch configuration.
//!
//! This module provides centralized default values used across the library
//! and the CLI, ensuring consistency and avoiding duplication.

/// Destination root used when neither the CLI nor a config file names one.
pub const DESTINATION_DIR: &str = "downloaded-sources";

/// Name under which each job registers its origin.
pub const REMOTE_NAME: &str = "origin";

/// The project manifest looked up at the root of every checkout.
pub const MANIFEST_FILE: &str = "pom.xml";

/// Rewritten manifest, written next to the original.
pub const SIDECAR_MANIFEST_FILE: &str = ".pinfetch-pom.xml";

/// Directory (relative to the checkout) the resolver copies dependencies into.
pub const DEPENDENCY_DIR: &str = ".pinfetch-deps";

/// Artifact id of the plugin whose configuration is neutralized.
pub const DEPENDENCY_PLUGIN: &str = "maven-dependency-plugin";

/// Returns the dependency resolver command for the current platform.
pub fn resolver_command() -> &'static str {
    if cfg!(windows) {
        "mvn.cmd"
    } else {
        "mvn"
    }
}
