//! # Pinfetch Library
//!
//! This library acquires many git repositories, each pinned to an exact
//! revision, into one local directory tree and can optionally bootstrap each
//! project's Maven dependencies next to it. It is used by the `pinfetch`
//! command-line tool but can be embedded in other tooling that needs
//! reproducible snapshots of many repositories.
//!
//! ## Quick Example
//!
//! ```
//! use pinfetch::source;
//!
//! let sources = source::parse_list(
//!     "git@github.com:go-git/go-git.git ef33fff761a2fabb7f0daf0c1779d2dfac1056da\n\
//!      \n\
//!      git@github.com:go-git/go-billy.git b7915672824f201cb49dc8305454faf5ab946ac3\n",
//! )
//! .unwrap();
//!
//! assert_eq!(sources.len(), 2);
//! assert_eq!(sources[0].organization(), "go-git");
//! assert_eq!(sources[1].repository(), "go-billy");
//! ```
//!
//! ## Core Concepts
//!
//! - **Sources (`source`)**: `<origin> <revision>` descriptors and the input
//!   list they are read from.
//! - **Acquisition (`acquisition`, `repository`, `git`)**: the pinned-revision
//!   protocol, a small state machine that shallow-fetches an arbitrary commit
//!   and checks it out, behind a mockable git backend.
//! - **Manifests (`manifest`, `dependency`)**: a `pom.xml` model, the rewriter
//!   that neutralizes the dependency-copy plugin, and the external resolver
//!   invocation.
//! - **Orchestration (`orchestrator`, `filesystem`, `config`)**: the
//!   concurrent fan-out over all sources under one immutable run
//!   configuration, with a strict or lenient failure policy.
//!
//! ## Execution Flow
//!
//! For every source, concurrently:
//!
//! 1.  **Prepare** `<root>/<organization>/<repository>`.
//! 2.  **Acquire** the pinned revision into it.
//! 3.  **Bootstrap dependencies** (optional): rewrite `pom.xml` into a sidecar
//!     and run the resolver against it.
//!
//! Once every job has finished, the batch either succeeds or, in strict mode
//! with at least one failed acquisition, fails with an aggregate error.

pub mod acquisition;
pub mod config;
pub mod defaults;
pub mod dependency;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod repository;
pub mod source;

#[cfg(test)]
mod source_proptest;
