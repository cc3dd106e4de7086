//! # Directory Tree Preparation
//!
//! Jobs share ancestors of their working directories (`<root>` and
//! `<root>/<organization>`). [`DirectoryPreparer`] serializes every creation
//! behind one mutex so two jobs never race on the same ancestor.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use log::debug;

use crate::error::{Error, Result};

/// Creates job working directories, one caller at a time.
#[derive(Debug, Default)]
pub struct DirectoryPreparer {
    lock: Mutex<()>,
}

impl DirectoryPreparer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `path` and any missing ancestors. Succeeds if it already exists.
    pub fn prepare(&self, path: &Path) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| Error::LockPoisoned {
            context: "directory preparation".to_string(),
        })?;

        debug!("Preparing directory {}", path.display());
        fs::create_dir_all(path).map_err(|source| Error::Directory {
            path: path.to_path_buf(),
            source,
        })
    }
}
