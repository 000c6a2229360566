//! Filesystem header source
//!
//! Maps [`HeaderId`]s to files under the include root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::{HeaderId, HeaderSource};

/// Headers read from a directory tree
#[derive(Debug, Clone)]
pub struct FsHeaderSource {
    include_root: PathBuf,
}

impl FsHeaderSource {
    pub fn new(include_root: impl Into<PathBuf>) -> Self {
        Self {
            include_root: include_root.into(),
        }
    }

    pub fn include_root(&self) -> &Path {
        &self.include_root
    }

    /// Filesystem path of a header
    pub fn path_of(&self, id: &HeaderId) -> PathBuf {
        id.as_str()
            .split('/')
            .fold(self.include_root.clone(), |path, component| path.join(component))
    }
}

impl HeaderSource for FsHeaderSource {
    fn contains(&self, id: &HeaderId) -> bool {
        self.path_of(id).is_file()
    }

    fn read(&self, id: &HeaderId) -> io::Result<String> {
        fs::read_to_string(self.path_of(id))
    }
}
