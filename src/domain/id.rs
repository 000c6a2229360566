//! Header identity
//!
//! A header is identified by its path relative to the include root, e.g.
//! `uvcxx/utils/standard.h`. Paths are normalized lexically: separators
//! become `/`, `.` and empty components are dropped and `..` pops the
//! previous component. A path that climbs above the include root is invalid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Header path is empty")]
    Empty,

    #[error("Header path escapes the include root: '{0}'")]
    EscapesRoot(String),

    #[error("Header path must be relative to the include root: '{0}'")]
    Absolute(String),
}

/// Canonical header identity, relative to the include root
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HeaderId {
    path: String,
}

impl HeaderId {
    /// Creates a header ID from a path relative to the include root
    pub fn new(path: &str) -> Result<Self, IdError> {
        if path.starts_with('/') || path.starts_with('\\') {
            return Err(IdError::Absolute(path.to_string()));
        }

        let mut components: Vec<&str> = Vec::new();
        for component in path.split(['/', '\\']) {
            match component {
                "" | "." => {}
                ".." => {
                    if components.pop().is_none() {
                        return Err(IdError::EscapesRoot(path.to_string()));
                    }
                }
                other => components.push(other),
            }
        }

        if components.is_empty() {
            return Err(IdError::Empty);
        }

        Ok(Self {
            path: components.join("/"),
        })
    }

    /// Returns the normalized path
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Returns the directory holding this header ("" at the include root)
    pub fn dir(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[..idx],
            None => "",
        }
    }

    /// Resolves `reference` relative to this header's directory
    pub fn sibling(&self, reference: &str) -> Result<Self, IdError> {
        let dir = self.dir();
        if dir.is_empty() {
            Self::new(reference)
        } else {
            Self::new(&format!("{}/{}", dir, reference))
        }
    }

    /// Returns the file name component
    pub fn file_name(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[idx + 1..],
            None => &self.path,
        }
    }
}

impl fmt::Display for HeaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl FromStr for HeaderId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim())
    }
}

impl TryFrom<String> for HeaderId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HeaderId> for String {
    fn from(id: HeaderId) -> Self {
        id.path
    }
}
