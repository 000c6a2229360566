//! Parsed header model
//!
//! A [`HeaderRecord`] splits one header file into its include guard and
//! four ordered zones:
//!
//! | Zone | Content |
//! |------|---------|
//! | 1 | system includes (`#include <...>`) |
//! | 2 | local includes (`#include "..."`), resolved to [`HeaderId`]s |
//! | 3 | conditional include groups (`#if` / `#include` / `#endif`) |
//! | 4 | body code |

use std::collections::BTreeMap;
use std::io;

use super::id::HeaderId;

/// Access to the set of headers under the include root
///
/// The parser only asks whether a header exists; the resolver reads text.
pub trait HeaderSource {
    /// Returns true if a header with this identity exists
    fn contains(&self, id: &HeaderId) -> bool;

    /// Reads the full text of a header
    fn read(&self, id: &HeaderId) -> io::Result<String>;
}

/// The include guard lines stripped from a header
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IncludeGuard {
    /// Lines up to and including the guard `#define`
    pub prelude: Vec<String>,

    /// Guard macro name taken from the `#define` line
    pub macro_name: String,

    /// The closing `#endif` line and any blank lines after it
    pub trailer: Vec<String>,
}

/// A quoted include in zone 2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalInclude {
    /// The include line as written
    pub line: String,

    /// The header it resolves to
    pub target: HeaderId,
}

/// One `#if ... #endif` group of zone 3
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalGroup {
    /// Blank lines preceding the opening condition
    pub leading_blanks: usize,

    /// The opening `#if`/`#ifdef`/`#ifndef` line
    pub open: String,

    /// Lines between the condition and `#endif` (includes and blanks)
    pub lines: Vec<String>,

    /// The closing `#endif` line
    pub close: String,
}

impl ConditionalGroup {
    /// Returns true if the group has no non-blank interior line
    pub fn is_dead(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }

    /// Lines of the group in source order, excluding leading padding
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.lines.len() + 2);
        lines.push(self.open.clone());
        lines.extend(self.lines.iter().cloned());
        lines.push(self.close.clone());
        lines
    }
}

/// One header decomposed into guard and zones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRecord {
    pub id: HeaderId,
    pub guard: IncludeGuard,

    /// Zone 1, trimmed, blank lines dropped
    pub system_includes: Vec<String>,

    /// Zone 2, blank lines dropped
    pub local_includes: Vec<LocalInclude>,

    /// Zone 3
    pub conditional_groups: Vec<ConditionalGroup>,

    /// Zone 4, leading and trailing blank runs trimmed
    pub body: Vec<String>,
}

impl HeaderRecord {
    /// Identities of the headers this one includes, in include order
    pub fn dependencies(&self) -> impl Iterator<Item = &HeaderId> {
        self.local_includes.iter().map(|inc| &inc.target)
    }

    /// Reassembles the header from guard and zones
    ///
    /// Blank lines dropped from zones 1, 2 and the body edges are not
    /// restored, so the result matches the source up to blank lines.
    pub fn reassemble(&self) -> String {
        let mut lines: Vec<&str> = Vec::new();
        lines.extend(self.guard.prelude.iter().map(String::as_str));
        lines.extend(self.system_includes.iter().map(String::as_str));
        lines.extend(self.local_includes.iter().map(|inc| inc.line.as_str()));
        for group in &self.conditional_groups {
            lines.extend(std::iter::repeat("").take(group.leading_blanks));
            lines.push(&group.open);
            lines.extend(group.lines.iter().map(String::as_str));
            lines.push(&group.close);
        }
        lines.extend(self.body.iter().map(String::as_str));
        lines.extend(self.guard.trailer.iter().map(String::as_str));

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}

/// In-memory header set, keyed by identity
#[derive(Debug, Clone, Default)]
pub struct InMemoryHeaders {
    files: BTreeMap<HeaderId, String>,
}

impl InMemoryHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a header
    pub fn insert(&mut self, id: HeaderId, text: impl Into<String>) {
        self.files.insert(id, text.into());
    }

    /// Builder-style insert
    pub fn with(mut self, id: HeaderId, text: impl Into<String>) -> Self {
        self.insert(id, text);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl HeaderSource for InMemoryHeaders {
    fn contains(&self, id: &HeaderId) -> bool {
        self.files.contains_key(id)
    }

    fn read(&self, id: &HeaderId) -> io::Result<String> {
        self.files.get(id).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such header: {}", id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(lines: &[&str]) -> ConditionalGroup {
        ConditionalGroup {
            leading_blanks: 0,
            open: "#if UV_VERSION_HEX >= 0x012c00".to_string(),
            lines: lines.iter().map(|s| s.to_string()).collect(),
            close: "#endif".to_string(),
        }
    }

    #[test]
    fn dead_group_detection() {
        assert!(group(&[]).is_dead());
        assert!(group(&["", "   "]).is_dead());
        assert!(!group(&["", "#include <tuple>"]).is_dead());
    }

    #[test]
    fn group_lines_in_order() {
        let g = group(&["#include <tuple>"]);
        assert_eq!(
            g.to_lines(),
            vec!["#if UV_VERSION_HEX >= 0x012c00", "#include <tuple>", "#endif"]
        );
    }

    #[test]
    fn in_memory_source_reads_and_reports_missing() {
        let id = HeaderId::new("a/b.h").unwrap();
        let headers = InMemoryHeaders::new().with(id.clone(), "int b();\n");
        assert!(headers.contains(&id));
        assert_eq!(headers.read(&id).unwrap(), "int b();\n");

        let missing = HeaderId::new("a/c.h").unwrap();
        assert!(!headers.contains(&missing));
        assert_eq!(
            headers.read(&missing).unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }
}
