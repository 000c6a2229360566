//! Dependency resolution
//!
//! Walks local includes depth-first from a list of root headers and records
//! every header after everything it includes. The walk uses an explicit
//! stack: a header is "in progress" while it sits on the stack, and meeting
//! an in-progress header again means the includes form a cycle.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::Arc;

use thiserror::Error;

use super::header::{HeaderRecord, HeaderSource};
use super::id::HeaderId;
use super::parser::{parse_header, ParseError};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Include cycle detected: {}", format_cycle(.path))]
    Cycle { path: Vec<HeaderId> },

    #[error("Failed to read header {header}")]
    Read {
        header: HeaderId,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

fn format_cycle(path: &[HeaderId]) -> String {
    path.iter()
        .map(HeaderId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Headers keyed by identity, in topological order
#[derive(Debug, Clone, Default)]
pub struct OrderedHeaders {
    records: Vec<Arc<HeaderRecord>>,
    index: HashMap<HeaderId, usize>,
}

impl OrderedHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header; a header already present is left where it is
    pub fn push(&mut self, record: Arc<HeaderRecord>) {
        if self.index.contains_key(&record.id) {
            return;
        }
        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(record);
    }

    pub fn get(&self, id: &HeaderId) -> Option<&HeaderRecord> {
        self.index.get(id).map(|&idx| self.records[idx].as_ref())
    }

    pub fn contains(&self, id: &HeaderId) -> bool {
        self.index.contains_key(id)
    }

    /// Position of a header in the order
    pub fn position(&self, id: &HeaderId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderRecord> {
        self.records.iter().map(Arc::as_ref)
    }

    pub fn ids(&self) -> impl Iterator<Item = &HeaderId> {
        self.records.iter().map(|record| &record.id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parsed headers for one resolution run
#[derive(Debug, Default)]
pub struct HeaderCache {
    records: HashMap<HeaderId, Arc<HeaderRecord>>,
    parses: usize,
}

impl HeaderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached record, reading and parsing the header on first use
    pub fn get_or_parse(
        &mut self,
        id: &HeaderId,
        source: &impl HeaderSource,
    ) -> Result<Arc<HeaderRecord>, ResolveError> {
        if let Some(record) = self.records.get(id) {
            return Ok(Arc::clone(record));
        }

        let text = source.read(id).map_err(|source| ResolveError::Read {
            header: id.clone(),
            source,
        })?;
        let record = Arc::new(parse_header(id, &text, source)?);
        self.parses += 1;
        self.records.insert(id.clone(), Arc::clone(&record));
        Ok(record)
    }

    /// Number of headers parsed so far
    pub fn parses(&self) -> usize {
        self.parses
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A header on the walk stack and the index of its next include
struct Frame {
    record: Arc<HeaderRecord>,
    next: usize,
}

/// Orders headers so that each follows everything it includes
pub struct DependencyResolver<'a, S: HeaderSource> {
    source: &'a S,
    cache: HeaderCache,
}

impl<'a, S: HeaderSource> DependencyResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            cache: HeaderCache::new(),
        }
    }

    /// The resolver's parse cache
    pub fn cache(&self) -> &HeaderCache {
        &self.cache
    }

    /// Resolves `roots` and everything they include, in topological order
    pub fn resolve<'r>(
        &mut self,
        roots: impl IntoIterator<Item = &'r HeaderId>,
    ) -> Result<OrderedHeaders, ResolveError> {
        let mut ordered = OrderedHeaders::new();
        let mut in_progress: HashSet<HeaderId> = HashSet::new();
        let mut stack: Vec<Frame> = Vec::new();

        for root in roots {
            if ordered.contains(root) {
                continue;
            }

            let record = self.cache.get_or_parse(root, self.source)?;
            in_progress.insert(root.clone());
            stack.push(Frame { record, next: 0 });

            while let Some(frame) = stack.last_mut() {
                let Some(include) = frame.record.local_includes.get(frame.next) else {
                    // All includes recorded, the header itself comes next
                    let done = stack.pop().map(|frame| frame.record);
                    if let Some(record) = done {
                        in_progress.remove(&record.id);
                        ordered.push(record);
                    }
                    continue;
                };
                frame.next += 1;
                let target = include.target.clone();

                if ordered.contains(&target) {
                    continue;
                }
                if in_progress.contains(&target) {
                    return Err(ResolveError::Cycle {
                        path: cycle_path(&stack, &target),
                    });
                }

                let record = self.cache.get_or_parse(&target, self.source)?;
                in_progress.insert(target);
                stack.push(Frame { record, next: 0 });
            }
        }

        Ok(ordered)
    }
}

/// The stack slice from the first visit of `repeated`, closed with it again
fn cycle_path(stack: &[Frame], repeated: &HeaderId) -> Vec<HeaderId> {
    let start = stack
        .iter()
        .position(|frame| &frame.record.id == repeated)
        .unwrap_or(0);
    let mut path: Vec<HeaderId> = stack[start..]
        .iter()
        .map(|frame| frame.record.id.clone())
        .collect();
    path.push(repeated.clone());
    path
}
