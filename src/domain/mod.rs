//! Domain models for header amalgamation
//!
//! Contains the parsing, ordering and merging logic without any I/O
//! concerns. Headers are read through the [`HeaderSource`] trait.

mod id;
mod header;
mod parser;
mod resolver;
mod graph;
mod merge;
mod coverage;

#[cfg(test)]
mod testutil;

pub use id::{HeaderId, IdError};
pub use header::{
    ConditionalGroup, HeaderRecord, HeaderSource, InMemoryHeaders, IncludeGuard, LocalInclude,
};
pub use parser::{parse_header, ParseError};
pub use resolver::{DependencyResolver, HeaderCache, OrderedHeaders, ResolveError};
pub use graph::{GraphError, IncludeGraph};
pub use merge::{BodyBlock, MergeError, MergeOptions, MergedDocument, Merger, DEFAULT_SIGNATURE};
pub use coverage::{ApiCatalog, ApiSection, CoverageError, CoverageReport, SectionCoverage};
