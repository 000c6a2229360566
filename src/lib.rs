//! amalgam - single-header tooling for libuvcxx
//!
//! Merges the libuvcxx headers into one self-contained header. Each header
//! is split into system includes, local includes, conditional includes and
//! body; local includes define the order in which bodies are emitted. A
//! second tool reports which documented libuv functions the headers mention.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{HeaderId, HeaderRecord, MergedDocument, Merger, OrderedHeaders};
