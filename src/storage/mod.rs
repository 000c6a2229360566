//! # Storage Layer
//!
//! Everything that touches the filesystem.
//!
//! ## Files
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Config | TOML | `amalgam.toml` |
//! | Headers | C/C++ headers | `<include_root>/<header_prefix>/...` |
//! | License | Text | `LICENSE` |
//! | Merged header | C/C++ header | `include/uvcxx-single.h` |
//! | API catalog | JSON | `scripts/libuv_api.json` |
//!
//! ## Write Safety
//!
//! The merged header is assembled in memory and written with
//! [`write_if_changed`]: unchanged content is never rewritten, and changed
//! content goes through a temp file + rename.
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a project
//! - [`FsHeaderSource`] - Headers under the include root
//! - [`Config`] - Project configuration

mod config;
mod headers;
mod artifact;
mod project;

pub use config::{Config, ConfigError, CoverageConfig, ProjectConfig, CONFIG_FILE};
pub use headers::FsHeaderSource;
pub use artifact::{write_if_changed, WriteOutcome};
pub use project::{Project, ProjectError, Resolution};
