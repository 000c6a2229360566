//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `init` | Write a default `amalgam.toml` |
//! | `merge [OUTPUT]` | Build the single header, write it if it changed |
//! | `order` | Show the resolved header order and include edges |
//! | `coverage` | Report API coverage against the cached catalog |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for progress output on stderr:
//! ```bash
//! amalgam --verbose merge
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod merge_cmd;
mod order_cmd;
mod coverage_cmd;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
