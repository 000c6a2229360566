//! Main CLI application structure

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use anyhow::Result;

use super::output::{Output, OutputFormat};
use super::{coverage_cmd, merge_cmd, order_cmd};
use crate::storage::Project;

#[derive(Parser)]
#[command(name = "amalgam")]
#[command(author, version, about = "Merge libuvcxx headers into a single header")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a project with a default amalgam.toml
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Merge all headers into a single header
    Merge {
        /// Output file (defaults to the configured output)
        output: Option<PathBuf>,
    },

    /// Show the resolved header order
    Order,

    /// Report API coverage against the cached API catalog
    Coverage,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("amalgam starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.success(&format!("Initialized amalgam project at {}", project.root().display()));
        }

        Commands::Merge { output: path } => {
            merge_cmd::run(&output, path.as_deref())?
        }

        Commands::Order => order_cmd::run(&output)?,

        Commands::Coverage => coverage_cmd::run(&output)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
