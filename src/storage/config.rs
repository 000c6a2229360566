//! Configuration handling for amalgam
//!
//! Configuration is stored in `amalgam.toml` at the project root. Every key
//! is optional; the defaults describe the libuvcxx source layout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the project configuration file
pub const CONFIG_FILE: &str = "amalgam.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Configuration for the API coverage audit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CoverageConfig {
    /// Cached API catalog (JSON), relative to the project root
    pub api_cache: PathBuf,

    /// Directory whose headers form the searched corpus
    pub corpus_dir: PathBuf,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            api_cache: PathBuf::from("scripts/libuv_api.json"),
            corpus_dir: PathBuf::from("include/uvcxx"),
        }
    }
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Root that header identities are relative to
    pub include_root: PathBuf,

    /// License file commented into the merged header
    pub license: PathBuf,

    /// Default merged header path, relative to the project root
    pub output: PathBuf,

    /// Guard macro of the merged header
    pub guard_macro: String,

    /// Umbrella include of the wrapped library, re-inserted once ("" disables)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub umbrella_include: Option<String>,

    /// Version compatibility header, placed ahead of other bodies ("" disables)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_header: Option<String>,

    /// Header always listed first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_header: Option<String>,

    /// Directory under the include root holding the headers
    pub header_prefix: String,

    /// Subdirectories of the prefix, visited in order ("" is the prefix itself)
    pub header_dirs: Vec<String>,

    /// Extension of header files, matched case-insensitively
    pub header_extension: String,

    /// Signature banner override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// Coverage audit settings
    pub coverage: CoverageConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            include_root: PathBuf::from("include"),
            license: PathBuf::from("LICENSE"),
            output: PathBuf::from("include/uvcxx-single.h"),
            guard_macro: "UVCXX_H".to_string(),
            umbrella_include: Some("uv.h".to_string()),
            version_header: Some("uvcxx/cxx/version.h".to_string()),
            first_header: Some("uvcxx/utils/standard.h".to_string()),
            header_prefix: "uvcxx".to_string(),
            header_dirs: vec![
                "utils".to_string(),
                "cxx".to_string(),
                "inner".to_string(),
                String::new(),
            ],
            header_extension: "h".to_string(),
            signature: None,
            coverage: CoverageConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Checks values that would make a merge meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.guard_macro.trim().is_empty() {
            return Err(ConfigError::Invalid("guard_macro must not be empty".to_string()));
        }
        if self
            .guard_macro
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || c == '_'))
        {
            return Err(ConfigError::Invalid(format!(
                "guard_macro '{}' is not a valid macro name",
                self.guard_macro
            )));
        }
        if self.header_extension.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "header_extension must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loaded configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub project_root: PathBuf,
}

impl Config {
    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            project_root: project_root.to_path_buf(),
        })
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;

        config.validate().context("Invalid project config")?;
        Ok(config)
    }

    /// Finds the project root by looking for `amalgam.toml`
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    /// Finds the project root at or above `start`
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(CONFIG_FILE).is_file() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }
}
