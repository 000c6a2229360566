//! Output file writing
//!
//! The merged header is only written when its content changes, and always
//! through a temporary sibling file that is renamed into place.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Result of [`write_if_changed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was created or replaced
    Written,
    /// The file already had this exact content
    UpToDate,
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes `content` to `path` unless the file already holds exactly that
pub fn write_if_changed(path: &Path, content: &str) -> Result<WriteOutcome> {
    if path.is_file() {
        let existing = fs::read(path)
            .with_context(|| format!("Failed to read existing output: {}", path.display()))?;
        if existing == content.as_bytes() {
            return Ok(WriteOutcome::UpToDate);
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let temp_path = temp_path_for(path);

    if let Err(err) = replace_via_temp(&temp_path, path, content) {
        // Best-effort cleanup of the partial temp file
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    Ok(WriteOutcome::Written)
}

fn replace_via_temp(temp_path: &Path, path: &Path, content: &str) -> Result<()> {
    {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        let mut writer = BufWriter::new(&file);
        writer
            .write_all(content.as_bytes())
            .context("Failed to write merged header")?;
        writer.flush().context("Failed to flush merged header")?;
    }

    // Atomic rename
    fs::rename(temp_path, path).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            temp_path.display(),
            path.display()
        )
    })
}
