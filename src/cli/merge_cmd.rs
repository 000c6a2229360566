//! Merge command

use std::path::Path;

use anyhow::Result;

use super::output::Output;
use crate::storage::{write_if_changed, Project, WriteOutcome};

/// Resolves, merges and writes the single header
pub fn run(output: &Output, explicit: Option<&Path>) -> Result<()> {
    let project = Project::open_current()?;
    output.verbose_ctx("merge", &format!("Project root: {}", project.root().display()));

    let resolution = project.resolve()?;
    output.verbose_ctx(
        "merge",
        &format!(
            "Resolved {} headers from {} roots ({} parsed)",
            resolution.headers.len(),
            resolution.roots.len(),
            resolution.parses
        ),
    );
    if output.is_verbose() {
        for id in resolution.headers.ids() {
            output.verbose_ctx("merge", &format!("  {}", id));
        }
    }

    let text = project.merge(&resolution)?.render();
    let path = project.output_path(explicit);
    let outcome = write_if_changed(&path, &text)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "path": path.display().to_string(),
            "written": outcome == WriteOutcome::Written,
            "headers": resolution.headers.len(),
            "bytes": text.len(),
        }));
        return Ok(());
    }

    match outcome {
        WriteOutcome::Written => output.success(&format!(
            "The merged header file has been written to \"{}\".",
            path.display()
        )),
        WriteOutcome::UpToDate => output.success(&format!(
            "The header \"{}\" is already up-to-date and will not be modified.",
            path.display()
        )),
    }

    Ok(())
}
