//! Coverage command: API coverage against the cached catalog

use anyhow::Result;

use super::output::Output;
use crate::domain::CoverageReport;
use crate::storage::Project;

pub fn run(output: &Output) -> Result<()> {
    let project = Project::open_current()?;

    let catalog = project.read_api_catalog()?;
    output.verbose_ctx(
        "coverage",
        &format!(
            "Loaded {} functions in {} sections",
            catalog.function_count(),
            catalog.sections.len()
        ),
    );

    let corpus = project.read_corpus()?;
    let report = CoverageReport::compute(&catalog, &corpus)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "sections": report.sections.iter().map(|s| serde_json::json!({
                "name": s.name,
                "total": s.total,
                "covered": s.covered,
                "percent": s.percent(),
                "missing": s.missing,
            })).collect::<Vec<_>>(),
            "total": report.total,
            "covered": report.covered,
            "percent": report.percent(),
        }));
        return Ok(());
    }

    for section in &report.sections {
        if section.is_complete() {
            println!("[INFO] Section \"{}\" ... [OK]", section.name);
            continue;
        }

        println!("[INFO] Section \"{}\" ... [{}%]", section.name, section.percent());
        for (i, miss) in section.missing.iter().enumerate() {
            let prefix = if i == 0 { "Miss: " } else { "      " };
            output.warn(&format!("{}  - {}", prefix, miss));
        }
    }

    println!(
        "[INFO] Total API coverage [{}%] - [{}/{}]",
        report.percent(),
        report.covered,
        report.total
    );

    Ok(())
}
