//! Order command: the resolved header order and include edges

use anyhow::{ensure, Result};

use super::output::Output;
use crate::domain::{HeaderId, IncludeGraph};
use crate::storage::Project;

fn join(ids: &[HeaderId]) -> String {
    ids.iter().map(HeaderId::as_str).collect::<Vec<_>>().join(", ")
}

pub fn run(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let resolution = project.resolve()?;
    let graph = IncludeGraph::from_headers(&resolution.headers)?;

    ensure!(
        graph.respects(resolution.headers.ids()),
        "Resolved order does not follow the include graph"
    );
    output.verbose_ctx(
        "order",
        &format!("{} headers, {} include edges", graph.len(), graph.edge_count()),
    );

    if output.is_json() {
        let items: Vec<_> = resolution
            .headers
            .ids()
            .enumerate()
            .map(|(position, id)| {
                serde_json::json!({
                    "position": position + 1,
                    "header": id,
                    "includes": graph.dependencies(id),
                    "included_by": graph.dependents(id),
                })
            })
            .collect();
        output.data(&items);
        return Ok(());
    }

    let width = resolution.headers.len().to_string().len();
    for (position, id) in resolution.headers.ids().enumerate() {
        println!("{:>width$}. {}", position + 1, id, width = width);

        let includes = graph.dependencies(id);
        if !includes.is_empty() {
            println!("{:>width$}  includes: {}", "", join(&includes), width = width);
        }
    }

    println!();
    println!(
        "{} header(s), {} include edge(s)",
        graph.len(),
        graph.edge_count()
    );

    Ok(())
}
