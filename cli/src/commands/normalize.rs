use std::path::Path;

use anyhow::{Context, Result};
use genealogy::{normalize, FamilyGraph};
use tracing::warn;

use crate::output::{GraphReport, Output};

pub fn run(path: &Path, out: &Output) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading graph {}", path.display()))?;
    let graph: FamilyGraph = serde_json::from_str(&json)
        .with_context(|| format!("parsing graph {}", path.display()))?;

    for violation in graph.integrity_violations() {
        warn!(%violation, "Graph integrity");
    }

    let normalized = normalize(&graph);
    out.print(&GraphReport {
        graph: &normalized,
        details: None,
    })
}
