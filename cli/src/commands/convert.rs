use std::path::Path;

use anyhow::{Context, Result};
use genealogy::convert_json;

use crate::output::{GraphReport, Output};

pub fn run(path: &Path, details: bool, out: &Output) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading records {}", path.display()))?;
    let data = convert_json(&json)?;
    out.print(&GraphReport {
        graph: &data.graph,
        details: details.then_some(&data.index),
    })
}
