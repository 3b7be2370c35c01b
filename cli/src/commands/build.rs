use std::path::Path;

use anyhow::{Context, Result};
use genealogy::{BuilderConfig, CachedRepository, GraphBuilder, MemoryCache, StaticRepository};
use tracing::info;

use crate::output::{GraphReport, Output};

pub async fn run(
    dump: &Path,
    root: Option<&str>,
    details: bool,
    config: BuilderConfig,
    out: &Output,
) -> Result<()> {
    let json = std::fs::read_to_string(dump)
        .with_context(|| format!("reading person dump {}", dump.display()))?;
    let repository = StaticRepository::from_json(&json)?;
    info!(people = repository.len(), "Loaded person dump");

    let repository = CachedRepository::new(repository, MemoryCache::new());
    let builder = GraphBuilder::with_config(repository, config);
    let loaded = builder.load(root).await?;

    out.print(&GraphReport {
        graph: &loaded.graph,
        details: details.then_some(&loaded.details),
    })
}
