//! Kinfold command line
//!
//! Builds, normalizes and inspects family graphs. JSON goes to stdout and
//! logs to stderr.

mod commands;
mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use genealogy::{BuilderConfig, GenealogyError};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use output::Output;

#[derive(Parser, Debug)]
#[command(name = "kinfold", version, about = "Family graph builder")]
struct Cli {
    #[arg(long, global = true, help = "Builder configuration file (JSON)")]
    config: Option<PathBuf>,
    #[arg(short, long, global = true, help = "Log debug output to stderr")]
    verbose: bool,
    #[arg(long, global = true, help = "Pretty-print JSON output")]
    pretty: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the graph around one profile of a person dump
    Build {
        dump: PathBuf,
        #[arg(long)]
        root: Option<String>,
        #[arg(long, default_value_t = false, help = "Include detail-panel records")]
        details: bool,
    },
    /// Put children and spouse families of a graph in canonical order
    Normalize { graph: PathBuf },
    /// Describe the age between two wire-format dates
    Age { birth: String, death: String },
    /// Convert parsed GEDCOM records into a graph
    Convert {
        entries: PathBuf,
        #[arg(long, default_value_t = false, help = "Include the record index")]
        details: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let result = run(cli).await;
    if let Err(err) = &result {
        if let Some(e) = err.downcast_ref::<GenealogyError>() {
            error!(code = e.code(), args = ?e.args(), "{e}");
        }
    }
    result
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let out = Output::new(cli.pretty);

    match cli.command {
        Commands::Build {
            dump,
            root,
            details,
        } => commands::build::run(&dump, root.as_deref(), details, config, &out).await,
        Commands::Normalize { graph } => commands::normalize::run(&graph, &out),
        Commands::Age { birth, death } => commands::age::run(&birth, &death, &out),
        Commands::Convert { entries, details } => commands::convert::run(&entries, details, &out),
    }
}

fn load_config(path: Option<&Path>) -> Result<BuilderConfig> {
    let Some(path) = path else {
        return Ok(BuilderConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    Ok(BuilderConfig::from_json(&json)?)
}
