//! quarry CLI
//!
//! Transpiles every `*.sql` file under the given folders and prints the result as JSON.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use quarry_gen::{Catalog, Engine, QueryFolder, Transpiler};

/// Turns annotated SQL files into typed query descriptions.
#[derive(Parser, Debug)]
#[command(name = "quarry")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Folders to scan recursively for `*.sql` files.
    #[arg(required = true)]
    folders: Vec<PathBuf>,

    /// JSON schema catalog with the tables the queries use.
    #[arg(short, long, env = "QUARRY_SCHEMA")]
    schema: PathBuf,

    /// Engine the queries are written for: sqlite or mysql.
    #[arg(short, long, env = "QUARRY_ENGINE", default_value = "sqlite")]
    engine: Engine,

    /// Indent the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn transpile(cli: &Cli) -> anyhow::Result<Vec<QueryFolder>> {
    let catalog = Catalog::from_path(&cli.schema)
        .with_context(|| format!("loading schema {}", cli.schema.display()))?;
    debug!(tables = catalog.tables.len(), "schema loaded");
    Ok(Transpiler::new(cli.engine, catalog).parse_folders(&cli.folders)?)
}

fn write_json(out: &mut impl Write, folders: &[QueryFolder], pretty: bool) -> anyhow::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, folders)?;
    } else {
        serde_json::to_writer(&mut *out, folders)?;
    }
    writeln!(out)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let folders = transpile(&cli)?;
    write_json(&mut std::io::stdout().lock(), &folders, cli.pretty)
}
