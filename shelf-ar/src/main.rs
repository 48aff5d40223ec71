//! shelf-ar - author resolution batch runner
//!
//! Scans a library root, pairs each book with its embedded metadata from a
//! JSON manifest, runs the six-pass author pipeline and writes the resolved
//! records as JSON.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use shelf_ar::config::{AppConfig, CONFIG_ENV_VAR, CONFIG_FILE_NAME};
use shelf_ar::metadata::{collect_items, ManifestReader};
use shelf_ar::scanner::LibraryScanner;
use shelf_ar::AuthorPipeline;
use shelf_common::config::{load_toml_config, resolve_config_path};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for shelf-ar
#[derive(Parser, Debug)]
#[command(name = "shelf-ar")]
#[command(about = "Resolve canonical authors for a book collection")]
#[command(version)]
struct Args {
    /// Library root to scan
    #[arg(short, long, env = "SHELF_ROOT")]
    root: PathBuf,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON manifest of embedded metadata, keyed by path relative to the root
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Output file for resolved records (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Run report output file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Book file extensions to include
    #[arg(short, long = "extension", default_value = "fb2")]
    extensions: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR, CONFIG_FILE_NAME);
    let config: AppConfig =
        load_toml_config(config_path.as_deref()).context("Failed to load configuration")?;

    let default_directive = if config.logging.level.contains('=') {
        config.logging.level.clone()
    } else {
        format!("shelf_ar={}", config.logging.level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(config.logging.ansi)
                .with_writer(io::stderr),
        )
        .init();

    info!("Starting shelf-ar {}", env!("CARGO_PKG_VERSION"));
    info!("Library root: {}", args.root.display());

    let scan = LibraryScanner::new()
        .with_extensions(&args.extensions)
        .scan_with_stats(&args.root)
        .with_context(|| format!("Failed to scan {}", args.root.display()))?;
    info!(files = scan.files.len(), errors = scan.errors.len(), "Library scanned");

    let reader = match &args.manifest {
        Some(path) => ManifestReader::load(path).context("Failed to load metadata manifest")?,
        None => ManifestReader::default(),
    };
    let items = collect_items(&scan.files, &reader);

    let pipeline = AuthorPipeline::new(config.resolver).context("Invalid resolver configuration")?;
    let (records, report) = pipeline.run_with_report(items);

    for stats in &report.passes {
        info!("Pass {} ({}): {} changed", stats.pass.number(), stats.pass.as_str(), stats.changed);
    }

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &records).context("Failed to write records")?;
            writer.flush()?;
            info!("Records written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &records).context("Failed to write records")?;
            writeln!(writer)?;
        }
    }

    if let Some(path) = &args.report {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)
            .context("Failed to write run report")?;
    }

    Ok(())
}
