//! Batch generator CLI.
//!
//! Example:
//!   cargo run -- --count 5 --out-dir output --seed 42
//!   cargo run -- --clear-only

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, warn};

use glyph_batch::core::config::{BatchConfig, DEFAULT_CONFIG_PATH, LOCAL_CONFIG_PATH};
use glyph_batch::{BatchGenerator, OutputDir};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate a batch of weighted-random letter images",
    long_about = None
)]
struct Args {
    /// RON config file. Without it, batch.ron is layered with batch.local.ron.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the number of items.
    #[arg(long)]
    count: Option<usize>,
    /// Override the output directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Seed the random source for a reproducible batch.
    #[arg(long)]
    seed: Option<u64>,
    /// Delete everything inside the output directory before generating.
    #[arg(long)]
    clear: bool,
    /// Delete everything inside the output directory and exit.
    #[arg(long, conflicts_with = "clear")]
    clear_only: bool,
    /// Print the effective config as RON and exit.
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut cfg = load_config(args.config.as_ref())?;
    if let Some(count) = args.count {
        cfg.total = count;
    }
    if let Some(dir) = args.out_dir {
        cfg.output_dir = dir;
    }
    for w in cfg.validate() {
        warn!(target: "config", "{w}");
    }

    if args.print_config {
        let pretty = ron::ser::PrettyConfig::default();
        println!("{}", ron::ser::to_string_pretty(&cfg, pretty)?);
        return Ok(());
    }

    if args.clear_only {
        OutputDir::from_config(&cfg)?.clear()?;
        return Ok(());
    }

    let generator = BatchGenerator::prepare(&cfg, args.clear)?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let report = generator
        .run(&mut rng)
        .context("batch generation aborted")?;
    println!(
        "{} images generated in {:.3} seconds.",
        report.written,
        report.elapsed.as_secs_f64()
    );
    Ok(())
}

fn load_config(explicit: Option<&PathBuf>) -> Result<BatchConfig> {
    if let Some(path) = explicit {
        return BatchConfig::load_from_file(path)
            .with_context(|| format!("load config {}", path.display()));
    }
    let (cfg, used, errors) = BatchConfig::load_layered([DEFAULT_CONFIG_PATH, LOCAL_CONFIG_PATH]);
    for e in &errors {
        warn!(target: "config", "{e}");
    }
    if used.is_empty() {
        info!(target: "config", "no config file found; using built-in defaults");
    } else {
        info!(target: "config", "loaded config from {}", used.join(", "));
    }
    Ok(cfg)
}
