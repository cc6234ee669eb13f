use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use landscape::Landscape;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod preview;

#[derive(Parser, Debug)]
#[command(name = "landscape")]
#[command(about = "Generate a procedural landscape with trees and write a top-down preview")]
struct Args {
    /// RON parameter file; defaults are used when it does not exist
    #[arg(short, long, default_value = "landscape.ron")]
    config: PathBuf,

    /// Seed for tree placement, overrides the parameter file
    #[arg(short, long)]
    seed: Option<u64>,

    /// Preview image path
    #[arg(short, long, default_value = "landscape.png")]
    output: PathBuf,

    /// Number of trees, overrides the parameter file
    #[arg(short, long)]
    trees: Option<usize>,

    /// Write the effective parameters to this file before generating
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn init_logging() {
    // info by default, overridable via RUST_LOG
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let mut params = config::load_or_default(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(seed) = args.seed {
        params.seed = Some(seed);
    }
    if let Some(trees) = args.trees {
        params.trees.tree_count = trees;
    }
    if let Some(path) = &args.write_config {
        config::save(&params, path).with_context(|| format!("writing {}", path.display()))?;
    }

    let start = Instant::now();
    let landscape = Landscape::new(params).context("generating landscape")?;
    let artifacts = landscape.artifacts();
    info!(
        terrain_vertices = artifacts.terrain.vertices.len(),
        terrain_triangles = artifacts.terrain.triangle_count(),
        trees = artifacts.trees.len(),
        tree_vertices = artifacts.tree_vertex_count(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "generation finished"
    );

    let img = preview::render(artifacts).context("preview buffer does not match the grid")?;
    img.save(&args.output)
        .with_context(|| format!("saving {}", args.output.display()))?;
    info!(path = %args.output.display(), "saved preview");
    Ok(())
}
