//! Rehearse - practice-mix renderer
//!
//! Renders one solo-emphasis mix per input track plus a balanced mix of
//! everything, from a local directory of recorded tracks. This is the
//! local front end to the same pipeline the worker runtime executes per
//! upload.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;

use rehearse_core::bundle;
use rehearse_core::engine::WavMixEngine;
use rehearse_core::orchestrator::{MixOrchestrator, MixProgress};
use rehearse_core::plan::generate_plan;
use rehearse_core::renderer::MixRenderer;
use rehearse_core::run::scan_assets;
use rehearse_core::RunConfig;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "rehearse")]
#[command(about = "Render practice mixes from a directory of recorded tracks")]
#[command(version)]
struct Args {
    /// Directory containing the input tracks
    #[arg(default_value = "raw_tracks")]
    input_dir: PathBuf,

    /// Directory the rendered mixes are written to
    #[arg(short, long, default_value = "practice_mixes")]
    output_dir: PathBuf,

    /// Optional YAML config file; flags below override its values
    #[arg(short, long, env = "REHEARSE_CONFIG")]
    config: Option<PathBuf>,

    /// Gain in dB applied to non-main tracks in solo-emphasis mixes
    #[arg(short, long)]
    attenuation: Option<f32>,

    /// Number of render workers (0 = host core count)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Input file extension to pick up
    #[arg(short, long)]
    extension: Option<String>,

    /// Also pack the mixes into <output_dir>.zip
    #[arg(long)]
    bundle: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run(Args::parse()) {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => RunConfig::load(path),
        None => RunConfig::default(),
    };
    if let Some(db) = args.attenuation {
        config.attenuation_db = db;
    }
    if let Some(jobs) = args.jobs {
        config.concurrency = jobs;
    }
    if let Some(ext) = args.extension {
        config.extension = ext;
    }

    let assets = scan_assets(&args.input_dir, &config.extension)
        .with_context(|| format!("failed to scan {}", args.input_dir.display()))?;
    if assets.is_empty() {
        bail!(
            "no .{} files found in {}",
            config.extension,
            args.input_dir.display()
        );
    }
    println!(
        "Found {} tracks: {}",
        assets.len(),
        assets
            .iter()
            .map(|a| a.id())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let plan = generate_plan(&assets)?;
    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("failed to create {}", args.output_dir.display()))?;

    let orchestrator = MixOrchestrator::new(config.concurrency);
    let renderer = Arc::new(MixRenderer::new(Arc::new(WavMixEngine::new())));
    let rx = orchestrator.start(plan, renderer, config.attenuation_db, &args.output_dir);

    let mut outputs = None;
    for msg in rx {
        println!("{}", msg.description());
        match msg {
            MixProgress::Completed { outputs: rendered } => {
                outputs = Some(rendered);
                break;
            }
            MixProgress::Failed { reason } => bail!("mix run failed: {}", reason),
            MixProgress::Cancelled => bail!("mix run cancelled"),
            _ => {}
        }
    }
    let outputs = outputs.context("mix pool ended without a result")?;

    if args.bundle {
        let zip_path = args.output_dir.with_extension("zip");
        bundle::pack(&outputs, &zip_path)?;
        println!("Bundled mixes into {}", zip_path.display());
    }

    println!(
        "Done: {} mixes in {}",
        outputs.len(),
        args.output_dir.display()
    );
    Ok(())
}
