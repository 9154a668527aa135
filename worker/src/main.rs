use anyhow::Context;
use api::ApiBridge;
use clap::Parser;
use generator::lot::{build_recording, LotConfig};
use jobs::{JobPool, JobStore};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use workflow::{Runner, WorkerConfig};

mod adapters;
mod api;
mod generator;
mod jobs;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Parking occupancy video worker")]
struct Args {
    /// Process a single recorded video and exit
    #[arg(long)]
    input: Option<PathBuf>,
    /// Overlay output for --input (defaults to <results_dir>/<stem>_processed.jsonl)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Load the worker config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Write a synthetic lot recording to this path
    #[arg(long)]
    generate: Option<PathBuf>,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value = "data/results")]
    results_dir: PathBuf,
    #[arg(long, default_value_t = 2)]
    workers: usize,
    /// Serve the job API until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = if let Some(path) = args.workflow.as_ref() {
        WorkerConfig::load(path)?
    } else {
        WorkerConfig::from_args(args.results_dir.clone(), args.workers)
    };

    if let Some(path) = args.generate.as_ref() {
        let lot = LotConfig {
            seed: args.seed,
            ..Default::default()
        };
        let recording = build_recording(&lot)?;
        recording.save(path)?;
        println!(
            "Generated {} frames ({}x{} @ {} fps) -> {}",
            recording.frames.len(),
            recording.width,
            recording.height,
            recording.fps,
            path.display()
        );
    }

    let runner = Arc::new(Runner::new(config.clone()));

    if let Some(input) = args.input.as_ref() {
        let output = args.output.clone().unwrap_or_else(|| {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "video".into());
            config.results_dir.join(format!("{}_processed.jsonl", stem))
        });
        let summary = runner.execute(input, &output)?;
        println!(
            "Processed {} frames -> empty {}, occupied {}, capacity {} ({})",
            summary.frames,
            summary.final_counts.empty,
            summary.final_counts.occupied,
            summary.final_counts.capacity,
            summary.output.display()
        );
    }

    if args.serve {
        let pool = JobPool::new(JobStore::new(), runner);
        let bridge = ApiBridge::new(pool, config.results_dir.clone(), config.uploads_dir());
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating runtime for job API")?;
        runtime.block_on(bridge.serve(config.bind))?;
    }

    Ok(())
}
