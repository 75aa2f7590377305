mod backend;

use anyhow::{Context, Result};
use backend::{HighGuiDisplay, OpenCvCamera};
use clap::Parser;
use pptracker::pipeline::{CALIBRATE_ARG, PipelineConfig, RunMode, TrackingPipeline};

const CAMERA_INDEX: i32 = 0;

#[derive(Parser, Debug)]
#[command(name = "pptracker", version, about = "Track a colored object in a live camera feed")]
struct Args {
    /// Pass `calibrate` to show the thresholded mask and print the bounds every frame.
    #[arg(value_name = "MODE")]
    mode: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // --- 1. Argument Parsing ---
    let args = Args::parse();
    let mode = RunMode::from_arg(args.mode.as_deref());
    if mode == RunMode::Calibration {
        log::info!("calibration mode: showing the mask, printing bounds");
    } else if let Some(other) = args.mode.as_deref() {
        log::debug!("ignoring mode {other:?}; only {CALIBRATE_ARG:?} is recognised");
    }

    // --- 2. Pipeline Initialization ---
    let config = PipelineConfig {
        mode,
        ..PipelineConfig::default()
    };
    let config_path = config.config_path.clone();
    let camera = OpenCvCamera::open(CAMERA_INDEX).context("camera is required")?;
    let pipeline = TrackingPipeline::new(camera, HighGuiDisplay, config)
        .with_context(|| format!("could not start with config {}", config_path.display()))?;

    // --- 3. Main Processing Loop ---
    println!("Press ESC to quit");
    let bounds = pipeline.run()?;
    log::info!("exiting with {bounds}");
    Ok(())
}
