//! rivet2d demo entry point.
//!
//! Runs the Pong demo headless for a fixed number of frames: both paddles
//! are AI-driven and the match ends early once a side reaches the winning
//! score.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run --release -- --frames 1200 --seed 42 --snapshot
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};

use rivet2d::error::EngineResult;
use rivet2d::game;
use rivet2d::resources::gameconfig::GameConfig;
use rivet2d::resources::renderer::HeadlessRenderer;
use rivet2d::scene::Scene;

/// rivet2d headless demo
#[derive(Parser)]
#[command(version, about = "Runs the rivet2d Pong demo without a window.")]
struct Cli {
    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Frames to run (overrides [loop] max_frames).
    #[arg(long)]
    frames: Option<u64>,

    /// Simulated frames per second (overrides [loop] target_fps).
    #[arg(long)]
    fps: Option<u32>,

    /// Seed for the ball's serve direction.
    #[arg(long)]
    seed: Option<u64>,

    /// Print a JSON snapshot of the world before unloading.
    #[arg(long)]
    snapshot: bool,
}

fn run(cli: Cli) -> EngineResult<()> {
    let mut config = GameConfig::with_path(cli.config.clone());
    if let Err(e) = config.load_from_file() {
        warn!("using default configuration: {}", e);
    }
    if let Some(fps) = cli.fps {
        config.target_fps = fps;
    }
    let frames = cli.frames.unwrap_or(config.max_frames);
    let seed = cli.seed.unwrap_or_else(|| fastrand::u64(..));

    let mut scene = Scene::with_config("pong", &config, HeadlessRenderer::new());
    let arena = game::setup(&mut scene.world, &config, seed)?;
    scene.start()?;
    let ran = scene.run(frames, config.frame_delta())?;

    if cli.snapshot && scene.world.contains(arena.root) {
        let snapshot = scene.world.snapshot()?;
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(e) => error!("cannot serialize snapshot: {}", e),
        }
    }
    info!(
        "ran {} frames, {} camera passes, {} draws",
        ran,
        scene.renderer().passes,
        scene.renderer().draws
    );
    scene.unload()
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
