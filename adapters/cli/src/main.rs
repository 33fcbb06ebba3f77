#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the snake game.

mod simulation;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use snake_core::WINDOW_TITLE;
use snake_rendering::{Color, GridPresentation, Presentation, RenderingBackend, CELL_LENGTH};
use snake_rendering_macroquad::MacroquadBackend;
use tracing::{info, Level};

use crate::simulation::Simulation;

/// Classic snake arcade game.
#[derive(Debug, Parser)]
#[command(name = "snake", version)]
struct CliArgs {
    /// Seed for food placement; drawn from entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Path to the asset manifest.
    #[arg(long, value_name = "PATH")]
    assets: Option<PathBuf>,
    /// Skip asset loading and draw food as a plain rectangle.
    #[arg(long, conflicts_with = "assets")]
    no_assets: bool,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long)]
    vsync: bool,
    /// Log frame timing once per second.
    #[arg(long)]
    show_fps: bool,
    /// Raise log verbosity; repeat for more detail.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Entry point for the snake command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose)?;

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, "starting snake");

    let mut simulation = Simulation::new(seed);
    let grid = GridPresentation::new(simulation.grid(), CELL_LENGTH)
        .context("failed to describe the playfield")?;
    let presentation = Presentation::new(WINDOW_TITLE, Color::BACKGROUND, simulation.scene(grid));

    let mut backend = MacroquadBackend::new()
        .with_show_fps(args.show_fps)
        .with_asset_loading(!args.no_assets);
    if args.vsync {
        backend = backend.with_vsync(true);
    }
    if let Some(path) = args.assets {
        backend = backend.with_asset_manifest(path);
    }

    backend
        .run(presentation, move |elapsed, input, scene| {
            simulation.step(elapsed, &input.controls);
            simulation.populate_scene(scene);
        })
        .context("snake exited with an error")?;

    info!("goodbye");
    Ok(())
}

fn init_logging(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .try_init()
        .map_err(|error| anyhow!("failed to install log subscriber: {error}"))
}
