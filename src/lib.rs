#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Viewer
//!
//! The core of a small voxel-world viewer: a noise-generated height-field terrain,
//! batched into two draw calls, with block editing, a look-at camera and a point
//! and spot light.
//!
//! The viewer never talks to a GPU directly. Every frame is expressed as uniform
//! writes and draw commands against the [`Renderer`] trait, which a windowing
//! backend implements. [`RecordingRenderer`] is a headless implementation used by
//! the binary and the tests.
//!
//! ## Key Modules
//!
//! * `config` - JSON configuration with defaults for every field
//! * `engine_state` - World state, frame driver, terrain, lighting and camera
//! * `error` - The crate's error type
//! * `math` - Column-major 3x3 and 4x4 matrices
//!
//! ## Usage
//!
//! ```rust
//! use voxel_viewer::{EditIntent, EngineState, RecordingRenderer, ViewerConfig};
//! use web_time::Duration;
//!
//! let mut renderer = RecordingRenderer::new();
//! let mut engine = EngineState::new(&ViewerConfig::default()).unwrap();
//! engine.bind(&mut renderer).unwrap();
//! engine.apply_edit(EditIntent::Add);
//! engine.tick(&mut renderer, Duration::from_millis(16)).unwrap();
//! ```

use log::{error, info};
use web_time::Instant;

pub mod config;
pub mod engine_state;
pub mod error;
pub mod math;

pub use config::ViewerConfig;
pub use engine_state::{
    lighting::{LightControl, LightModel},
    rendering::{RecordingRenderer, Renderer},
    voxels::{EditIntent, HeightField},
    EngineState, FrameStats, PlayerAction, UploadSummary,
};
pub use error::{ViewerError, ViewerResult};
pub use math::{Matrix3, Matrix4};

/// Config file read when no path is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "viewer.json";

/// Runs a headless viewing session.
///
/// Reads the configuration named by the first command-line argument (or
/// [`DEFAULT_CONFIG_PATH`]), builds the world, binds a [`RecordingRenderer`] and
/// renders the configured number of frames, logging a summary at the end.
/// Failures are logged; the process exits normally.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    if let Err(err) = run_session(&path) {
        error!("Viewer stopped: {err}");
    }
}

fn run_session(config_path: &str) -> ViewerResult<()> {
    let config = ViewerConfig::load(config_path)?;
    let mut engine = EngineState::new(&config)?;
    info!("World seed {}", engine.seed());

    let mut renderer = RecordingRenderer::new();
    engine.bind(&mut renderer)?;

    let started = Instant::now();
    let mut last = started;
    let mut stats = FrameStats::default();
    for _ in 0..config.frames {
        let now = Instant::now();
        engine.process_input();
        stats = engine.tick(&mut renderer, now - last)?;
        last = now;
    }

    info!(
        "Rendered {} frames in {:?}: {} draw calls and {} terrain vertices per frame, {} mesh rebuilds",
        stats.frame,
        started.elapsed(),
        stats.draw_calls,
        stats.terrain_vertices,
        stats.mesh_rebuilds
    );
    info!("Renderer received {} calls", renderer.calls().len());

    let upload = engine.upload_summary();
    info!(
        "GPU upload: {} bytes of terrain vertices, {}-byte light block, {} columns under the spot light",
        upload.terrain_bytes, upload.light_block_bytes, upload.spot_lit_columns
    );
    Ok(())
}
