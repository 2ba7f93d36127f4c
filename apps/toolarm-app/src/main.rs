//! Toolarm waypoint playback CLI.
//!
//! Provides two modes of operation:
//! - `run`: Play a waypoint path on a URDF arm headlessly and print statistics
//! - `info`: Print the kinematic chain built from a URDF

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bevy::prelude::*;
use clap::{Parser, Subcommand};
use nalgebra::Vector3;
use tracing_subscriber::EnvFilter;

use toolarm_ik::{Chain, SolverConfig};
use toolarm_sim::{
    ArmSession, LatestFrame, PlaybackClock, PlaybackSession, PlaybackStats, SessionConfig,
    ToolarmPlaybackPlugin,
};

/// Solver settings used when no `--config` is given.
const DEFAULT_SOLVER: SolverConfig = SolverConfig::new(20, 0.01, 1.0);

/// Frames played after the path finishes so the arm can settle.
const SETTLE_FRAMES: u32 = 30;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Play back waypoint paths on URDF arms with a CCD IK solver.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a waypoint path headlessly and print statistics.
    Run {
        /// Robot description (URDF).
        #[arg(long)]
        urdf: PathBuf,

        /// Joint limit override document (JSON).
        #[arg(long)]
        limits: Option<PathBuf>,

        /// Waypoints as a JSON array of [x, y, z].
        #[arg(long)]
        waypoints: PathBuf,

        /// Session configuration (TOML).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Frames to play. Defaults to the path length plus a settle period.
        #[arg(short = 'n', long)]
        frames: Option<u32>,
    },

    /// Print the kinematic chain built from a URDF.
    Info {
        /// Robot description (URDF).
        #[arg(long)]
        urdf: PathBuf,

        /// Joint limit override document (JSON).
        #[arg(long)]
        limits: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn load_chain(urdf: &Path, limits: Option<&Path>) -> Result<Chain> {
    let description = toolarm_urdf::parse_file(urdf)
        .with_context(|| format!("failed to read robot description {}", urdf.display()))?;
    let overrides = limits
        .map(|path| {
            toolarm_urdf::load_limits_file(path)
                .with_context(|| format!("failed to read joint limits {}", path.display()))
        })
        .transpose()?;
    Chain::build(&description, overrides.as_ref())
        .with_context(|| format!("failed to build chain for {}", description.name()))
}

fn parse_waypoints(json: &str) -> Result<Vec<Vector3<f32>>> {
    let points: Vec<[f32; 3]> = serde_json::from_str(json)?;
    if points.is_empty() {
        bail!("waypoint list is empty");
    }
    Ok(points.into_iter().map(Vector3::from).collect())
}

fn load_waypoints(path: &Path) -> Result<Vec<Vector3<f32>>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read waypoints {}", path.display()))?;
    parse_waypoints(&content).with_context(|| format!("invalid waypoints in {}", path.display()))
}

/// Frames needed to traverse `waypoints` once, plus [`SETTLE_FRAMES`].
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn frames_for_path(waypoints: usize, config: &SessionConfig) -> u32 {
    let segments = waypoints.saturating_sub(1).max(1) as f32;
    if config.path.speed <= 0.0 {
        return SETTLE_FRAMES;
    }
    let seconds = segments / config.path.speed;
    (seconds / config.frame_dt).round() as u32 + SETTLE_FRAMES
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn run_playback(
    urdf: &Path,
    limits: Option<&Path>,
    waypoints: &Path,
    config: Option<&Path>,
    frames: Option<u32>,
) -> Result<()> {
    let config = match config {
        Some(path) => SessionConfig::from_file(path)
            .with_context(|| format!("failed to load session config {}", path.display()))?,
        None => SessionConfig::new(DEFAULT_SOLVER),
    };
    let chain = load_chain(urdf, limits)?;
    let waypoints = load_waypoints(waypoints)?;
    let frames = frames.unwrap_or_else(|| frames_for_path(waypoints.len(), &config));

    let mut session = ArmSession::from_config(chain, &config)?;
    session.set_waypoints(waypoints);
    session.play()?;

    let mut app = App::new();
    app.add_plugins(ToolarmPlaybackPlugin);
    app.insert_resource(PlaybackClock {
        dt: config.frame_dt,
    });
    app.insert_resource(PlaybackSession(session));
    app.finish();
    app.cleanup();

    tracing::info!(frames, dt = config.frame_dt, "starting playback");
    for _ in 0..frames {
        app.update();
    }

    let stats = *app.world().resource::<PlaybackStats>();
    print_stats(&stats);
    if let Some(report) = app.world().resource::<LatestFrame>().report {
        let e = report.effector;
        println!(
            "final: progress={:.3}, effector=({:.4}, {:.4}, {:.4})",
            report.progress, e.x, e.y, e.z
        );
    }
    Ok(())
}

fn print_stats(stats: &PlaybackStats) {
    println!(
        "frames={}, solved={}, converged={}",
        stats.frames, stats.solved_frames, stats.converged_frames
    );
    println!(
        "iterations={}, mean_error={:.5}, max_error={:.5}",
        stats.total_iterations,
        stats.mean_error().unwrap_or(0.0),
        stats.max_error
    );
    println!("clamped={}, locked_holds={}", stats.clamped, stats.locked_holds);
}

fn run_info(urdf: &Path, limits: Option<&Path>) -> Result<()> {
    let chain = load_chain(urdf, limits)?;
    println!("joints={}, dof={}", chain.len(), chain.dof());
    for (index, joint) in chain.joints().iter().enumerate() {
        let p = joint.position();
        let range = joint.limits().map_or_else(
            || "unlimited".to_owned(),
            |l| format!("[{:.3}, {:.3}]", l.lower, l.upper),
        );
        let marker = if index == chain.end_effector() {
            " (end effector)"
        } else if joint.is_locked() {
            " (locked)"
        } else {
            ""
        };
        let kind = format!("{:?}", joint.kind());
        println!(
            "  {index}: {:<16} {kind:<9} {range:<18} at ({:.3}, {:.3}, {:.3}){marker}",
            joint.name(),
            p.x,
            p.y,
            p.z
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            urdf,
            limits,
            waypoints,
            config,
            frames,
        } => run_playback(
            &urdf,
            limits.as_deref(),
            &waypoints,
            config.as_deref(),
            frames,
        ),
        Commands::Info { urdf, limits } => run_info(&urdf, limits.as_deref()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
