//! Vantage CLI
//!
//! Play camera trajectories headlessly and inspect easing curves.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vantage_animation::{Easing, MonotonicClock};
use vantage_camera::{
    AnimatedViewController, CameraTrajectory, CameraWaypoint, SharedViewController,
};
use vantage_core::{Vec3, ViewPose};

mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "vantage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Vantage animated camera tools", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a trajectory and print one JSON pose per tick
    Play {
        /// Trajectory JSON file
        trajectory: PathBuf,

        /// Configuration file (vantage.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Ticks per second
        #[arg(short, long, default_value = "60")]
        rate: u32,

        /// Advance one frame per tick instead of following the wall clock
        #[arg(long)]
        frame_by_frame: bool,

        /// Frame rate for frame-by-frame playback
        #[arg(long)]
        fps: Option<u32>,

        /// Give up after this many ticks
        #[arg(long, default_value = "100000")]
        max_ticks: u64,
    },

    /// Print samples of an easing curve
    Curve {
        /// Curve name (rising, declining, full, wave)
        #[arg(short, long, default_value = "wave")]
        kind: String,

        /// Number of intervals
        #[arg(short, long, default_value = "10")]
        steps: u32,
    },

    /// Print an example trajectory document
    Sample,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for data
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Play {
            trajectory,
            config,
            rate,
            frame_by_frame,
            fps,
            max_ticks,
        } => cmd_play(&trajectory, config, rate, frame_by_frame, fps, max_ticks),

        Commands::Curve { kind, steps } => cmd_curve(&kind, steps),

        Commands::Sample => cmd_sample(),
    }
}

fn cmd_play(
    path: &Path,
    config_path: Option<PathBuf>,
    rate: u32,
    frame_by_frame: bool,
    fps: Option<u32>,
    max_ticks: u64,
) -> Result<()> {
    let config = CliConfig::load(config_path.as_deref())?;

    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut trajectory: CameraTrajectory =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

    if frame_by_frame {
        trajectory.render_frame_by_frame = true;
        trajectory.frames_per_second = fps.unwrap_or(config.view.target_fps);
    }

    let frames = Arc::new(config.frame_graph());
    let controller = AnimatedViewController::new(config.view, frames, Arc::new(MonotonicClock));
    let shared = SharedViewController::new(controller);

    let outputs = shared.outputs();
    outputs.poses.subscribe(|pose| match serde_json::to_string(pose) {
        Ok(line) => println!("{}", line),
        Err(err) => warn!("Failed to encode pose: {}", err),
    });
    outputs.finished.subscribe(|_| info!("Animation finished"));

    info!(
        "Playing {} waypoints from {}",
        trajectory.trajectory.len(),
        path.display()
    );

    // Requests arrive off the render thread, as they would from a transport
    let producer = {
        let shared = shared.clone();
        thread::spawn(move || shared.handle_trajectory(&trajectory))
    };

    let period = Duration::from_secs_f64(1.0 / rate.max(1) as f64);
    let mut ticks = 0u64;
    loop {
        shared.update();
        ticks += 1;

        if producer.is_finished() && !shared.is_animating() {
            break;
        }
        if ticks >= max_ticks {
            warn!("Stopping after {} ticks", ticks);
            shared.cancel_transition();
            break;
        }
        if !trajectory_is_frame_counted(&shared) {
            thread::sleep(period);
        }
    }

    let queued = producer
        .join()
        .map_err(|_| anyhow::anyhow!("Trajectory producer panicked"))??;
    info!("Queued {} waypoints, ran {} ticks", queued, ticks);
    Ok(())
}

fn trajectory_is_frame_counted(shared: &SharedViewController) -> bool {
    shared.with_controller(|c| c.clock_mode() != vantage_animation::ClockMode::WallClock)
}

fn cmd_curve(kind: &str, steps: u32) -> Result<()> {
    let easing = Easing::from_name(kind).with_context(|| {
        format!(
            "Unknown curve '{}'. Valid curves: rising, declining, full, wave",
            kind
        )
    })?;

    let steps = steps.max(1);
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        println!("{:.3}\t{:.6}", t, easing.space_progress(t));
    }
    Ok(())
}

fn cmd_sample() -> Result<()> {
    let trajectory = CameraTrajectory::new(vec![
        CameraWaypoint::new(
            ViewPose::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::UNIT_Z),
            2.0,
            Easing::Full,
        ),
        CameraWaypoint::new(
            ViewPose::new(Vec3::new(5.0, 0.0, 2.0), Vec3::ZERO, Vec3::UNIT_Z),
            1.5,
            Easing::Wave,
        ),
    ]);

    let json = serde_json::to_string_pretty(&trajectory).context("Failed to serialize trajectory")?;
    println!("{}", json);
    Ok(())
}
