//! CLI command implementations
//!
//! `simulate` runs one scripted participant:
//! 1. Load configuration (defaults when no file is given)
//! 2. Build the in-memory world for the requested role
//! 3. Tick the session, localizing once at `--localize-at`
//! 4. Print a JSON summary of what happened

use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::collaborators::PermissionOutcome;
use crate::config::{secs_to_duration, FrameConfig, MAX_WAIT_SECS};
use crate::geometry::Vec3;
use crate::observability::{log_event, Event, Logger};
use crate::session::FrameSession;
use crate::sim::{PermissionMode, SimWorld};
use crate::snap::{SnapMemory, SnapOutcome};

use super::args::{Command, SimulateArgs};
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Outcome of a `simulate` run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub role: &'static str,
    pub ticks: u64,
    pub simulated_secs: f32,
    pub authority: &'static str,
    pub sensing: &'static str,
    pub bootstrap: &'static str,
    pub permission_requests: usize,
    pub sensing_enabled: bool,
    pub planes_enabled: bool,
    pub snap_completed: usize,
    pub snap_aborted: usize,
    pub last_abort_reason: Option<&'static str>,
    /// Target height of the last completed run
    pub target_height: Option<f32>,
    /// Snap target world height when the run ended
    pub final_target_y: Option<f32>,
    pub snap_memory: SnapMemory,
    pub feedback: Vec<String>,
}

/// Parse arguments and run the requested command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Simulate(args) => {
            let summary = simulate(&args)?;
            write_response(&summary)
        }
        Command::CheckConfig { config } => {
            let config = check_config(&config)?;
            write_response(&config)
        }
    }
}

/// Load and validate a configuration file.
pub fn check_config(path: &Path) -> CliResult<FrameConfig> {
    let config = FrameConfig::from_file(path)?;
    log_event(
        Event::ConfigLoaded,
        &[("source", &path.display().to_string())],
    );
    Ok(config)
}

/// Run a scripted session and summarize it.
pub fn simulate(args: &SimulateArgs) -> CliResult<SimulationSummary> {
    if !(args.tick.is_finite() && args.tick > 0.0) {
        return Err(CliError::invalid_argument("--tick must be positive"));
    }
    if !(args.duration.is_finite() && args.duration >= 0.0) {
        return Err(CliError::invalid_argument("--duration must not be negative"));
    }
    if args.duration > MAX_WAIT_SECS || args.tick > MAX_WAIT_SECS {
        return Err(CliError::invalid_argument(format!(
            "--duration and --tick must be at most {} seconds",
            MAX_WAIT_SECS
        )));
    }

    let config = match &args.config {
        Some(path) => check_config(path)?,
        None => FrameConfig::default(),
    };
    if let Some(severity) = config.min_severity() {
        Logger::set_min_severity(severity);
    }

    let outcome = if args.deny_permission {
        PermissionOutcome::Denied
    } else {
        PermissionOutcome::Granted
    };
    let world = SimWorld::builder()
        .role(args.role.into())
        .start_position(Vec3::new(0.0, args.start_height, 0.0))
        .ground_height(if args.no_ground { None } else { Some(0.0) })
        .permission_mode(PermissionMode::Auto(outcome))
        .build();

    let mut session = FrameSession::new(config.clone(), world.collaborators(), world.nodes());

    let tick = secs_to_duration(args.tick);
    let end = secs_to_duration(args.duration);
    let localize_at = secs_to_duration(args.localize_at);

    let mut now = Duration::ZERO;
    let mut ticks = 0u64;
    let mut localized = false;
    let mut completed = 0;
    let mut aborted = 0;
    let mut last_abort_reason = None;
    let mut target_height = None;

    while now <= end {
        if !localized && now >= localize_at {
            localized = true;
            world.localize();
            if !config.snap.subscribe_to_localization {
                session.notify_reference_pose_updated();
            }
        }

        let report = session.tick(now);
        match report.snap_outcome {
            Some(SnapOutcome::Completed {
                target_height: height,
                ..
            }) => {
                completed += 1;
                target_height = Some(height);
            }
            Some(SnapOutcome::Aborted { error, .. }) => {
                aborted += 1;
                last_abort_reason = Some(error.kind.as_str());
            }
            None => {}
        }

        ticks += 1;
        now += tick;
    }

    let summary = SimulationSummary {
        role: world.role.as_str(),
        ticks,
        simulated_secs: args.duration,
        authority: session.authority().state_name(),
        sensing: session.sensing_state().state_name(),
        bootstrap: session.bootstrap_phase().state_name(),
        permission_requests: world.permissions.requests(),
        sensing_enabled: world.sensing.is_enabled(),
        planes_enabled: world.planes.is_enabled(),
        snap_completed: completed,
        snap_aborted: aborted,
        last_abort_reason,
        target_height,
        final_target_y: world.target_pose().map(|p| p.position.y),
        snap_memory: session.snap_memory(),
        feedback: world.feedback.shown().into_iter().map(|(m, _)| m).collect(),
    };
    session.shutdown();
    Ok(summary)
}
