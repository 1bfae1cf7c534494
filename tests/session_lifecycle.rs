//! Session Lifecycle Tests
//!
//! - Localization arrives over the broadcast channel, including lag and close
//! - Debounced snap on localization when subscribed
//! - Missing sensing subsystem leaves the session inert
//! - Configuration files drive a scripted simulation

use anchorframe::cli::{simulate, SimulateArgs};
use anchorframe::collaborators::LocalizationEvent;
use anchorframe::collaborators::LocalizationState;
use anchorframe::config::FrameConfig;
use anchorframe::observability::{Event, Logger, Severity};
use anchorframe::sensing::{BootstrapPhase, SensingState};
use anchorframe::sim::SimWorld;
use anchorframe::snap::SnapPhase;
use anchorframe::FrameSession;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::sync::broadcast;

const TICK: Duration = Duration::from_millis(16);

fn session(world: &SimWorld, config: FrameConfig) -> FrameSession {
    FrameSession::new(config, world.collaborators(), world.nodes())
}

// =============================================================================
// Localization Channel
// =============================================================================

#[test]
fn test_only_localized_transitions_count() {
    let world = SimWorld::builder().build();
    let mut session = session(&world, FrameConfig::default());
    session.tick(Duration::ZERO);

    world
        .localization
        .send(LocalizationEvent::new(LocalizationState::Localizing))
        .unwrap();
    world.localize();
    let report = session.tick(TICK);

    assert_eq!(report.localized_events, 1);
}

#[test]
fn test_lagged_receiver_still_localizes() {
    let world = SimWorld::builder().build();
    let mut session = session(&world, FrameConfig::default());
    session.tick(Duration::ZERO);

    for _ in 0..40 {
        world.localize();
    }
    let report = session.tick(TICK);

    assert!(report.localized_events > 0);
    assert!(session.is_subscribed());
}

#[test]
fn test_closed_channel_drops_subscription() {
    let world = SimWorld::builder().build();
    let (sender, _) = broadcast::channel(4);
    let mut collaborators = world.collaborators();
    collaborators.localization = Some(sender.clone());
    let mut session = FrameSession::new(FrameConfig::default(), collaborators, world.nodes());
    assert!(session.is_subscribed());

    drop(sender);
    let report = session.tick(Duration::ZERO);

    assert_eq!(report.localized_events, 0);
    assert!(!session.is_subscribed());
}

#[test]
fn test_subscribed_snap_is_debounced() {
    let world = SimWorld::builder().build();
    let mut config = FrameConfig::default();
    config.snap.subscribe_to_localization = true;
    let mut session = session(&world, config);
    session.tick(Duration::ZERO);

    world.localize();
    let at = Duration::from_millis(500);
    let report = session.tick(at);
    assert_eq!(
        report.snap_phase,
        SnapPhase::Debouncing {
            until: at + Duration::from_millis(100)
        }
    );

    // A second localization inside the window restarts it
    world.localize();
    let again = at + Duration::from_millis(50);
    let report = session.tick(again);
    assert_eq!(
        report.snap_phase,
        SnapPhase::Debouncing {
            until: again + Duration::from_millis(100)
        }
    );

    let mut now = again + TICK;
    let mut completed = 0;
    while now < Duration::from_secs(2) {
        if let Some(outcome) = session.tick(now).snap_outcome {
            assert!(outcome.is_completed());
            completed += 1;
        }
        now += TICK;
    }
    assert_eq!(completed, 1);
}

#[test]
fn test_shutdown_stops_listening() {
    let world = SimWorld::builder().build();
    let mut session = session(&world, FrameConfig::default());
    session.tick(Duration::ZERO);

    session.shutdown();
    assert_eq!(world.localize(), 0);
    let report = session.tick(TICK);

    assert_eq!(report.localized_events, 0);
}

// =============================================================================
// Bootstrap
// =============================================================================

#[test]
fn test_missing_subsystem_leaves_session_inert() {
    let world = SimWorld::builder().sensing_ready(false).build();
    let mut config = FrameConfig::default();
    config.sensing.subsystem_wait_timeout_secs = 1.0;
    let mut session = session(&world, config);

    let mut now = Duration::ZERO;
    while now < Duration::from_secs(3) {
        session.tick(now);
        now += TICK;
    }

    assert_eq!(session.bootstrap_phase(), BootstrapPhase::Inert);
    assert_eq!(session.sensing_state(), SensingState::Stopped);
    assert_eq!(world.permissions.requests(), 0);
    assert!(!world.sensing.is_enabled());
}

#[test]
fn test_subsystem_ready_late_is_picked_up() {
    let world = SimWorld::builder().sensing_ready(false).build();
    let mut session = session(&world, FrameConfig::default());

    let mut now = Duration::ZERO;
    while now < Duration::from_secs(1) {
        session.tick(now);
        now += TICK;
    }
    assert_eq!(world.permissions.requests(), 0);

    world.sensing.set_ready(true);
    while now < Duration::from_secs(2) {
        session.tick(now);
        now += TICK;
    }

    assert_eq!(session.sensing_state(), SensingState::Running);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_simulate_with_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"snap": {{"subscribe_to_localization": true, "feedback_seconds": 0}}, "log_level": "warn"}}"#
    )
    .unwrap();

    let args = SimulateArgs {
        config: Some(file.path().to_path_buf()),
        duration: 3.0,
        ..SimulateArgs::default()
    };
    let summary = simulate(&args).unwrap();

    assert_eq!(summary.authority, "host");
    assert_eq!(summary.snap_completed, 1);
    assert!(summary.feedback.is_empty());
    assert!(summary.snap_memory.locked_local_height.is_some());
    Logger::set_min_severity(Severity::Trace);
}

#[test]
fn test_invalid_config_rejected_before_running() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"snap": {{"snap_speed": -1}}}}"#).unwrap();

    let args = SimulateArgs {
        config: Some(file.path().to_path_buf()),
        ..SimulateArgs::default()
    };

    assert!(simulate(&args).is_err());
}

#[test]
fn test_log_line_shape() {
    let line = Logger::render(
        Event::SnapRaycastMiss.default_severity(),
        Event::SnapRaycastMiss.as_str(),
        &[("run_id", "r1"), ("cast_height", "2.0000")],
    );

    let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(parsed["event"], "SNAP_RAYCAST_MISS");
    assert_eq!(parsed["severity"], "WARN");
    assert_eq!(parsed["run_id"], "r1");
}
