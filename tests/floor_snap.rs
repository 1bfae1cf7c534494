//! Floor Snap Tests
//!
//! End-to-end snap runs driven through a frame session:
//! - Nearest non-self hit wins
//! - Height, duration and padding
//! - Locked height replay skips the ray cast
//! - A newer trigger cancels the run in flight
//! - Sensing resumed for a run is stopped again with the snap's flags

use anchorframe::collaborators::{Collider, ColliderKind, RayHit, SceneGraph};
use anchorframe::config::FrameConfig;
use anchorframe::errors::FrameErrorKind;
use anchorframe::geometry::{Pose, Vec3};
use anchorframe::sensing::SensingState;
use anchorframe::sim::{GroundSurface, SimWorld};
use anchorframe::snap::{select_ground_hit, SnapOutcome, SnapPhase};
use anchorframe::FrameSession;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(16);

fn session(world: &SimWorld, config: FrameConfig) -> FrameSession {
    FrameSession::new(config, world.collaborators(), world.nodes())
}

/// Tick from `from` until a snap outcome appears.
fn run_to_outcome(
    session: &mut FrameSession,
    from: Duration,
    limit: Duration,
) -> (SnapOutcome, Duration) {
    let mut now = from;
    loop {
        if let Some(outcome) = session.tick(now).snap_outcome {
            return (outcome, now);
        }
        assert!(now < limit, "snap never finished");
        now += TICK;
    }
}

fn target_y(world: &SimWorld) -> f32 {
    world.target_pose().unwrap().position.y
}

// =============================================================================
// Hit Selection
// =============================================================================

#[test]
fn test_nearest_non_self_hit_wins() {
    let world = SimWorld::builder().build();
    let target = world.nodes.snap_target.unwrap();
    let own_collider = world.scene.add_node("Handle", Some(target), Pose::IDENTITY);
    let table = world.scene.add_node("Table", None, Pose::IDENTITY);

    let hit = |node, distance: f32| RayHit {
        point: Vec3::new(0.0, 3.0 - distance, 0.0),
        distance,
        collider: Collider::new(node, ColliderKind::Mesh),
    };
    let hits = vec![
        hit(table, 1.2),
        hit(own_collider, 0.5),
        hit(world.floor, 1.0),
    ];

    let chosen = select_ground_hit(hits, &*world.scene, target).unwrap();
    assert_eq!(chosen.collider.node, world.floor);
    assert_eq!(chosen.distance, 1.0);
}

#[test]
fn test_ray_skips_surface_owned_by_target() {
    let world = SimWorld::builder().build();
    let target = world.nodes.snap_target.unwrap();
    let skirt = world.scene.add_node("Skirt", Some(target), Pose::IDENTITY);
    world
        .ground
        .add_surface(GroundSurface::new(0.4, Collider::new(skirt, ColliderKind::Mesh)));
    let mut session = session(&world, FrameConfig::default());

    session.tick(Duration::ZERO);
    session.trigger_snap();
    let (outcome, _) = run_to_outcome(&mut session, Duration::ZERO, Duration::from_secs(2));

    let SnapOutcome::Completed { target_height, .. } = outcome else {
        panic!("expected completion, got {:?}", outcome);
    };
    assert!((target_height - 0.005).abs() < 1e-5);
}

// =============================================================================
// Height and Timing
// =============================================================================

#[test]
fn test_end_to_end_height_and_duration() {
    let world = SimWorld::builder().build();
    let mut session = session(&world, FrameConfig::default());
    session.tick(Duration::ZERO);

    let start = Duration::from_millis(100);
    session.tick(start);
    session.trigger_snap();
    session.tick(start);

    let SnapPhase::Animating {
        start_y,
        target_y: goal,
        duration,
        ..
    } = session.snap_phase()
    else {
        panic!("expected animation, got {:?}", session.snap_phase());
    };
    assert!((start_y - 1.0).abs() < 1e-5);
    assert!((goal - 0.005).abs() < 1e-5);
    assert!((duration.as_secs_f32() - 0.995 / 6.0).abs() < 1e-3);

    let (outcome, finished) =
        run_to_outcome(&mut session, start + TICK, Duration::from_secs(2));
    assert!(outcome.is_completed());
    assert!(finished >= start + duration);
    assert!((target_y(&world) - 0.005).abs() < 1e-5);
    assert_eq!(world.feedback.shown().len(), 1);
}

#[test]
fn test_height_accounts_for_renderable_bottom() {
    let world = SimWorld::builder()
        .target_size(Vec3::new(0.5, 0.5, 0.5))
        .build();
    let mut session = session(&world, FrameConfig::default());
    session.tick(Duration::ZERO);
    session.trigger_snap();

    let (outcome, _) = run_to_outcome(&mut session, Duration::ZERO, Duration::from_secs(2));

    let SnapOutcome::Completed { target_height, .. } = outcome else {
        panic!("expected completion, got {:?}", outcome);
    };
    assert!((target_height - 0.255).abs() < 1e-4);
}

#[test]
fn test_no_ground_aborts_without_moving() {
    let world = SimWorld::builder().ground_height(None).build();
    let mut session = session(&world, FrameConfig::default());
    session.tick(Duration::ZERO);
    session.trigger_snap();
    let before = target_y(&world);

    let (outcome, at) = run_to_outcome(&mut session, Duration::ZERO, Duration::from_secs(6));

    let SnapOutcome::Aborted { error, .. } = outcome else {
        panic!("expected abort, got {:?}", outcome);
    };
    assert_eq!(error.kind, FrameErrorKind::NoGroundHit);
    assert!(at >= Duration::from_secs(3));
    assert!((target_y(&world) - before).abs() < 1e-5);
    assert!(session.snap_memory().is_empty());
    assert!(world.feedback.shown().is_empty());
}

// =============================================================================
// Memory
// =============================================================================

#[test]
fn test_locked_height_replays_without_raycast() {
    let world = SimWorld::builder().build();
    let mut session = session(&world, FrameConfig::default());
    session.tick(Duration::ZERO);
    session.trigger_snap();
    let (first, at) = run_to_outcome(&mut session, Duration::ZERO, Duration::from_secs(2));
    assert!(first.is_completed());
    assert_eq!(world.ground.raycast_count(), 1);
    assert!(session.snap_memory().locked_local_height.is_some());

    // Floor reading changes; the locked height wins
    world.ground.clear();
    world.ground.add_surface(GroundSurface::new(
        0.3,
        Collider::new(world.floor, ColliderKind::Plane),
    ));
    let target = world.nodes.snap_target.unwrap();
    world
        .scene
        .set_world_pose(target, Pose::at(Vec3::new(0.4, 2.0, 0.4)));

    session.trigger_snap();
    let (second, _) = run_to_outcome(&mut session, at, at + Duration::from_secs(2));

    let SnapOutcome::Completed { target_height, .. } = second else {
        panic!("expected completion, got {:?}", second);
    };
    assert!((target_height - 0.005).abs() < 1e-5);
    assert_eq!(world.ground.raycast_count(), 1);
    // Restored to the remembered local pose
    let position = world.target_pose().unwrap().position;
    assert!(position.distance(Vec3::new(0.0, 0.005, 0.0)) < 1e-4);
}

#[test]
fn test_first_success_is_remembered_once() {
    let world = SimWorld::builder().build();
    let mut session = session(&world, FrameConfig::default());
    session.tick(Duration::ZERO);
    session.trigger_snap();
    let (_, at) = run_to_outcome(&mut session, Duration::ZERO, Duration::from_secs(2));
    let remembered = session.snap_memory();

    session.trigger_snap();
    run_to_outcome(&mut session, at, at + Duration::from_secs(2));

    assert_eq!(session.snap_memory(), remembered);
}

// =============================================================================
// Cancellation
// =============================================================================

#[test]
fn test_retrigger_cancels_run_in_flight() {
    let world = SimWorld::builder().build();
    let mut session = session(&world, FrameConfig::default());
    session.tick(Duration::ZERO);

    session.notify_reference_pose_updated();
    assert!(!session.snap_phase().is_idle());
    let cancelled_first = session.trigger_snap();
    assert!(cancelled_first.is_some());

    session.tick(TICK);
    let cancelled_second = session.trigger_snap();
    assert!(cancelled_second.is_some());
    assert_ne!(cancelled_first, cancelled_second);

    let (outcome, _) = run_to_outcome(&mut session, TICK * 2, Duration::from_secs(2));
    assert!(outcome.is_completed());
    assert_ne!(Some(outcome.run_id()), cancelled_first);
    assert_ne!(Some(outcome.run_id()), cancelled_second);
    assert_eq!(world.feedback.shown().len(), 1);
}

#[test]
fn test_shutdown_cancels_run() {
    let world = SimWorld::builder().build();
    let mut session = session(&world, FrameConfig::default());
    session.tick(Duration::ZERO);
    session.trigger_snap();
    session.tick(TICK);
    let before = target_y(&world);

    session.shutdown();
    let mut now = TICK * 2;
    while now < Duration::from_secs(1) {
        assert!(session.tick(now).snap_outcome.is_none());
        now += TICK;
    }

    assert!(session.snap_phase().is_idle());
    assert!((target_y(&world) - before).abs() < 1e-5);
}

// =============================================================================
// Sensing Around a Run
// =============================================================================

fn stopped_host(config: FrameConfig) -> (SimWorld, FrameSession, Duration) {
    let world = SimWorld::builder().build();
    let mut session = session(&world, config);
    let mut now = Duration::ZERO;
    while now < Duration::from_millis(200) {
        session.tick(now);
        now += TICK;
    }
    assert_eq!(session.sensing_state(), SensingState::Running);
    session.stop_sensing(Some(false), Some(false));
    assert_eq!(session.sensing_state(), SensingState::Stopped);
    (world, session, now)
}

#[test]
fn test_resumed_sensing_stopped_with_snap_flags() {
    let mut config = FrameConfig::default();
    config.snap.stop_sensing_after_snap = true;
    let (world, mut session, now) = stopped_host(config);

    session.trigger_snap();
    let report = session.tick(now);
    assert_eq!(report.sensing, SensingState::Running);
    assert!(world.sensing.is_enabled());

    let (outcome, _) = run_to_outcome(&mut session, now + TICK, now + Duration::from_secs(2));

    assert!(outcome.is_completed());
    assert_eq!(session.sensing_state(), SensingState::Stopped);
    assert_eq!(world.sensing.destroyed(), 0);
    assert!(world.planes.trackables_active());
}

#[test]
fn test_resumed_sensing_continues_after_miss() {
    let mut config = FrameConfig::default();
    config.snap.stop_sensing_after_snap = true;
    let (world, mut session, now) = stopped_host(config);
    world.ground.clear();

    session.trigger_snap();
    let (outcome, _) = run_to_outcome(&mut session, now, now + Duration::from_secs(6));

    assert!(!outcome.is_completed());
    assert_eq!(session.sensing_state(), SensingState::Running);
}

#[test]
fn test_snap_leaves_sensing_alone_by_default() {
    let (_world, mut session, now) = stopped_host(FrameConfig::default());

    session.trigger_snap();
    let (outcome, _) = run_to_outcome(&mut session, now, now + Duration::from_secs(2));

    assert!(outcome.is_completed());
    assert_eq!(session.sensing_state(), SensingState::Stopped);
}
