//! Anchor Alignment and Content Binding Tests
//!
//! - Content ends up under the shared anchor on every participant
//! - Binding twice reparents once
//! - Only the Host writes the anchor pose

use anchorframe::anchor::{AlignOutcome, BindOutcome};
use anchorframe::collaborators::SceneGraph;
use anchorframe::config::FrameConfig;
use anchorframe::geometry::{Pose, Quat, Vec3};
use anchorframe::sim::{SimRole, SimWorld};
use anchorframe::FrameSession;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(16);

fn space_pose() -> Pose {
    Pose::new(Vec3::new(1.5, 0.0, -2.0), Quat::from_yaw(30.0))
}

fn session(world: &SimWorld, config: FrameConfig) -> FrameSession {
    FrameSession::new(config, world.collaborators(), world.nodes())
}

fn approx_pose(a: Pose, b: Pose) -> bool {
    a.position.distance(b.position) < 1e-4 && (a.yaw_degrees() - b.yaw_degrees()).abs() < 1e-2
}

// =============================================================================
// Binding
// =============================================================================

#[test]
fn test_bind_twice_reparents_once() {
    let world = SimWorld::builder().build();
    let mut session = session(&world, FrameConfig::default());
    let content = world.nodes.content_root.unwrap();

    session.tick(Duration::ZERO);
    assert_eq!(world.scene.parent(content), world.nodes.anchor);

    let (_, bound) = session.notify_reference_pose_updated();
    assert_eq!(bound, BindOutcome::AlreadyBound);
    assert_eq!(world.scene.reparent_count(), 1);
}

#[test]
fn test_binding_preserves_world_pose() {
    let world = SimWorld::builder().build();
    let anchor = world.nodes.anchor.unwrap();
    world.scene.set_world_pose(anchor, space_pose());
    let target_before = world.target_pose().unwrap();

    let mut session = session(&world, FrameConfig::default());
    session.tick(Duration::ZERO);

    let target_after = world.target_pose().unwrap();
    assert!(approx_pose(target_before, target_after));
}

#[test]
fn test_localization_rebinds_moved_content() {
    let world = SimWorld::builder().build();
    let mut session = session(&world, FrameConfig::default());
    let content = world.nodes.content_root.unwrap();
    session.tick(Duration::ZERO);

    // Something else moved the content out from under the anchor
    world.scene.set_parent(content, None, true);
    world.localize();
    let report = session.tick(TICK);

    assert_eq!(report.localized_events, 1);
    assert_eq!(world.scene.parent(content), world.nodes.anchor);
}

#[test]
fn test_follower_binds_content_too() {
    let world = SimWorld::builder().role(SimRole::Follower).build();
    let mut session = session(&world, FrameConfig::default());

    session.tick(Duration::ZERO);

    let content = world.nodes.content_root.unwrap();
    assert_eq!(world.scene.parent(content), world.nodes.anchor);
}

// =============================================================================
// Alignment
// =============================================================================

#[test]
fn test_host_aligns_anchor_on_localization() {
    let world = SimWorld::builder().origin(space_pose()).build();
    let mut session = session(&world, FrameConfig::default());
    session.tick(Duration::ZERO);

    world.localize();
    session.tick(TICK);

    let anchor = world.scene.world_pose(world.nodes.anchor.unwrap()).unwrap();
    assert!(approx_pose(anchor, space_pose()));
}

#[test]
fn test_follower_never_writes_anchor() {
    let world = SimWorld::builder()
        .role(SimRole::Follower)
        .origin(space_pose())
        .build();
    let mut session = session(&world, FrameConfig::default());
    session.tick(Duration::ZERO);

    world.localize();
    session.tick(TICK);
    let (aligned, _) = session.notify_reference_pose_updated();

    assert_eq!(aligned, AlignOutcome::NotAuthority);
    let anchor = world.scene.world_pose(world.nodes.anchor.unwrap()).unwrap();
    assert_eq!(anchor, Pose::IDENTITY);
}

#[test]
fn test_reference_update_realigns_host() {
    let world = SimWorld::builder().build();
    let mut session = session(&world, FrameConfig::default());
    session.tick(Duration::ZERO);

    let moved = Pose::new(Vec3::new(-3.0, 0.0, 4.0), Quat::from_yaw(-90.0));
    world.scene.set_world_pose(world.nodes.reference.unwrap(), moved);
    let (aligned, bound) = session.notify_reference_pose_updated();

    let AlignOutcome::Aligned(pose) = aligned else {
        panic!("expected alignment, got {:?}", aligned);
    };
    assert!(approx_pose(pose, moved));
    assert_eq!(bound, BindOutcome::AlreadyBound);
}

#[test]
fn test_auto_align_off_ignores_localization() {
    let world = SimWorld::builder().origin(space_pose()).build();
    let mut config = FrameConfig::default();
    config.binder.auto_align_on_localized = false;
    let mut session = session(&world, config);
    session.tick(Duration::ZERO);

    world.localize();
    let report = session.tick(TICK);

    assert_eq!(report.localized_events, 0);
    let anchor = world.scene.world_pose(world.nodes.anchor.unwrap()).unwrap();
    assert_eq!(anchor, Pose::IDENTITY);
}
