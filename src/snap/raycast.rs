//! Ground height computation

use super::config::SnapConfig;
use crate::collaborators::{GroundQuery, NodeId, RayHit, SceneGraph};
use crate::geometry::{clamp, Aabb, Vec3};
use std::time::Duration;

/// Nearest hit that does not belong to the target's own subtree.
pub fn select_ground_hit(
    mut hits: Vec<RayHit>,
    scene: &dyn SceneGraph,
    target: NodeId,
) -> Option<RayHit> {
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits.into_iter()
        .find(|hit| !scene.is_descendant_of(hit.collider.node, target))
}

/// Distance from the target origin down to its lowest point.
///
/// An explicit grounding point wins; otherwise the union of renderable
/// bounds under the target; otherwise zero.
pub fn bottom_offset(
    scene: &dyn SceneGraph,
    target: NodeId,
    grounding_point: Option<NodeId>,
) -> f32 {
    let Some(target_pose) = scene.world_pose(target) else {
        return 0.0;
    };
    if let Some(point) = grounding_point.and_then(|p| scene.world_pose(p)) {
        return target_pose.position.y - point.position.y;
    }
    let bounds = scene.renderable_bounds(target);
    match Aabb::union_all(&bounds) {
        Some(union) => target_pose.position.y - union.min.y,
        None => 0.0,
    }
}

/// Ray cast straight down from above the target.
///
/// Returns the world height the target origin should settle at, or `None`
/// when nothing outside the target's subtree was hit.
pub fn raycast_target_height(
    ground: &dyn GroundQuery,
    scene: &dyn SceneGraph,
    target: NodeId,
    grounding_point: Option<NodeId>,
    config: &SnapConfig,
) -> Option<f32> {
    let position = scene.world_pose(target)?.position;
    let offset = bottom_offset(scene, target, grounding_point);
    let origin = position + Vec3::UP * config.cast_height;

    let hits = ground.raycast_all(
        origin,
        Vec3::DOWN,
        config.cast_height * 3.0,
        config.ground_mask,
    );
    let hit = select_ground_hit(hits, scene, target)?;
    Some(hit.point.y + offset + config.padding)
}

/// Animation length for moving from `start_y` to `target_y`.
pub fn snap_duration(start_y: f32, target_y: f32, snap_speed: f32) -> Duration {
    let seconds = clamp((start_y - target_y).abs() / snap_speed.max(0.01), 0.05, 0.6);
    Duration::from_secs_f32(seconds)
}
