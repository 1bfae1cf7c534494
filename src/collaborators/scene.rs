//! Scene graph boundary

use crate::geometry::{Aabb, Pose};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque scene node handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Transform hierarchy owned by the rendering runtime.
///
/// Poses are rigid (no scale). Queries on unknown nodes return `None`,
/// `false` or empty; mutations on unknown nodes are ignored.
pub trait SceneGraph {
    fn exists(&self, node: NodeId) -> bool;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Reparent `node`. With `keep_world` the world pose is preserved and
    /// the local pose recomputed; without it the local pose is kept.
    fn set_parent(&self, node: NodeId, parent: Option<NodeId>, keep_world: bool);

    fn world_pose(&self, node: NodeId) -> Option<Pose>;

    fn set_world_pose(&self, node: NodeId, pose: Pose);

    fn local_pose(&self, node: NodeId) -> Option<Pose>;

    fn set_local_pose(&self, node: NodeId, pose: Pose);

    /// True when `node` is `ancestor` itself or anywhere beneath it.
    fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool;

    /// World-space bounds of every renderable in the subtree rooted at `node`.
    fn renderable_bounds(&self, node: NodeId) -> Vec<Aabb>;

    fn set_active(&self, node: NodeId, active: bool);
}
