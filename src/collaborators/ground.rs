//! Ground query and feedback boundaries

use super::scene::NodeId;
use crate::geometry::Vec3;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Physics layer filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub fn contains_layer(&self, layer: u8) -> bool {
        layer < 32 && self.0 & (1u32 << layer) != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Collider origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderKind {
    /// Detected plane surface
    Plane,
    /// Reconstructed environment mesh
    Mesh,
    /// Anything else (content, props)
    Other,
}

/// A collider attached to a scene node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collider {
    pub node: NodeId,
    pub kind: ColliderKind,
}

impl Collider {
    pub fn new(node: NodeId, kind: ColliderKind) -> Self {
        Self { node, kind }
    }

    /// Planes and reconstructed meshes count as ground evidence.
    pub fn is_ground_capable(&self) -> bool {
        matches!(self.kind, ColliderKind::Plane | ColliderKind::Mesh)
    }
}

/// A ray cast hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub distance: f32,
    pub collider: Collider,
}

/// Physics queries. Trigger volumes are never reported.
pub trait GroundQuery {
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<Collider>;

    /// All hits along the ray. No ordering is assumed by the caller.
    fn raycast_all(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Vec<RayHit>;
}

/// Transient UI text
pub trait FeedbackSink {
    /// Show `message`, reverting to the previous text after `duration`
    fn show(&self, message: &str, duration: Duration);
}
