//! Flat-ground physics stand-in
//!
//! Every surface is an infinite horizontal plane at a fixed height. That is
//! enough to exercise ground detection and downward ray casts.

use crate::collaborators::{Collider, GroundQuery, LayerMask, RayHit};
use crate::geometry::Vec3;
use std::cell::{Cell, RefCell};

/// A horizontal collider surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundSurface {
    pub height: f32,
    pub collider: Collider,
    pub layer: u8,
}

impl GroundSurface {
    pub fn new(height: f32, collider: Collider) -> Self {
        Self {
            height,
            collider,
            layer: 0,
        }
    }

    pub fn on_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }
}

/// In-memory `GroundQuery`
#[derive(Debug, Default)]
pub struct MemoryGround {
    surfaces: RefCell<Vec<GroundSurface>>,
    raycasts: Cell<usize>,
    overlaps: Cell<usize>,
}

impl MemoryGround {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_surface(&self, surface: GroundSurface) {
        self.surfaces.borrow_mut().push(surface);
    }

    pub fn clear(&self) {
        self.surfaces.borrow_mut().clear();
    }

    /// Number of `raycast_all` calls.
    pub fn raycast_count(&self) -> usize {
        self.raycasts.get()
    }

    /// Number of `overlap_sphere` calls.
    pub fn overlap_count(&self) -> usize {
        self.overlaps.get()
    }
}

impl GroundQuery for MemoryGround {
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<Collider> {
        self.overlaps.set(self.overlaps.get() + 1);
        self.surfaces
            .borrow()
            .iter()
            .filter(|s| mask.contains_layer(s.layer))
            .filter(|s| (s.height - center.y).abs() <= radius)
            .map(|s| s.collider)
            .collect()
    }

    /// Hits come back in insertion order, not sorted.
    fn raycast_all(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Vec<RayHit> {
        self.raycasts.set(self.raycasts.get() + 1);
        let length = direction.length();
        if length <= f32::EPSILON || direction.y.abs() <= f32::EPSILON {
            return Vec::new();
        }
        let dir_y = direction.y / length;

        self.surfaces
            .borrow()
            .iter()
            .filter(|s| mask.contains_layer(s.layer))
            .filter_map(|s| {
                let distance = (s.height - origin.y) / dir_y;
                if distance < 0.0 || distance > max_distance {
                    return None;
                }
                let point = origin + direction * (distance / length);
                Some(RayHit {
                    point,
                    distance,
                    collider: s.collider,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{ColliderKind, NodeId};

    fn plane(node: u64, height: f32) -> GroundSurface {
        GroundSurface::new(height, Collider::new(NodeId(node), ColliderKind::Plane))
    }

    #[test]
    fn test_raycast_down_hits_surfaces_in_range() {
        let ground = MemoryGround::new();
        ground.add_surface(plane(1, 0.0));
        ground.add_surface(plane(2, -10.0));

        let hits = ground.raycast_all(Vec3::new(0.0, 3.0, 0.0), Vec3::DOWN, 6.0, LayerMask::ALL);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].collider.node, NodeId(1));
        assert!((hits[0].distance - 3.0).abs() < 1e-5);
        assert!(hits[0].point.y.abs() < 1e-5);
        assert_eq!(ground.raycast_count(), 1);
    }

    #[test]
    fn test_surfaces_above_origin_are_missed() {
        let ground = MemoryGround::new();
        ground.add_surface(plane(1, 5.0));
        let hits = ground.raycast_all(Vec3::new(0.0, 3.0, 0.0), Vec3::DOWN, 6.0, LayerMask::ALL);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_layer_mask_filters() {
        let ground = MemoryGround::new();
        ground.add_surface(plane(1, 0.0).on_layer(3));

        let only_layer_0 = LayerMask(1);
        assert!(ground
            .raycast_all(Vec3::new(0.0, 1.0, 0.0), Vec3::DOWN, 5.0, only_layer_0)
            .is_empty());
        assert!(ground
            .overlap_sphere(Vec3::ZERO, 5.0, only_layer_0)
            .is_empty());
        assert_eq!(ground.overlap_sphere(Vec3::ZERO, 5.0, LayerMask(1 << 3)).len(), 1);
    }

    #[test]
    fn test_overlap_radius() {
        let ground = MemoryGround::new();
        ground.add_surface(plane(1, 0.0));
        assert_eq!(ground.overlap_sphere(Vec3::new(0.0, 4.9, 0.0), 5.0, LayerMask::ALL).len(), 1);
        assert!(ground.overlap_sphere(Vec3::new(0.0, 5.1, 0.0), 5.0, LayerMask::ALL).is_empty());
    }
}
