//! Spatial primitives
//!
//! Minimal vector, rotation and pose math needed by the coordination core:
//! - Positions and directions (`Vec3`)
//! - Unit rotations (`Quat`) with yaw extraction and yaw replacement
//! - Rigid poses (`Pose`) with composition and inversion
//! - Axis-aligned bounds (`Aabb`)
//!
//! Conventions: Y is up, angles are degrees, yaw is rotation about +Y
//! measured from +Z toward +X.

mod pose;
mod vector;

pub use pose::{Aabb, Pose};
pub use vector::{Quat, Vec3};

/// Clamp `value` into `[min, max]`.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Linear interpolation, `t` unclamped.
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Hermite ease-in/ease-out between `from` and `to`.
///
/// `t` is clamped to `[0, 1]` first, so the curve never overshoots.
pub fn smoothstep(from: f32, to: f32, t: f32) -> f32 {
    let t = clamp(t, 0.0, 1.0);
    let t = -2.0 * t * t * t + 3.0 * t * t;
    to * t + from * (1.0 - t)
}

/// Shortest signed difference between two angles in degrees, in `(-180, 180]`.
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let mut delta = (target - current).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}
