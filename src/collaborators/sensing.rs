//! Sensing, plane detection and permission boundaries

use crate::geometry::{Quat, Vec3};
use tokio::sync::oneshot;

/// Environment mesh reconstruction
pub trait SensingSubsystem {
    /// Subsystem exists and is running at the platform level
    fn is_ready(&self) -> bool;

    fn set_enabled(&self, enabled: bool);

    /// Mesh density in `(0, 1]`
    fn set_density(&self, density: f32);

    /// Reconstruction volume: center, rotation, full extents
    fn set_bounds(&self, center: Vec3, rotation: Quat, scale: Vec3);

    /// Request regeneration of existing meshes
    fn invalidate(&self);

    /// Destroy every mesh produced so far
    fn destroy_all_artifacts(&self);
}

/// Plane detection modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneDetectionMode {
    Horizontal,
    Vertical,
    Both,
}

/// Plane detection
pub trait PlaneSubsystem {
    fn set_enabled(&self, enabled: bool);

    fn set_detection_mode(&self, mode: PlaneDetectionMode);

    /// Show or hide every plane produced so far
    fn set_trackables_active(&self, active: bool);
}

/// Permission kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionKind {
    SpatialMapping,
}

impl PermissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpatialMapping => "spatial_mapping",
        }
    }
}

/// Answer to a permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    Granted,
    Denied,
    /// Denied with "don't ask again"
    DeniedPermanently,
}

impl PermissionOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::DeniedPermanently => "denied_permanently",
        }
    }
}

/// Asynchronous permission dialog.
///
/// The answer is sent on `reply` at some later point; dropping `reply`
/// without sending counts as a denial.
pub trait PermissionService {
    fn request(&self, kind: PermissionKind, reply: oneshot::Sender<PermissionOutcome>);
}
