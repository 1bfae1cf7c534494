//! Sensing Configuration

use crate::config::secs_to_duration;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sensing bounds, density and stop policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensingConfig {
    /// Reconstruction volume width and depth, meters
    pub bounds_size_xz: f32,

    /// Reconstruction volume height, meters
    pub bounds_height: f32,

    /// Mesh density in `[0.05, 1]`
    pub density: f32,

    /// Re-center the volume on the viewer every tick while running
    pub follow_viewer: bool,

    /// Only the Host ever senses. When `false`, nobody does.
    pub host_builds_sensing: bool,

    /// Upper bound on waiting for the sensing subsystem to become ready, seconds
    pub subsystem_wait_timeout_secs: f32,

    /// Stop disables plane detection
    pub disable_plane_subsystem_on_stop: bool,

    /// Stop hides existing planes (overridable per call)
    pub hide_planes_on_stop: bool,

    /// Stop disables mesh reconstruction
    pub disable_mesh_subsystem_on_stop: bool,

    /// Stop destroys existing meshes (overridable per call)
    pub destroy_meshes_on_stop: bool,
}

impl SensingConfig {
    pub fn subsystem_wait_timeout(&self) -> Duration {
        secs_to_duration(self.subsystem_wait_timeout_secs)
    }
}

impl Default for SensingConfig {
    fn default() -> Self {
        Self {
            bounds_size_xz: 8.0,
            bounds_height: 4.0,
            density: 0.30,
            follow_viewer: true,
            host_builds_sensing: true,
            subsystem_wait_timeout_secs: 10.0,
            disable_plane_subsystem_on_stop: true,
            hide_planes_on_stop: true,
            disable_mesh_subsystem_on_stop: true,
            destroy_meshes_on_stop: true,
        }
    }
}
