//! Floor Snap Configuration

use crate::collaborators::LayerMask;
use crate::config::secs_to_duration;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default feedback text shown after grounding
pub const DEFAULT_GROUNDED_MESSAGE: &str = "床に接地しました";

/// Floor snap settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    // Reset and restore policy
    /// Move the target to the reference X/Z on every run
    pub reset_to_reference_xz_each_localization: bool,
    /// Replace the target yaw with the reference yaw (only with the X/Z reset)
    pub align_yaw_to_reference: bool,
    /// Once remembered, restore the first snapped local pose instead of resetting
    pub restore_initial_local_pose_after_first_snap: bool,
    /// Replay the first snapped local height instead of ray casting again
    pub lock_local_height_after_first_snap: bool,

    // Ray cast
    pub cast_height: f32,
    pub padding: f32,
    /// Animation speed, metres per second
    pub snap_speed: f32,
    pub ground_mask: LayerMask,
    /// Ground evidence search radius around the target
    pub ground_search_radius: f32,

    // Sensing control
    /// Resume sensing for the run, stop it again when grounded
    pub stop_sensing_after_snap: bool,
    pub destroy_meshes_on_stop: bool,
    pub hide_planes_on_stop: bool,

    // Feedback
    pub grounded_message: String,
    pub feedback_seconds: f32,

    // Triggers
    /// Start a run on every `Localized` transition
    pub subscribe_to_localization: bool,
    pub localization_debounce_secs: f32,

    // Bounded waits
    pub converge_timeout_secs: f32,
    pub converge_position_epsilon: f32,
    pub converge_yaw_epsilon_deg: f32,
    pub ground_wait_timeout_secs: f32,
}

impl SnapConfig {
    pub fn localization_debounce(&self) -> Duration {
        secs_to_duration(self.localization_debounce_secs)
    }

    pub fn converge_timeout(&self) -> Duration {
        secs_to_duration(self.converge_timeout_secs)
    }

    pub fn ground_wait_timeout(&self) -> Duration {
        secs_to_duration(self.ground_wait_timeout_secs)
    }

    pub fn feedback_duration(&self) -> Duration {
        secs_to_duration(self.feedback_seconds)
    }
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            reset_to_reference_xz_each_localization: true,
            align_yaw_to_reference: true,
            restore_initial_local_pose_after_first_snap: true,
            lock_local_height_after_first_snap: true,
            cast_height: 2.0,
            padding: 0.005,
            snap_speed: 6.0,
            ground_mask: LayerMask::ALL,
            ground_search_radius: 5.0,
            stop_sensing_after_snap: false,
            destroy_meshes_on_stop: false,
            hide_planes_on_stop: false,
            grounded_message: DEFAULT_GROUNDED_MESSAGE.to_string(),
            feedback_seconds: 5.0,
            subscribe_to_localization: false,
            localization_debounce_secs: 0.1,
            converge_timeout_secs: 1.0,
            converge_position_epsilon: 0.01,
            converge_yaw_epsilon_deg: 1.0,
            ground_wait_timeout_secs: 3.0,
        }
    }
}
