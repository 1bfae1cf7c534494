//! Snap Memory
//!
//! What the first successful run remembers. Each value is written at most
//! once per instance and never cleared.

use crate::geometry::Pose;
use serde::{Deserialize, Serialize};

/// Values remembered from the first successful snap
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapMemory {
    /// Target pose local to the reference node
    pub initial_local_pose: Option<Pose>,
    /// Target height local to the reference node
    pub locked_local_height: Option<f32>,
}

impl SnapMemory {
    /// Remember the initial local pose. Returns false if one was already set.
    pub fn remember_initial_pose(&mut self, pose: Pose) -> bool {
        if self.initial_local_pose.is_some() {
            return false;
        }
        self.initial_local_pose = Some(pose);
        true
    }

    /// Lock the local height. Returns false if already locked.
    pub fn lock_height(&mut self, height: f32) -> bool {
        if self.locked_local_height.is_some() {
            return false;
        }
        self.locked_local_height = Some(height);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.initial_local_pose.is_none() && self.locked_local_height.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;

    #[test]
    fn test_values_set_once() {
        let mut memory = SnapMemory::default();
        assert!(memory.is_empty());

        assert!(memory.lock_height(0.005));
        assert!(!memory.lock_height(2.0));
        assert_eq!(memory.locked_local_height, Some(0.005));

        let first = Pose::at(Vec3::new(0.0, 0.005, 0.0));
        assert!(memory.remember_initial_pose(first));
        assert!(!memory.remember_initial_pose(Pose::IDENTITY));
        assert_eq!(memory.initial_local_pose, Some(first));
    }
}
