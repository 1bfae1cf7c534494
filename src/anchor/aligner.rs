//! Anchor Aligner
//!
//! Write authority over the shared anchor:
//! - Only the Host writes, checked immediately before every write
//! - The reference node's world pose is preferred; the tracking origin is
//!   the fallback when no reference node is configured
//! - Missing anchor or reference pose skips the write

use crate::authority::AuthorityResolver;
use crate::collaborators::{NodeId, SceneGraph, Tracking};
use crate::geometry::Pose;
use crate::observability::{fmt_f32, log_event, Event};
use std::rc::Rc;

/// Result of one alignment attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlignOutcome {
    /// Anchor written with this world pose
    Aligned(Pose),
    /// This process is not the Host
    NotAuthority,
    /// No anchor node available
    NoAnchor,
    /// Neither a reference node nor a running tracking origin
    NoReferencePose,
}

impl AlignOutcome {
    pub fn is_aligned(&self) -> bool {
        matches!(self, Self::Aligned(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aligned(_) => "aligned",
            Self::NotAuthority => "not_authority",
            Self::NoAnchor => "no_anchor",
            Self::NoReferencePose => "no_reference_pose",
        }
    }
}

/// Anchor Aligner
pub struct AnchorAligner {
    authority: Rc<AuthorityResolver>,
    scene: Rc<dyn SceneGraph>,
    tracking: Option<Rc<dyn Tracking>>,
    anchor: Option<NodeId>,
    reference: Option<NodeId>,
}

impl AnchorAligner {
    pub fn new(
        authority: Rc<AuthorityResolver>,
        scene: Rc<dyn SceneGraph>,
        tracking: Option<Rc<dyn Tracking>>,
        anchor: Option<NodeId>,
        reference: Option<NodeId>,
    ) -> Self {
        Self {
            authority,
            scene,
            tracking,
            anchor,
            reference,
        }
    }

    /// Write the reference pose into the shared anchor if this process is Host.
    pub fn align(&self) -> AlignOutcome {
        let outcome = self.try_align();
        match outcome {
            AlignOutcome::Aligned(pose) => log_event(
                Event::AnchorAligned,
                &[
                    ("x", &fmt_f32(pose.position.x)),
                    ("y", &fmt_f32(pose.position.y)),
                    ("z", &fmt_f32(pose.position.z)),
                    ("yaw", &fmt_f32(pose.yaw_degrees())),
                ],
            ),
            // Followers skip silently; they never align
            AlignOutcome::NotAuthority => {}
            other => log_event(Event::AnchorAlignSkipped, &[("reason", other.as_str())]),
        }
        outcome
    }

    fn try_align(&self) -> AlignOutcome {
        let Some(anchor) = self.anchor.filter(|a| self.scene.exists(*a)) else {
            return AlignOutcome::NoAnchor;
        };
        if !self.authority.evaluate().is_host() {
            return AlignOutcome::NotAuthority;
        }
        let Some(pose) = self.reference_pose() else {
            return AlignOutcome::NoReferencePose;
        };
        self.scene.set_world_pose(anchor, pose);
        AlignOutcome::Aligned(pose)
    }

    fn reference_pose(&self) -> Option<Pose> {
        if let Some(reference) = self.reference {
            if let Some(pose) = self.scene.world_pose(reference) {
                return Some(pose);
            }
        }
        self.tracking
            .as_ref()
            .filter(|t| t.is_running())
            .map(|t| t.reference_origin())
    }
}
