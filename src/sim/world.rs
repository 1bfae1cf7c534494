//! Scripted simulation world
//!
//! Wires one set of in-memory collaborators into the node layout the
//! coordination core expects:
//!
//! ```text
//! Reference            (mirrors the tracking origin)
//! SharedAnchor         (replicated anchor)
//! ContentRoot
//!   └─ SnapTarget      (object lowered to the floor)
//! Floor                (ground collider owner)
//! ExternalSensing      (third-party sensing root)
//! ```

use super::devices::{
    MemoryFeedback, MemoryPermissions, MemoryPlanes, MemorySensing, MemorySession,
    MemoryTracking, PermissionMode,
};
use super::ground::{GroundSurface, MemoryGround};
use super::scene::MemoryScene;
use crate::collaborators::{
    Collider, ColliderKind, Collaborators, FeedbackSink, FrameNodes, GroundQuery,
    LocalizationEvent, NodeId, PermissionOutcome, PermissionService, PlaneSubsystem, SceneGraph,
    SensingSubsystem, Session, Tracking,
};
use crate::geometry::{Pose, Vec3};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tokio::sync::broadcast;

/// Which participant the simulated process is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimRole {
    /// Running session, this process is the server
    #[default]
    Host,
    /// Running session, plain peer
    Follower,
    /// No networked session at all
    NoSession,
}

impl SimRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Follower => "follower",
            Self::NoSession => "none",
        }
    }
}

/// Builder for [`SimWorld`]
#[derive(Debug, Clone)]
pub struct SimWorldBuilder {
    role: SimRole,
    start_position: Vec3,
    ground_height: Option<f32>,
    permission_mode: PermissionMode,
    sensing_ready: bool,
    target_size: Option<Vec3>,
    origin: Pose,
    with_grounding_point: Option<f32>,
}

impl Default for SimWorldBuilder {
    fn default() -> Self {
        Self {
            role: SimRole::Host,
            start_position: Vec3::new(0.0, 1.0, 0.0),
            ground_height: Some(0.0),
            permission_mode: PermissionMode::Auto(PermissionOutcome::Granted),
            sensing_ready: true,
            target_size: None,
            origin: Pose::IDENTITY,
            with_grounding_point: None,
        }
    }
}

impl SimWorldBuilder {
    pub fn role(mut self, role: SimRole) -> Self {
        self.role = role;
        self
    }

    /// World position of the snap target at startup.
    pub fn start_position(mut self, position: Vec3) -> Self {
        self.start_position = position;
        self
    }

    /// `None` leaves the world without any floor.
    pub fn ground_height(mut self, height: Option<f32>) -> Self {
        self.ground_height = height;
        self
    }

    pub fn permission_mode(mut self, mode: PermissionMode) -> Self {
        self.permission_mode = mode;
        self
    }

    pub fn sensing_ready(mut self, ready: bool) -> Self {
        self.sensing_ready = ready;
        self
    }

    /// Give the snap target a renderable box centered on its origin.
    pub fn target_size(mut self, size: Vec3) -> Self {
        self.target_size = Some(size);
        self
    }

    /// Initial tracking origin.
    pub fn origin(mut self, origin: Pose) -> Self {
        self.origin = origin;
        self
    }

    /// Add a grounding point this far below the snap target origin.
    pub fn grounding_point(mut self, depth: f32) -> Self {
        self.with_grounding_point = Some(depth);
        self
    }

    pub fn build(self) -> SimWorld {
        let scene = Rc::new(MemoryScene::new());
        let reference = scene.add_node("Reference", None, self.origin);
        let anchor = scene.add_node("SharedAnchor", None, Pose::IDENTITY);
        let content_root = scene.add_node("ContentRoot", None, Pose::IDENTITY);
        let snap_target =
            scene.add_node("SnapTarget", Some(content_root), Pose::at(self.start_position));
        let floor = scene.add_node("Floor", None, Pose::IDENTITY);
        let external_root = scene.add_node("ExternalSensing", None, Pose::IDENTITY);

        if let Some(size) = self.target_size {
            scene.set_renderable(snap_target, Vec3::ZERO, size);
        }
        let grounding_point = self.with_grounding_point.map(|depth| {
            scene.add_node(
                "GroundingPoint",
                Some(snap_target),
                Pose::at(Vec3::new(0.0, -depth, 0.0)),
            )
        });

        let ground = Rc::new(MemoryGround::new());
        if let Some(height) = self.ground_height {
            ground.add_surface(GroundSurface::new(
                height,
                Collider::new(floor, ColliderKind::Plane),
            ));
        }

        let session = match self.role {
            SimRole::Host => Some(Rc::new(MemorySession::running_server())),
            SimRole::Follower => Some(Rc::new(MemorySession::running_peer())),
            SimRole::NoSession => None,
        };

        let (localization, _) = broadcast::channel(16);

        SimWorld {
            role: self.role,
            scene,
            session,
            tracking: Rc::new(MemoryTracking::new(self.origin)),
            sensing: Rc::new(MemorySensing::new(self.sensing_ready)),
            planes: Rc::new(MemoryPlanes::new()),
            permissions: Rc::new(MemoryPermissions::new(self.permission_mode)),
            ground,
            feedback: Rc::new(MemoryFeedback::new()),
            localization,
            nodes: FrameNodes {
                content_root: Some(content_root),
                anchor: Some(anchor),
                snap_target: Some(snap_target),
                reference: Some(reference),
                grounding_point,
                external_sensing_root: Some(external_root),
            },
            floor,
        }
    }
}

/// One simulated participant and its collaborators
pub struct SimWorld {
    pub role: SimRole,
    pub scene: Rc<MemoryScene>,
    pub session: Option<Rc<MemorySession>>,
    pub tracking: Rc<MemoryTracking>,
    pub sensing: Rc<MemorySensing>,
    pub planes: Rc<MemoryPlanes>,
    pub permissions: Rc<MemoryPermissions>,
    pub ground: Rc<MemoryGround>,
    pub feedback: Rc<MemoryFeedback>,
    pub localization: broadcast::Sender<LocalizationEvent>,
    pub nodes: FrameNodes,
    pub floor: NodeId,
}

impl SimWorld {
    pub fn builder() -> SimWorldBuilder {
        SimWorldBuilder::default()
    }

    /// Collaborator set handed to the coordination core.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            scene: self.scene.clone() as Rc<dyn SceneGraph>,
            session: self.session.clone().map(|s| s as Rc<dyn Session>),
            tracking: Some(self.tracking.clone() as Rc<dyn Tracking>),
            sensing: Some(self.sensing.clone() as Rc<dyn SensingSubsystem>),
            planes: Some(self.planes.clone() as Rc<dyn PlaneSubsystem>),
            permissions: self.permissions.clone() as Rc<dyn PermissionService>,
            ground: self.ground.clone() as Rc<dyn GroundQuery>,
            feedback: Some(self.feedback.clone() as Rc<dyn FeedbackSink>),
            localization: Some(self.localization.clone()),
        }
    }

    pub fn nodes(&self) -> FrameNodes {
        self.nodes
    }

    /// Publish a `Localized` transition. Returns the number of subscribers.
    pub fn localize(&self) -> usize {
        self.localization
            .send(LocalizationEvent::localized())
            .unwrap_or(0)
    }

    /// World pose of the snap target.
    pub fn target_pose(&self) -> Option<Pose> {
        self.nodes
            .snap_target
            .and_then(|node| self.scene.world_pose(node))
    }

    /// Move the tracking origin, as a map correction would.
    pub fn shift_origin(&self, origin: Pose) {
        self.tracking.set_origin(origin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let world = SimWorld::builder().build();
        let nodes = world.nodes();

        let target = nodes.snap_target.unwrap();
        assert_eq!(world.scene.parent(target), nodes.content_root);
        assert!((world.target_pose().unwrap().position.y - 1.0).abs() < 1e-6);
        assert!(world.session.as_ref().unwrap().is_server());
        assert!(nodes.grounding_point.is_none());
    }

    #[test]
    fn test_no_session_role() {
        let world = SimWorld::builder().role(SimRole::NoSession).build();
        assert!(world.session.is_none());
        assert!(world.collaborators().session.is_none());
    }

    #[test]
    fn test_localize_without_subscribers() {
        let world = SimWorld::builder().build();
        assert_eq!(world.localize(), 0);

        let mut rx = world.localization.subscribe();
        assert_eq!(world.localize(), 1);
        assert!(rx.try_recv().unwrap().is_localized());
    }
}
