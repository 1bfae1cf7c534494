//! External Collaborator Interfaces
//!
//! The coordination core never reimplements rendering, sensing, transport,
//! permission dialogs or UI. It reaches them through these narrow traits.
//!
//! All methods take `&self`: collaborators own their mutability, and the
//! core shares them through `Rc` within one scheduling context.

mod ground;
mod scene;
mod sensing;
mod session;

pub use ground::{Collider, ColliderKind, FeedbackSink, GroundQuery, LayerMask, RayHit};
pub use scene::{NodeId, SceneGraph};
pub use sensing::{
    PermissionKind, PermissionOutcome, PermissionService, PlaneDetectionMode, PlaneSubsystem,
    SensingSubsystem,
};
pub use session::{LocalizationEvent, LocalizationState, Session, Tracking};

use std::rc::Rc;
use tokio::sync::broadcast;

/// Every collaborator one session instance talks to.
///
/// Resolved once by the embedder and passed in; nothing is searched for.
#[derive(Clone)]
pub struct Collaborators {
    pub scene: Rc<dyn SceneGraph>,
    /// `None` when no networked session exists at all
    pub session: Option<Rc<dyn Session>>,
    pub tracking: Option<Rc<dyn Tracking>>,
    pub sensing: Option<Rc<dyn SensingSubsystem>>,
    pub planes: Option<Rc<dyn PlaneSubsystem>>,
    pub permissions: Rc<dyn PermissionService>,
    pub ground: Rc<dyn GroundQuery>,
    pub feedback: Option<Rc<dyn FeedbackSink>>,
    /// Localization transitions; subscribed to only if something consumes them
    pub localization: Option<broadcast::Sender<LocalizationEvent>>,
}

/// Scene nodes the session operates on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameNodes {
    /// Root of displayed content, kept under the shared anchor
    pub content_root: Option<NodeId>,
    /// Replicated anchor node
    pub anchor: Option<NodeId>,
    /// Object lowered to the floor by the snap coordinator
    pub snap_target: Option<NodeId>,
    /// Local reference transform mirroring the tracking origin
    pub reference: Option<NodeId>,
    /// Explicit bottom point of the snap target
    pub grounding_point: Option<NodeId>,
    /// Optional third-party sensing root toggled with authority
    pub external_sensing_root: Option<NodeId>,
}
