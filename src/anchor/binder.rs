//! Content Binder

use crate::collaborators::{NodeId, SceneGraph};
use crate::observability::{log_event, Event};
use std::rc::Rc;

/// Result of one bind attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// Content moved under the anchor, world pose preserved
    Reparented,
    /// Content already parented under the anchor
    AlreadyBound,
    /// Content root or anchor unavailable
    MissingNode,
}

/// Keeps the content root parented under the shared anchor.
pub struct ContentBinder {
    scene: Rc<dyn SceneGraph>,
    content: Option<NodeId>,
    anchor: Option<NodeId>,
}

impl ContentBinder {
    pub fn new(scene: Rc<dyn SceneGraph>, content: Option<NodeId>, anchor: Option<NodeId>) -> Self {
        Self {
            scene,
            content,
            anchor,
        }
    }

    /// Reparent content under the anchor unless it is already there.
    pub fn bind(&self) -> BindOutcome {
        let (Some(content), Some(anchor)) = (self.content, self.anchor) else {
            log_event(Event::ContentBindSkipped, &[("reason", "not_configured")]);
            return BindOutcome::MissingNode;
        };
        if !self.scene.exists(content) || !self.scene.exists(anchor) {
            log_event(Event::ContentBindSkipped, &[("reason", "node_missing")]);
            return BindOutcome::MissingNode;
        }
        if self.scene.parent(content) == Some(anchor) {
            return BindOutcome::AlreadyBound;
        }

        self.scene.set_parent(content, Some(anchor), true);
        log_event(
            Event::ContentBound,
            &[
                ("anchor", &anchor.to_string()),
                ("content", &content.to_string()),
            ],
        );
        BindOutcome::Reparented
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Pose, Quat, Vec3};
    use crate::sim::MemoryScene;

    fn setup() -> (Rc<MemoryScene>, NodeId, NodeId) {
        let scene = Rc::new(MemoryScene::new());
        let anchor = scene.add_node(
            "anchor",
            None,
            Pose::new(Vec3::new(3.0, 0.0, 1.0), Quat::from_yaw(90.0)),
        );
        let content = scene.add_node("content", None, Pose::at(Vec3::new(0.0, 1.0, 0.0)));
        (scene, anchor, content)
    }

    #[test]
    fn test_bind_twice_reparents_once() {
        let (scene, anchor, content) = setup();
        let binder = ContentBinder::new(scene.clone(), Some(content), Some(anchor));

        assert_eq!(binder.bind(), BindOutcome::Reparented);
        assert_eq!(binder.bind(), BindOutcome::AlreadyBound);

        assert_eq!(scene.reparent_count(), 1);
        assert_eq!(scene.parent(content), Some(anchor));
    }

    #[test]
    fn test_bind_preserves_world_pose() {
        let (scene, anchor, content) = setup();
        let before = scene.world_pose(content).unwrap();

        ContentBinder::new(scene.clone(), Some(content), Some(anchor)).bind();

        let after = scene.world_pose(content).unwrap();
        assert!(after.position.distance(before.position) < 1e-5);
    }

    #[test]
    fn test_missing_nodes_skip() {
        let (scene, anchor, _) = setup();
        assert_eq!(
            ContentBinder::new(scene.clone(), None, Some(anchor)).bind(),
            BindOutcome::MissingNode
        );
        assert_eq!(
            ContentBinder::new(scene.clone(), Some(NodeId(999)), Some(anchor)).bind(),
            BindOutcome::MissingNode
        );
        assert_eq!(scene.reparent_count(), 0);
    }
}
