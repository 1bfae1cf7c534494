//! In-memory scene graph

use crate::collaborators::{NodeId, SceneGraph};
use crate::geometry::{Aabb, Pose, Vec3};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct NodeData {
    name: String,
    parent: Option<NodeId>,
    local: Pose,
    active: bool,
    /// Renderable box: center offset in local space and full size
    renderable: Option<(Vec3, Vec3)>,
}

/// Rigid transform hierarchy.
///
/// Renderable bounds are axis-aligned around the transformed center; node
/// rotation does not rotate the box.
#[derive(Debug, Default)]
pub struct MemoryScene {
    nodes: RefCell<BTreeMap<NodeId, NodeData>>,
    next_id: Cell<u64>,
    reparent_count: Cell<usize>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with `local` pose under `parent` (world pose when `None`).
    pub fn add_node(&self, name: &str, parent: Option<NodeId>, local: Pose) -> NodeId {
        let id = NodeId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.nodes.borrow_mut().insert(
            id,
            NodeData {
                name: name.to_string(),
                parent,
                local,
                active: true,
                renderable: None,
            },
        );
        id
    }

    /// Attach a renderable box to `node`.
    pub fn set_renderable(&self, node: NodeId, center: Vec3, size: Vec3) {
        if let Some(data) = self.nodes.borrow_mut().get_mut(&node) {
            data.renderable = Some((center, size));
        }
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .borrow()
            .iter()
            .find(|(_, data)| data.name == name)
            .map(|(id, _)| *id)
    }

    pub fn name(&self, node: NodeId) -> Option<String> {
        self.nodes.borrow().get(&node).map(|d| d.name.clone())
    }

    pub fn is_active(&self, node: NodeId) -> bool {
        self.nodes.borrow().get(&node).map_or(false, |d| d.active)
    }

    /// Number of `set_parent` calls applied so far.
    pub fn reparent_count(&self) -> usize {
        self.reparent_count.get()
    }

    fn world_of(&self, nodes: &BTreeMap<NodeId, NodeData>, node: NodeId) -> Option<Pose> {
        let mut chain = Vec::new();
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            let data = nodes.get(&id)?;
            chain.push(data.local);
            cursor = data.parent;
        }
        Some(
            chain
                .iter()
                .rev()
                .fold(Pose::IDENTITY, |world, local| world.compose(local)),
        )
    }

    fn descends(nodes: &BTreeMap<NodeId, NodeData>, node: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = nodes.get(&id).and_then(|d| d.parent);
        }
        false
    }
}

impl SceneGraph for MemoryScene {
    fn exists(&self, node: NodeId) -> bool {
        self.nodes.borrow().contains_key(&node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.borrow().get(&node).and_then(|d| d.parent)
    }

    fn set_parent(&self, node: NodeId, parent: Option<NodeId>, keep_world: bool) {
        let mut nodes = self.nodes.borrow_mut();
        if !nodes.contains_key(&node) {
            return;
        }
        if let Some(p) = parent {
            // Refuse unknown parents and cycles
            if !nodes.contains_key(&p) || Self::descends(&nodes, p, node) {
                return;
            }
        }

        let new_local = if keep_world {
            let world = self.world_of(&nodes, node);
            let parent_world = parent.and_then(|p| self.world_of(&nodes, p));
            match (world, parent_world) {
                (Some(w), Some(pw)) => Some(w.relative_to(&pw)),
                (Some(w), None) => Some(w),
                _ => None,
            }
        } else {
            None
        };

        if let Some(data) = nodes.get_mut(&node) {
            data.parent = parent;
            if let Some(local) = new_local {
                data.local = local;
            }
        }
        self.reparent_count.set(self.reparent_count.get() + 1);
    }

    fn world_pose(&self, node: NodeId) -> Option<Pose> {
        let nodes = self.nodes.borrow();
        self.world_of(&nodes, node)
    }

    fn set_world_pose(&self, node: NodeId, pose: Pose) {
        let mut nodes = self.nodes.borrow_mut();
        let parent = match nodes.get(&node) {
            Some(data) => data.parent,
            None => return,
        };
        let local = match parent.and_then(|p| self.world_of(&nodes, p)) {
            Some(parent_world) => pose.relative_to(&parent_world),
            None => pose,
        };
        if let Some(data) = nodes.get_mut(&node) {
            data.local = local;
        }
    }

    fn local_pose(&self, node: NodeId) -> Option<Pose> {
        self.nodes.borrow().get(&node).map(|d| d.local)
    }

    fn set_local_pose(&self, node: NodeId, pose: Pose) {
        if let Some(data) = self.nodes.borrow_mut().get_mut(&node) {
            data.local = pose;
        }
    }

    fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        Self::descends(&self.nodes.borrow(), node, ancestor)
    }

    fn renderable_bounds(&self, node: NodeId) -> Vec<Aabb> {
        let nodes = self.nodes.borrow();
        nodes
            .iter()
            .filter(|(id, _)| Self::descends(&nodes, **id, node))
            .filter_map(|(id, data)| {
                let (center, size) = data.renderable?;
                let world = self.world_of(&nodes, *id)?;
                Some(Aabb::from_center_size(world.transform_point(center), size))
            })
            .collect()
    }

    fn set_active(&self, node: NodeId, active: bool) {
        if let Some(data) = self.nodes.borrow_mut().get_mut(&node) {
            data.active = active;
        }
    }
}
