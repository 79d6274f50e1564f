use glam::Affine3A;
use slotmap::{SlotMap, SparseSecondaryMap};

use crate::errors::{GroveError, Result};
use crate::scene::NodeHandle;
use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::node::Node;
use crate::scene::transform_system;

/// Structural snapshot of a scene graph: every node with its parent and
/// ordered children. Two snapshots compare equal iff the hierarchy is identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSnapshot {
    entries: Vec<(NodeHandle, Option<NodeHandle>, Vec<NodeHandle>)>,
}

impl GraphSnapshot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scene graph.
///
/// Owns every node and the light/camera component maps. The graph has exactly
/// one root (created with the scene, never removable). Nodes created with
/// [`Scene::create_node`] start out orphaned; they become part of the live
/// graph once attached below the root.
///
/// Structural mutations (`attach`, `detach`, `remove_node`) validate first and
/// mutate second, so a rejected call leaves the graph untouched.
pub struct Scene {
    nodes: SlotMap<NodeHandle, Node>,
    root: NodeHandle,

    // Component maps
    pub lights: SparseSecondaryMap<NodeHandle, Light>,
    pub cameras: SparseSecondaryMap<NodeHandle, Camera>,

    pub active_camera: Option<NodeHandle>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new("Scene"));
        Self {
            nodes,
            root,
            lights: SparseSecondaryMap::new(),
            cameras: SparseSecondaryMap::new(),
            active_camera: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    // ========================================================================
    // Node creation & lookup
    // ========================================================================

    /// Inserts a detached node.
    pub fn create_node(&mut self, node: Node) -> NodeHandle {
        let mut node = node;
        node.parent = None;
        node.children.clear();
        node.transform.mark_dirty();
        self.nodes.insert(node)
    }

    /// Inserts a node directly under the scene root.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.create_node(node);
        self.link(self.root, handle);
        handle
    }

    /// Inserts a node under `parent`.
    pub fn add_to_parent(&mut self, node: Node, parent: NodeHandle) -> Result<NodeHandle> {
        if !self.nodes.contains_key(parent) {
            return Err(GroveError::NodeNotFound(parent));
        }
        let handle = self.create_node(node);
        self.link(parent, handle);
        Ok(handle)
    }

    pub fn add_light(&mut self, light: Light, parent: NodeHandle) -> Result<NodeHandle> {
        let handle = self.add_to_parent(Node::new("Light"), parent)?;
        self.lights.insert(handle, light);
        Ok(handle)
    }

    pub fn add_camera(&mut self, camera: Camera, parent: NodeHandle) -> Result<NodeHandle> {
        let handle = self.add_to_parent(Node::new("Camera"), parent)?;
        self.cameras.insert(handle, camera);
        Ok(handle)
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn children(&self, handle: NodeHandle) -> &[NodeHandle] {
        self.nodes.get(handle).map_or(&[], |n| n.children.as_slice())
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Returns `true` if `ancestor` is `node` itself or one of its ancestors.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = Some(node);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.nodes.get(handle).and_then(|n| n.parent);
        }
        false
    }

    /// Returns `true` if `handle` is reachable from the scene root.
    #[must_use]
    pub fn is_live(&self, handle: NodeHandle) -> bool {
        self.contains(handle) && self.is_ancestor_or_self(self.root, handle)
    }

    /// Attaches `child` (and its subtree) as the last child of `parent`.
    ///
    /// # Errors
    /// - [`GroveError::Cycle`] if `child` is `parent` or one of its ancestors
    /// - [`GroveError::DuplicateParent`] if `child` already has a parent
    /// - [`GroveError::NodeNotFound`] for stale handles
    pub fn attach(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<()> {
        if !self.nodes.contains_key(parent) {
            return Err(GroveError::NodeNotFound(parent));
        }
        let Some(child_node) = self.nodes.get(child) else {
            return Err(GroveError::NodeNotFound(child));
        };
        if child == self.root {
            return Err(GroveError::RootImmutable("re-parented"));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(GroveError::Cycle { parent, child });
        }
        if let Some(current_parent) = child_node.parent {
            return Err(GroveError::DuplicateParent {
                child,
                current_parent,
            });
        }

        self.link(parent, child);
        Ok(())
    }

    /// Detaches `handle` from its parent. The subtree stays intact and can be
    /// re-attached elsewhere. Detaching an orphan is a no-op.
    pub fn detach(&mut self, handle: NodeHandle) -> Result<()> {
        if handle == self.root {
            return Err(GroveError::RootImmutable("detached"));
        }
        let Some(node) = self.nodes.get_mut(handle) else {
            return Err(GroveError::NodeNotFound(handle));
        };
        let Some(parent) = node.parent.take() else {
            return Ok(());
        };
        node.transform.mark_dirty();

        if let Some(parent_node) = self.nodes.get_mut(parent)
            && let Some(pos) = parent_node.children.iter().position(|&c| c == handle)
        {
            parent_node.children.remove(pos);
        }
        Ok(())
    }

    /// Destroys `handle` and its whole subtree, including components.
    pub fn remove_node(&mut self, handle: NodeHandle) -> Result<()> {
        if handle == self.root {
            return Err(GroveError::RootImmutable("removed"));
        }
        self.detach(handle)?;

        for doomed in self.collect_subtree(handle) {
            self.lights.remove(doomed);
            self.cameras.remove(doomed);
            if self.active_camera == Some(doomed) {
                log::warn!("Active camera node was removed");
                self.active_camera = None;
            }
            self.nodes.remove(doomed);
        }
        Ok(())
    }

    fn link(&mut self, parent: NodeHandle, child: NodeHandle) {
        self.nodes[parent].children.push(child);
        let child_node = &mut self.nodes[child];
        child_node.parent = Some(parent);
        child_node.transform.mark_dirty();
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Depth-first pre-order traversal of the subtree at `start`, siblings in
    /// insertion order.
    #[must_use]
    pub fn collect_subtree(&self, start: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        if !self.nodes.contains_key(start) {
            return out;
        }
        let mut stack = vec![start];
        while let Some(handle) = stack.pop() {
            out.push(handle);
            if let Some(node) = self.nodes.get(handle) {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Render traversal order of the live graph.
    #[must_use]
    pub fn traverse(&self) -> Vec<NodeHandle> {
        self.collect_subtree(self.root)
    }

    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            entries: self
                .nodes
                .iter()
                .map(|(h, n)| (h, n.parent, n.children.clone()))
                .collect(),
        }
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    /// World transform of `handle`, composed from the current local transforms
    /// of the node and its ancestors.
    pub fn world_transform(&self, handle: NodeHandle) -> Result<Affine3A> {
        transform_system::compose_world(&self.nodes, handle).ok_or(GroveError::NodeNotFound(handle))
    }

    #[must_use]
    pub fn local_transform(&self, handle: NodeHandle) -> Option<Affine3A> {
        self.nodes.get(handle).map(|n| n.transform.compose())
    }

    /// Refreshes cached world matrices (and camera view matrices) of the live
    /// graph. Called once per frame before submission.
    pub fn update_matrix_world(&mut self) -> usize {
        transform_system::update_hierarchy(&mut self.nodes, &mut self.cameras, self.root)
    }

    // ========================================================================
    // Component queries
    // ========================================================================

    pub fn main_camera_mut(&mut self) -> Option<(&mut Node, &mut Camera)> {
        let handle = self.active_camera?;
        let camera = self.cameras.get_mut(handle)?;
        let node = self.nodes.get_mut(handle)?;
        Some((node, camera))
    }

    #[must_use]
    pub fn main_camera(&self) -> Option<&Camera> {
        self.cameras.get(self.active_camera?)
    }

    /// Lights reachable from the root together with their world matrices.
    pub fn iter_active_lights(&self) -> impl Iterator<Item = (NodeHandle, &Light, &Affine3A)> {
        self.lights.iter().filter_map(move |(handle, light)| {
            if !self.is_live(handle) {
                return None;
            }
            let node = self.nodes.get(handle)?;
            node.visible.then_some((handle, light, node.transform.world_matrix()))
        })
    }
}
