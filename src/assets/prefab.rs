use crate::errors::{GroveError, Result};
use crate::scene::node::{Node, Renderable, ShadowFlags};
use crate::scene::transform::Transform;
use crate::scene::{NodeHandle, Scene};

/// Prefab node: plain data, children referenced by index into [`Prefab::nodes`].
#[derive(Debug, Clone, Default)]
pub struct PrefabNode {
    pub name: Option<String>,
    pub transform: Transform,
    pub children_indices: Vec<usize>,
    pub renderable: Option<Renderable>,
    pub shadows: ShadowFlags,
}

impl PrefabNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// What an asset loader hands back: a self-contained node hierarchy.
///
/// A prefab holds no [`NodeHandle`]s, so it can be built on any thread and
/// sent to the frame thread. [`Prefab::instantiate`] turns it into a detached
/// subtree of a [`Scene`].
#[derive(Debug, Clone, Default)]
pub struct Prefab {
    pub name: String,
    pub nodes: Vec<PrefabNode>,
    pub root_indices: Vec<usize>,
}

impl Prefab {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a node and returns its index.
    pub fn push(&mut self, node: PrefabNode, parent: Option<usize>) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(parent) => parent.children_indices.push(index),
            None => self.root_indices.push(index),
        }
        index
    }

    /// Checks that every child index is in range and referenced once.
    pub fn validate(&self) -> Result<()> {
        let mut seen = vec![false; self.nodes.len()];
        let referenced = self
            .root_indices
            .iter()
            .chain(self.nodes.iter().flat_map(|n| n.children_indices.iter()));
        for &index in referenced {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(GroveError::asset_load(
                        &self.name,
                        format!("prefab node {index} is referenced twice"),
                    ));
                }
                None => {
                    return Err(GroveError::asset_load(
                        &self.name,
                        format!("prefab node index {index} out of range"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Creates the prefab's nodes in `scene` as one detached subtree and
    /// returns its root. Several prefab roots are grouped under a new node.
    pub fn instantiate(&self, scene: &mut Scene) -> Result<NodeHandle> {
        self.validate()?;

        let root = match self.root_indices.as_slice() {
            [single] => self.spawn(scene, *single),
            _ => scene.create_node(Node::new(self.name.clone())),
        };

        let mut stack: Vec<(usize, NodeHandle)> = Vec::new();
        if let [single] = self.root_indices.as_slice() {
            stack.push((*single, root));
        } else {
            for &index in &self.root_indices {
                let handle = self.spawn(scene, index);
                scene.attach(root, handle)?;
                stack.push((index, handle));
            }
        }

        while let Some((index, handle)) = stack.pop() {
            for &child_index in &self.nodes[index].children_indices {
                let child = self.spawn(scene, child_index);
                scene.attach(handle, child)?;
                stack.push((child_index, child));
            }
        }

        Ok(root)
    }

    fn spawn(&self, scene: &mut Scene, index: usize) -> NodeHandle {
        let data = &self.nodes[index];
        let name = data.name.clone().unwrap_or_else(|| format!("{}#{index}", self.name));
        let mut node = Node::new(name)
            .with_transform(data.transform.clone())
            .with_shadows(data.shadows);
        node.renderable = data.renderable;
        scene.create_node(node)
    }
}
