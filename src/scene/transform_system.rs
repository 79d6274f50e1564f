//! Transform System
//!
//! Hierarchy matrix propagation, kept apart from [`Scene`](crate::scene::Scene)
//! so it only borrows the node storage and the camera component map.
//!
//! Two entry points:
//! - [`update_hierarchy`]: walks the tree from a root with an explicit stack,
//!   rebuilding world matrices only below nodes whose local TRS changed.
//! - [`compose_world`]: composes a single node's world matrix straight from
//!   its ancestors' TRS fields. Never stale, O(depth).

use glam::Affine3A;
use slotmap::{SlotMap, SparseSecondaryMap};

use crate::scene::NodeHandle;
use crate::scene::camera::Camera;
use crate::scene::node::Node;

/// Propagates world matrices below `root`.
///
/// Returns the number of nodes whose world matrix was rewritten.
pub fn update_hierarchy(
    nodes: &mut SlotMap<NodeHandle, Node>,
    cameras: &mut SparseSecondaryMap<NodeHandle, Camera>,
    root: NodeHandle,
) -> usize {
    let parent_world = nodes
        .get(root)
        .and_then(|n| n.parent)
        .and_then(|p| nodes.get(p))
        .map_or(Affine3A::IDENTITY, |p| *p.transform.world_matrix());

    // (node, parent world matrix, parent changed)
    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = Vec::with_capacity(64);
    stack.push((root, parent_world, false));
    let mut rewritten = 0;

    while let Some((handle, parent_world, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };

        let local_changed = node.transform.update_local_matrix();
        let world_changed = local_changed || parent_changed;

        if world_changed {
            let world = parent_world * *node.transform.local_matrix();
            node.transform.set_world_matrix(world);
            rewritten += 1;

            if let Some(camera) = cameras.get_mut(handle) {
                camera.update_view(&world);
            }
        }

        let world = *node.transform.world_matrix();
        // Reverse push keeps siblings in insertion order.
        for &child in node.children.iter().rev() {
            stack.push((child, world, world_changed));
        }
    }

    rewritten
}

/// Composes the world matrix of `handle` from the current TRS of the node and
/// all of its ancestors. Returns `None` for a stale handle.
#[must_use]
pub fn compose_world(nodes: &SlotMap<NodeHandle, Node>, handle: NodeHandle) -> Option<Affine3A> {
    let mut node = nodes.get(handle)?;
    let mut world = node.transform.compose();
    while let Some(parent) = node.parent {
        node = nodes.get(parent)?;
        world = node.transform.compose() * world;
    }
    Some(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn link(nodes: &mut SlotMap<NodeHandle, Node>, parent: NodeHandle, child: NodeHandle) {
        nodes[child].parent = Some(parent);
        nodes[parent].children.push(child);
    }

    #[test]
    fn hierarchy_update_composes_parent_first() {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();
        let mut cameras: SparseSecondaryMap<NodeHandle, Camera> = SparseSecondaryMap::new();

        let mut parent = Node::new("parent");
        parent.transform.position = Vec3::new(1.0, 0.0, 0.0);
        let parent = nodes.insert(parent);

        let mut child = Node::new("child");
        child.transform.position = Vec3::new(0.0, 1.0, 0.0);
        let child = nodes.insert(child);
        link(&mut nodes, parent, child);

        assert_eq!(update_hierarchy(&mut nodes, &mut cameras, parent), 2);
        let pos = nodes[child].transform.world_matrix().translation;
        assert!((pos.x - 1.0).abs() < 1e-5);
        assert!((pos.y - 1.0).abs() < 1e-5);

        // Nothing changed: nothing rewritten
        assert_eq!(update_hierarchy(&mut nodes, &mut cameras, parent), 0);

        // Moving the parent rewrites the whole subtree
        nodes[parent].transform.position.z = 2.0;
        assert_eq!(update_hierarchy(&mut nodes, &mut cameras, parent), 2);
        assert_eq!(
            compose_world(&nodes, child).unwrap(),
            *nodes[child].transform.world_matrix()
        );
    }

    #[test]
    fn compose_world_sees_uncommitted_writes() {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();
        let parent = nodes.insert(Node::new("parent"));
        let child = nodes.insert(Node::new("child"));
        link(&mut nodes, parent, child);

        nodes[parent].transform.position = Vec3::new(0.0, 0.0, -4.0);
        let world = compose_world(&nodes, child).unwrap();
        assert!((world.translation.z + 4.0).abs() < 1e-6);
    }
}
