use bitflags::bitflags;

use crate::assets::{GeometryHandle, MaterialHandle};
use crate::scene::NodeHandle;
use crate::scene::transform::Transform;
use glam::Affine3A;

bitflags! {
    /// Per-node shadow participation.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ShadowFlags: u8 {
        const CAST    = 1 << 0;
        const RECEIVE = 1 << 1;
    }
}

/// Render-time payload: a geometry/material pair shared by reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderable {
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
}

impl Renderable {
    #[must_use]
    pub fn new(geometry: GeometryHandle, material: MaterialHandle) -> Self {
        Self { geometry, material }
    }
}

/// A scene node.
///
/// Only hierarchy, transform and the small per-node flags live here; lights
/// and cameras are stored in the scene's component maps keyed by the node
/// handle.
///
/// The `parent`/`children` links are owned by [`Scene`](crate::scene::Scene)
/// and can only be changed through its `attach`/`detach` API, which keeps
/// both sides in sync and enforces the single-parent rule.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    pub transform: Transform,

    pub visible: bool,
    pub shadows: ShadowFlags,
    pub renderable: Option<Renderable>,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            visible: true,
            shadows: ShadowFlags::empty(),
            renderable: None,
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_renderable(mut self, renderable: Renderable) -> Self {
        self.renderable = Some(renderable);
        self
    }

    #[must_use]
    pub fn with_shadows(mut self, shadows: ShadowFlags) -> Self {
        self.shadows = shadows;
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn cast_shadow(&self) -> bool {
        self.shadows.contains(ShadowFlags::CAST)
    }

    #[inline]
    #[must_use]
    pub fn receive_shadow(&self) -> bool {
        self.shadows.contains(ShadowFlags::RECEIVE)
    }

    /// World matrix as of the last hierarchy update.
    ///
    /// Use [`Scene::world_transform`](crate::scene::Scene::world_transform)
    /// when the value must reflect uncommitted TRS writes.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        self.transform.world_matrix()
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("Node")
    }
}
