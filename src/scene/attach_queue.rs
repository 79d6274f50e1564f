//! Asynchronous subtree attachment.
//!
//! [`AsyncAttachQueue::request_attach`] records a [`PendingAttachment`] and
//! hands a [`LoadCompletion`] to the external loader. Completions arrive on a
//! single-consumer channel and are only applied in [`AsyncAttachQueue::drain`],
//! which the frame driver calls at a fixed point before submission. The scene
//! graph is therefore never touched from a loader thread and never changes
//! mid-render.
//!
//! The parent is validated when the result is committed, not when it is
//! requested:
//! - parent destroyed: the result is discarded (no-op)
//! - parent detached from the live graph: the subtree is attached to the
//!   orphaned parent and stays unreachable from the scene root

use std::fmt;

use rustc_hash::FxHashMap;

use crate::assets::loader::{AssetLoader, AssetSource, LoadCompletion, LoadResult};
use crate::errors::GroveError;
use crate::scene::transform::Transform;
use crate::scene::{NodeHandle, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttachId(u64);

impl fmt::Display for AttachId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attach#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct PendingAttachment {
    pub id: AttachId,
    pub source: AssetSource,
    pub parent: NodeHandle,
    pub local_transform: Transform,
}

#[derive(Debug)]
pub enum AttachOutcome {
    /// Subtree created and attached. `live` is `false` when the parent had
    /// been detached from the scene root in the meantime.
    Attached {
        id: AttachId,
        source: AssetSource,
        root: NodeHandle,
        live: bool,
    },
    /// The parent no longer exists; the loaded subtree was discarded.
    ParentGone { id: AttachId, source: AssetSource },
    /// The loader reported a failure (or returned an unusable prefab).
    Failed {
        id: AttachId,
        source: AssetSource,
        error: GroveError,
    },
}

impl AttachOutcome {
    #[must_use]
    pub fn id(&self) -> AttachId {
        match self {
            Self::Attached { id, .. } | Self::ParentGone { id, .. } | Self::Failed { id, .. } => {
                *id
            }
        }
    }

    #[must_use]
    pub fn attached_root(&self) -> Option<NodeHandle> {
        match self {
            Self::Attached { root, .. } => Some(*root),
            _ => None,
        }
    }
}

pub struct AsyncAttachQueue {
    pending: FxHashMap<AttachId, PendingAttachment>,
    tx: flume::Sender<(AttachId, LoadResult)>,
    rx: flume::Receiver<(AttachId, LoadResult)>,
    next_id: u64,
    attached_roots: Vec<NodeHandle>,
}

impl Default for AsyncAttachQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncAttachQueue {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            pending: FxHashMap::default(),
            tx,
            rx,
            next_id: 1,
            attached_roots: Vec::new(),
        }
    }

    /// Registers a pending attachment and starts the load. Never blocks.
    pub fn request_attach(
        &mut self,
        loader: &dyn AssetLoader,
        source: impl Into<AssetSource>,
        parent: NodeHandle,
        local_transform: Transform,
    ) -> AttachId {
        let id = AttachId(self.next_id);
        self.next_id += 1;
        let source = source.into();

        log::debug!("{id}: requesting '{source}' under {parent:?}");
        self.pending.insert(
            id,
            PendingAttachment {
                id,
                source: source.clone(),
                parent,
                local_transform,
            },
        );

        loader.load(&source, LoadCompletion::new(id, self.tx.clone()));
        id
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_pending(&self, id: AttachId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingAttachment> {
        self.pending.values()
    }

    /// Roots of the subtrees this queue has attached that still exist, in
    /// commit order. Removed roots are pruned on the next [`Self::drain`].
    #[must_use]
    pub fn attached_roots(&self) -> &[NodeHandle] {
        &self.attached_roots
    }

    /// Applies every completion received so far, in arrival order.
    pub fn drain(&mut self, scene: &mut Scene) -> Vec<AttachOutcome> {
        self.attached_roots.retain(|&root| scene.contains(root));
        let mut outcomes = Vec::new();
        while let Ok((id, result)) = self.rx.try_recv() {
            let Some(pending) = self.pending.remove(&id) else {
                log::warn!("{id}: completion for unknown or already resolved attachment");
                continue;
            };
            outcomes.push(self.commit(scene, pending, result));
        }
        outcomes
    }

    fn commit(
        &mut self,
        scene: &mut Scene,
        pending: PendingAttachment,
        result: LoadResult,
    ) -> AttachOutcome {
        let PendingAttachment {
            id,
            source,
            parent,
            local_transform,
        } = pending;

        let prefab = match result {
            Ok(prefab) => prefab,
            Err(error) => {
                log::error!("{id}: loading '{source}' failed: {error}");
                return AttachOutcome::Failed { id, source, error };
            }
        };

        if !scene.contains(parent) {
            log::warn!("{id}: parent of '{source}' was removed before the load finished");
            return AttachOutcome::ParentGone { id, source };
        }

        let root = match prefab.instantiate(scene) {
            Ok(root) => root,
            Err(error) => {
                log::error!("{id}: '{source}' produced an invalid subtree: {error}");
                return AttachOutcome::Failed { id, source, error };
            }
        };

        if let Some(node) = scene.get_node_mut(root) {
            let composed = local_transform.compose() * node.transform.compose();
            node.transform.apply_local_matrix(composed);
        }

        if let Err(error) = scene.attach(parent, root) {
            // Fresh root: only reachable on a stale parent, drop the orphan
            let _ = scene.remove_node(root);
            log::error!("{id}: attaching '{source}' failed: {error}");
            return AttachOutcome::Failed { id, source, error };
        }

        let live = scene.is_live(root);
        if live {
            log::debug!("{id}: attached '{source}' as {root:?}");
        } else {
            log::warn!("{id}: parent of '{source}' is detached; subtree attached off-scene");
        }
        self.attached_roots.push(root);
        AttachOutcome::Attached {
            id,
            source,
            root,
            live,
        }
    }
}
