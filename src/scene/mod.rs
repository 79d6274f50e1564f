//! Scene graph module
//!
//! - [`Scene`]: the node container (single root, exclusive parenting)
//! - [`Node`] / [`Transform`]: hierarchy and local TRS
//! - [`Camera`], [`Light`]: components keyed by node handle
//! - [`ShadowPolicy`]: static shadow budget per light and per renderable
//! - [`ProceduralPlacer`]: one-shot randomized instance placement
//! - [`AsyncAttachQueue`]: grafts externally loaded subtrees into the live graph

pub mod attach_queue;
pub mod camera;
pub mod light;
pub mod node;
pub mod placement;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod shadow_policy;
pub mod transform;
pub mod transform_system;

pub use attach_queue::{AsyncAttachQueue, AttachId, AttachOutcome, PendingAttachment};
pub use camera::Camera;
pub use light::{Light, LightKind, PointLight};
pub use node::{Node, Renderable, ShadowFlags};
pub use placement::{PlacedInstance, PlacementGroup, PlacementParams, ProceduralPlacer};
pub use scene::{GraphSnapshot, Scene};
pub use shadow_policy::{LightShadow, MeshShadow, ShadowPolicy, ShadowPolicyBuilder};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
}
