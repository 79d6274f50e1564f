use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::scene::node::ShadowFlags;
use crate::scene::{NodeHandle, Scene};

/// Shadow settings for one light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightShadow {
    pub cast_shadow: bool,
    pub map_resolution: (u32, u32),
}

impl LightShadow {
    pub const DISABLED: Self = Self {
        cast_shadow: false,
        map_resolution: (0, 0),
    };

    /// Shadow-casting with a square map of `size` texels.
    #[must_use]
    pub const fn square(size: u32) -> Self {
        Self {
            cast_shadow: true,
            map_resolution: (size, size),
        }
    }

    #[must_use]
    pub fn texels(&self) -> u64 {
        if self.cast_shadow {
            u64::from(self.map_resolution.0) * u64::from(self.map_resolution.1)
        } else {
            0
        }
    }
}

impl Default for LightShadow {
    fn default() -> Self {
        Self::DISABLED
    }
}

/// Shadow participation of one renderable node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshShadow {
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl MeshShadow {
    pub const NONE: Self = Self {
        cast_shadow: false,
        receive_shadow: false,
    };
    pub const CAST: Self = Self {
        cast_shadow: true,
        receive_shadow: false,
    };
    pub const RECEIVE: Self = Self {
        cast_shadow: false,
        receive_shadow: true,
    };
    pub const BOTH: Self = Self {
        cast_shadow: true,
        receive_shadow: true,
    };

    #[must_use]
    pub fn flags(self) -> ShadowFlags {
        let mut flags = ShadowFlags::empty();
        flags.set(ShadowFlags::CAST, self.cast_shadow);
        flags.set(ShadowFlags::RECEIVE, self.receive_shadow);
        flags
    }
}

/// Static shadow configuration: which lights cast (and at what map size),
/// which renderables cast and receive.
///
/// Built once with [`ShadowPolicyBuilder`] and read-only afterwards. Lights
/// and meshes not mentioned get [`LightShadow::DISABLED`] / [`MeshShadow::NONE`].
#[derive(Debug, Clone, Default)]
pub struct ShadowPolicy {
    lights: FxHashMap<NodeHandle, LightShadow>,
    meshes: FxHashMap<NodeHandle, MeshShadow>,
}

impl ShadowPolicy {
    #[must_use]
    pub fn builder() -> ShadowPolicyBuilder {
        ShadowPolicyBuilder::default()
    }

    #[must_use]
    pub fn light(&self, handle: NodeHandle) -> LightShadow {
        self.lights.get(&handle).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn mesh(&self, handle: NodeHandle) -> MeshShadow {
        self.meshes.get(&handle).copied().unwrap_or_default()
    }

    /// Shadow-casting lights, sorted by handle for a stable renderer setup.
    #[must_use]
    pub fn casting_lights(&self) -> Vec<(NodeHandle, LightShadow)> {
        let mut out: Vec<_> = self
            .lights
            .iter()
            .filter(|(_, s)| s.cast_shadow)
            .map(|(&h, &s)| (h, s))
            .collect();
        out.sort_by_key(|(h, _)| *h);
        out
    }

    /// Total shadow map texels across all casting lights.
    #[must_use]
    pub fn texel_budget(&self) -> u64 {
        self.lights.values().map(LightShadow::texels).sum()
    }

    /// Writes the mesh cast/receive flags onto the scene nodes. Stale handles
    /// are skipped.
    pub fn apply(&self, scene: &mut Scene) {
        for (&handle, &shadow) in &self.meshes {
            match scene.get_node_mut(handle) {
                Some(node) => node.shadows = shadow.flags(),
                None => log::warn!("Shadow policy refers to removed node {handle:?}"),
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct ShadowPolicyBuilder {
    policy: ShadowPolicy,
}

impl ShadowPolicyBuilder {
    #[must_use]
    pub fn light(mut self, handle: NodeHandle, shadow: LightShadow) -> Self {
        self.policy.lights.insert(handle, shadow);
        self
    }

    #[must_use]
    pub fn mesh(mut self, handle: NodeHandle, shadow: MeshShadow) -> Self {
        self.policy.meshes.insert(handle, shadow);
        self
    }

    #[must_use]
    pub fn meshes(mut self, handles: impl IntoIterator<Item = NodeHandle>, shadow: MeshShadow) -> Self {
        for handle in handles {
            self.policy.meshes.insert(handle, shadow);
        }
        self
    }

    #[must_use]
    pub fn build(self) -> ShadowPolicy {
        self.policy
    }
}
