use glam::Vec3;

use crate::animation::trajectory::Trajectory;
use crate::errors::Result;
use crate::scene::light::Light;
use crate::scene::{NodeHandle, Scene};

#[derive(Debug, Clone)]
pub struct RigLight {
    pub node: NodeHandle,
    pub trajectory: Trajectory,
}

/// A set of independently animated lights.
///
/// Every light follows its own [`Trajectory`], a pure function of elapsed
/// time. The rig keeps no per-frame state, so `update(t)` gives the same
/// result however often or in whatever order it is called.
#[derive(Debug, Clone, Default)]
pub struct LightRig {
    lights: Vec<RigLight>,
}

impl LightRig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `light` under `parent`, positioned at `trajectory.position(0)`.
    pub fn add_light(
        &mut self,
        scene: &mut Scene,
        parent: NodeHandle,
        light: Light,
        trajectory: Trajectory,
    ) -> Result<NodeHandle> {
        let node = scene.add_light(light, parent)?;
        if let Some(n) = scene.get_node_mut(node) {
            n.name = format!("RigLight_{}", self.lights.len());
            n.transform.position = trajectory.position(0.0);
        }
        self.lights.push(RigLight { node, trajectory });
        Ok(node)
    }

    #[must_use]
    pub fn lights(&self) -> &[RigLight] {
        &self.lights
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Positions of every rig light at time `t`, in insertion order.
    #[must_use]
    pub fn positions(&self, t: f32) -> Vec<(NodeHandle, Vec3)> {
        self.lights
            .iter()
            .map(|l| (l.node, l.trajectory.position(t)))
            .collect()
    }

    /// Writes every light's position for time `t` into its node's local
    /// transform. Lights whose node was removed are skipped.
    pub fn update(&self, scene: &mut Scene, t: f32) {
        for light in &self.lights {
            match scene.get_node_mut(light.node) {
                Some(node) => node.transform.position = light.trajectory.position(t),
                None => log::warn!("Rig light {:?} no longer exists", light.node),
            }
        }
    }
}
