use std::f32::consts::TAU;

use glam::{EulerRot, Quat, Vec3};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::errors::{GroveError, Result};
use crate::scene::node::{Node, Renderable, ShadowFlags};
use crate::scene::transform::Transform;
use crate::scene::{NodeHandle, Scene};

/// Input for one placement batch.
#[derive(Debug, Clone)]
pub struct PlacementParams {
    pub name: String,
    /// Signed so that negative input can be rejected instead of wrapping.
    pub count: i64,
    pub r_min: f32,
    pub r_max: f32,
    /// Height of every instance above the group origin.
    pub height: f32,
    /// Per-axis tilt is drawn from `[-max_tilt, max_tilt)`. Zero disables tilt.
    pub max_tilt: f32,
    pub renderable: Renderable,
    pub shadows: ShadowFlags,
}

/// Immutable record of one placed instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedInstance {
    pub node: NodeHandle,
    pub angle: f32,
    pub radius: f32,
    pub tilt: Vec3,
    pub position: Vec3,
}

/// The group node created by a placement and its instances.
#[derive(Debug, Clone)]
pub struct PlacementGroup {
    pub group: NodeHandle,
    instances: Vec<PlacedInstance>,
}

impl PlacementGroup {
    #[must_use]
    pub fn instances(&self) -> &[PlacedInstance] {
        &self.instances
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Turns instance `index` to face `target` (world space). Only the
    /// rotation is written; position and scale keep their placed values.
    /// Returns `false` for an out-of-range index or a removed node.
    pub fn face_towards(&self, scene: &mut Scene, index: usize, target: Vec3) -> bool {
        let Some(instance) = self.instances.get(index) else {
            return false;
        };
        let Ok(group_world) = scene.world_transform(self.group) else {
            return false;
        };
        let local_target = group_world.inverse().transform_point3(target);
        let Some(node) = scene.get_node_mut(instance.node) else {
            return false;
        };
        node.transform.look_at(local_target, Vec3::Y);
        true
    }
}

/// Generates randomized instances once at scene build time.
///
/// Unseeded by default; [`ProceduralPlacer::with_seed`] makes the output
/// reproducible. The seed in use is logged either way.
pub struct ProceduralPlacer {
    rng: StdRng,
    seed: u64,
}

impl Default for ProceduralPlacer {
    fn default() -> Self {
        Self::new()
    }
}

impl ProceduralPlacer {
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Creates a group node under `parent` holding exactly `params.count`
    /// instances. All input is validated before any node is created.
    pub fn place(
        &mut self,
        scene: &mut Scene,
        parent: NodeHandle,
        params: &PlacementParams,
    ) -> Result<PlacementGroup> {
        let count = usize::try_from(params.count).map_err(|_| GroveError::InvalidCount(params.count))?;
        if !(params.r_min.is_finite()
            && params.r_max.is_finite()
            && params.r_min >= 0.0
            && params.r_min < params.r_max)
        {
            return Err(GroveError::InvalidRange {
                what: "placement radius",
                min: params.r_min,
                max: params.r_max,
            });
        }
        if !(params.max_tilt.is_finite() && params.max_tilt >= 0.0) {
            return Err(GroveError::InvalidRange {
                what: "placement tilt",
                min: -params.max_tilt,
                max: params.max_tilt,
            });
        }
        if !scene.contains(parent) {
            return Err(GroveError::NodeNotFound(parent));
        }

        let mut instances = Vec::new();
        instances
            .try_reserve_exact(count)
            .map_err(|_| GroveError::InvalidCount(params.count))?;

        let group = scene.add_to_parent(Node::new(params.name.clone()), parent)?;

        for i in 0..count {
            let angle = self.sample(0.0, TAU);
            let radius = self.sample(params.r_min, params.r_max);
            let tilt = if params.max_tilt > 0.0 {
                Vec3::new(
                    self.sample(-params.max_tilt, params.max_tilt),
                    self.sample(-params.max_tilt, params.max_tilt),
                    self.sample(-params.max_tilt, params.max_tilt),
                )
            } else {
                Vec3::ZERO
            };
            let position = Vec3::new(angle.sin() * radius, params.height, angle.cos() * radius);

            let transform = Transform::from_position(position)
                .with_rotation(Quat::from_euler(EulerRot::XYZ, tilt.x, tilt.y, tilt.z));
            let node = Node::new(format!("{}_{i}", params.name))
                .with_transform(transform)
                .with_renderable(params.renderable)
                .with_shadows(params.shadows);
            let node = scene.add_to_parent(node, group)?;

            instances.push(PlacedInstance {
                node,
                angle,
                radius,
                tilt,
                position,
            });
        }

        log::info!(
            "Placed {count} '{}' instances in [{}, {}) (seed {})",
            params.name,
            params.r_min,
            params.r_max,
            self.seed
        );
        Ok(PlacementGroup { group, instances })
    }

    /// Uniform sample in `[lo, hi)`.
    fn sample(&mut self, lo: f32, hi: f32) -> f32 {
        let u: f32 = self.rng.random();
        let v = lo + u * (hi - lo);
        // Rounding can land exactly on `hi`
        if v < hi { v } else { lo }
    }
}
