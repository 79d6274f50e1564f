//! Renderer seam
//!
//! The core never rasterizes. Once per tick the frame driver hands the
//! committed scene graph and the active camera to a [`Renderer`]; the
//! renderer walks it with [`Scene::traverse`] and reads world matrices that
//! are already up to date.
//!
//! [`RecordingRenderer`] is a headless implementation that keeps a summary of
//! every submission, used by the demo and the tests.

use glam::{Mat4, Vec3};

use crate::scene::light::LightKind;
use crate::scene::{Camera, LightShadow, NodeHandle, Scene, ShadowPolicy};

pub trait Renderer {
    /// Called once, before the first submission.
    fn configure_shadows(&mut self, policy: &ShadowPolicy);

    /// Called after the camera aspect has been recomputed.
    fn on_resize(&mut self, width: u32, height: u32);

    fn submit(&mut self, scene: &Scene, camera: &Camera);
}

/// Summary of one submission.
#[derive(Debug, Clone)]
pub struct SubmittedFrame {
    pub index: u64,
    pub node_count: usize,
    /// Renderable nodes in traversal order.
    pub draw_list: Vec<NodeHandle>,
    /// World positions of live point lights.
    pub point_lights: Vec<(NodeHandle, Vec3)>,
    pub view_projection: Mat4,
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub frames: Vec<SubmittedFrame>,
    pub resizes: Vec<(u32, u32)>,
    pub shadow_maps: Vec<(NodeHandle, LightShadow)>,
    pub shadow_configurations: usize,
    /// Keep only the most recent frame instead of the full history.
    pub keep_last_only: bool,
    submitted: u64,
}

impl RecordingRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn keep_last_only() -> Self {
        Self {
            keep_last_only: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn submitted(&self) -> u64 {
        self.submitted
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<&SubmittedFrame> {
        self.frames.last()
    }
}

impl Renderer for RecordingRenderer {
    fn configure_shadows(&mut self, policy: &ShadowPolicy) {
        self.shadow_configurations += 1;
        self.shadow_maps = policy.casting_lights();
        log::debug!(
            "Shadow maps: {} lights, {} texels",
            self.shadow_maps.len(),
            policy.texel_budget()
        );
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        self.resizes.push((width, height));
    }

    fn submit(&mut self, scene: &Scene, camera: &Camera) {
        let order = scene.traverse();
        let draw_list = order
            .iter()
            .copied()
            .filter(|&h| scene.get_node(h).is_some_and(|n| n.visible && n.renderable.is_some()))
            .collect();

        let point_lights = scene
            .iter_active_lights()
            .filter(|(_, light, _)| matches!(light.kind, LightKind::Point(_)))
            .map(|(h, _, world)| (h, Vec3::from(world.translation)))
            .collect();

        let frame = SubmittedFrame {
            index: self.submitted,
            node_count: order.len(),
            draw_list,
            point_lights,
            view_projection: camera.view_projection_matrix(),
        };
        self.submitted += 1;

        if self.keep_last_only {
            self.frames.clear();
        }
        self.frames.push(frame);
    }
}
