//! Frame driver
//!
//! [`FrameDriver`] owns the [`SceneContext`] and the [`AnimationClock`] and
//! is the only code that mutates the scene once it is running. Every tick
//! runs the same fixed sequence:
//!
//! 1. advance the clock
//! 2. move the rig lights to their positions at the new time
//! 3. turn one placed instance towards the camera (optional)
//! 4. step the camera controller and write its pose
//! 5. commit resolved attachments
//! 6. refresh world matrices and submit to the renderer
//! 7. schedule the next tick (the driver stays `Running`)
//!
//! ```rust
//! use grove::prelude::*;
//!
//! # fn main() -> grove::errors::Result<()> {
//! let config = GroveConfig::default();
//! let mut driver = build_scene(&config)?.into_driver(&config)?;
//! let mut renderer = RecordingRenderer::new();
//! driver.start(&mut renderer);
//! assert_eq!(driver.run_for(120, &mut renderer), 120);
//! assert_eq!(renderer.submitted(), 120);
//! # Ok(())
//! # }
//! ```

use glam::Vec3;

use crate::animation::{AnimationClock, LightRig};
use crate::app::{InputEvent, InputMapping};
use crate::assets::{AssetLoader, AssetServer, AssetSource};
use crate::renderer::Renderer;
use crate::scene::{
    AsyncAttachQueue, AttachId, AttachOutcome, NodeHandle, PlacementGroup, Scene, ShadowPolicy,
    Transform,
};
use crate::utils::{CameraController, ParameterPanel};

/// Everything the frame loop works on, owned in one place.
pub struct SceneContext {
    pub scene: Scene,
    pub assets: AssetServer,
    pub light_rig: LightRig,
    pub placements: Vec<PlacementGroup>,
    pub camera: NodeHandle,
    pub controller: CameraController,
    pub input: InputMapping,
    pub shadows: ShadowPolicy,
    pub attach_queue: AsyncAttachQueue,
    pub params: ParameterPanel,
}

impl SceneContext {
    /// Starts an asynchronous load whose result is attached under `parent`.
    pub fn request_attach(
        &mut self,
        loader: &dyn AssetLoader,
        source: impl Into<AssetSource>,
        parent: NodeHandle,
        local_transform: Transform,
    ) -> AttachId {
        self.attach_queue
            .request_attach(loader, source, parent, local_transform)
    }

    /// Writes a parameter through the panel binding at `index`.
    pub fn write_param(&mut self, index: usize, value: f32) -> crate::errors::Result<f32> {
        self.params.write(index, value, &mut self.scene, &self.assets)
    }

    #[must_use]
    pub fn stats(&self) -> SceneStats {
        let placed = self
            .placements
            .iter()
            .flat_map(PlacementGroup::instances)
            .filter(|i| self.scene.is_live(i.node))
            .count();
        let attached = self
            .attach_queue
            .attached_roots()
            .iter()
            .filter(|&&root| self.scene.is_live(root))
            .count();
        SceneStats {
            node_count: self.scene.node_count(),
            placed_instances: placed,
            attached_subtrees: placed + attached,
            pending_attachments: self.attach_queue.pending_count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStats {
    pub node_count: usize,
    pub placed_instances: usize,
    /// Live placed instances plus live committed attachments.
    pub attached_subtrees: usize,
    pub pending_attachments: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Stopped,
}

/// What happened during one tick.
#[derive(Debug)]
pub struct TickReport {
    pub frame: u64,
    pub elapsed: f32,
    /// Index into the first placement group of the instance turned this tick.
    pub reoriented: Option<usize>,
    pub attachments: Vec<AttachOutcome>,
    pub submitted: bool,
    /// Whether another tick is scheduled.
    pub scheduled: bool,
}

pub struct FrameDriver {
    ctx: SceneContext,
    clock: AnimationClock,
    state: DriverState,
    reorient: bool,
    shadows_configured: bool,
}

impl FrameDriver {
    #[must_use]
    pub fn new(ctx: SceneContext, clock: AnimationClock) -> Self {
        Self {
            ctx,
            clock,
            state: DriverState::Idle,
            reorient: true,
            shadows_configured: false,
        }
    }

    #[must_use]
    pub fn with_reorient(mut self, enabled: bool) -> Self {
        self.reorient = enabled;
        self
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> DriverState {
        self.state
    }

    #[must_use]
    pub fn context(&self) -> &SceneContext {
        &self.ctx
    }

    /// Mutable access for setup and parameter writes between ticks.
    pub fn context_mut(&mut self) -> &mut SceneContext {
        &mut self.ctx
    }

    #[must_use]
    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    #[must_use]
    pub fn into_context(self) -> SceneContext {
        self.ctx
    }

    /// `Idle -> Running`. Configures renderer shadows on first start.
    /// A stopped driver cannot be restarted.
    pub fn start(&mut self, renderer: &mut dyn Renderer) -> bool {
        match self.state {
            DriverState::Idle => {
                if !self.shadows_configured {
                    self.ctx.shadows.apply(&mut self.ctx.scene);
                    renderer.configure_shadows(&self.ctx.shadows);
                    self.shadows_configured = true;
                }
                self.state = DriverState::Running;
                log::info!("Frame driver running");
                true
            }
            DriverState::Running => true,
            DriverState::Stopped => {
                log::warn!("Frame driver already stopped");
                false
            }
        }
    }

    pub fn stop(&mut self) {
        if self.state != DriverState::Stopped {
            log::info!(
                "Frame driver stopped after {} frames ({:.2}s)",
                self.clock.frame_count,
                self.clock.elapsed_secs()
            );
            self.state = DriverState::Stopped;
        }
    }

    /// Runs one tick. Returns `None` unless the driver is running.
    pub fn tick(&mut self, renderer: &mut dyn Renderer) -> Option<TickReport> {
        if self.state != DriverState::Running {
            return None;
        }

        // 1. Clock
        let t = self.clock.tick();
        let frame = self.clock.frame_count;

        // 2. Lights
        self.ctx.light_rig.update(&mut self.ctx.scene, t);

        // 3. Reorientation, using the camera pose from the previous tick
        let reoriented = if self.reorient {
            self.reorient_one(frame, self.ctx.controller.position())
        } else {
            None
        };

        // 4. Camera
        self.ctx.controller.update();
        match self.ctx.scene.get_node_mut(self.ctx.camera) {
            Some(node) => self.ctx.controller.apply_to(&mut node.transform),
            None => log::warn!("Camera node {:?} no longer exists", self.ctx.camera),
        }

        // 5. Attachments
        let attachments = self.ctx.attach_queue.drain(&mut self.ctx.scene);

        // 6. Submit
        self.ctx.scene.update_matrix_world();
        let submitted = match self.ctx.scene.cameras.get(self.ctx.camera) {
            Some(camera) => {
                renderer.submit(&self.ctx.scene, camera);
                true
            }
            None => false,
        };

        // 7. Schedule
        Some(TickReport {
            frame,
            elapsed: t,
            reoriented,
            attachments,
            submitted,
            scheduled: self.state == DriverState::Running,
        })
    }

    /// Runs up to `frames` ticks and returns how many ran.
    pub fn run_for(&mut self, frames: u64, renderer: &mut dyn Renderer) -> u64 {
        let mut ran = 0;
        while ran < frames && self.tick(renderer).is_some() {
            ran += 1;
        }
        ran
    }

    /// Applies one input event between ticks.
    pub fn handle_input(&mut self, event: InputEvent, renderer: &mut dyn Renderer) {
        if let InputEvent::Resize { width, height } = event {
            let Some(camera) = self.ctx.scene.cameras.get_mut(self.ctx.camera) else {
                return;
            };
            if !camera.resize(width, height) {
                log::debug!("Ignoring zero-sized resize {width}x{height}");
                return;
            }
            self.ctx.input.set_screen_height(height);
            renderer.on_resize(width, height);
            return;
        }

        let radius = self.ctx.controller.goal().radius;
        if let Some(delta) = self.ctx.input.orbit_delta(&event, radius) {
            self.ctx
                .controller
                .apply_input_delta(delta.azimuth, delta.polar, delta.radius);
        }
    }

    #[must_use]
    pub fn stats(&self) -> SceneStats {
        self.ctx.stats()
    }

    fn reorient_one(&mut self, frame: u64, camera_position: Vec3) -> Option<usize> {
        let group = self.ctx.placements.first()?;
        if group.is_empty() {
            return None;
        }
        let index = ((frame - 1) % group.len() as u64) as usize;
        group
            .face_towards(&mut self.ctx.scene, index, camera_position)
            .then_some(index)
    }
}
