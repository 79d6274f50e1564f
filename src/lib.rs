#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod app;
pub mod assets;
pub mod config;
pub mod engine;
pub mod errors;
pub mod garden;
pub mod renderer;
pub mod scene;
pub mod utils;

pub use animation::{AnimationClock, LightRig, TimeStep, Trajectory};
pub use app::{InputEvent, InputMapping};
pub use assets::{AssetLoader, AssetServer, AssetSource, Prefab, PrefabLibrary, TokioLoader};
pub use config::GroveConfig;
pub use engine::{DriverState, FrameDriver, SceneContext, SceneStats, TickReport};
pub use errors::{GroveError, Result};
pub use garden::{Garden, build_scene};
pub use renderer::{RecordingRenderer, Renderer};
pub use scene::{
    AsyncAttachQueue, AttachOutcome, Camera, Light, Node, NodeHandle, ProceduralPlacer, Scene,
    ShadowPolicy, Transform,
};
pub use utils::{CameraController, OrbitSettings, ParameterPanel};

/// Commonly used types for building and driving a scene.
pub mod prelude {
    pub use crate::animation::{AnimationClock, LightRig, Trajectory};
    pub use crate::app::InputEvent;
    pub use crate::assets::{AssetLoader, AssetServer, AssetSource, Prefab, PrefabLibrary};
    pub use crate::config::GroveConfig;
    pub use crate::engine::{DriverState, FrameDriver, SceneContext};
    pub use crate::errors::{GroveError, Result};
    pub use crate::garden::build_scene;
    pub use crate::renderer::{RecordingRenderer, Renderer};
    pub use crate::scene::{Camera, Light, Node, NodeHandle, Scene, Transform};
}
