//! Utility Module
//!
//! - [`CameraController`]: damped orbit camera driven by input deltas
//! - [`ParameterPanel`]: flat list of tunable bindings for an external panel

pub mod orbit_control;
pub mod params;

pub use orbit_control::{CameraController, OrbitSettings, Spherical};
pub use params::{ParamBinding, ParamTarget, ParamView, ParameterPanel};
