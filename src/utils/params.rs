//! Tunable parameter bindings
//!
//! The core exposes a flat list of [`ParamBinding`]s; an external panel reads
//! them through [`ParameterPanel::snapshot`] and writes through
//! [`ParameterPanel::write`]. Writes are clamped to the binding's range and
//! snapped to its step, so the panel never needs to validate anything.

use crate::assets::{AssetServer, MaterialHandle};
use crate::errors::{GroveError, Result};
use crate::scene::{NodeHandle, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamTarget {
    LightIntensity(NodeHandle),
    LightDistance(NodeHandle),
    LightDecay(NodeHandle),
    MaterialAoIntensity(MaterialHandle),
    MaterialRoughness(MaterialHandle),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamBinding {
    pub label: String,
    pub min: f32,
    pub max: f32,
    /// Zero disables snapping.
    pub step: f32,
    pub target: ParamTarget,
}

/// What the panel displays for one binding.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamView {
    pub label: String,
    pub current_value: f32,
    pub valid_range: (f32, f32),
    pub step: f32,
}

impl ParamBinding {
    #[must_use]
    pub fn new(label: impl Into<String>, min: f32, max: f32, step: f32, target: ParamTarget) -> Self {
        Self {
            label: label.into(),
            min,
            max,
            step,
            target,
        }
    }

    /// Current value, or `None` if the target is gone.
    #[must_use]
    pub fn read(&self, scene: &Scene, assets: &AssetServer) -> Option<f32> {
        match self.target {
            ParamTarget::LightIntensity(h) => scene.lights.get(h).map(|l| l.intensity()),
            ParamTarget::LightDistance(h) => {
                scene.lights.get(h)?.as_point().map(|p| p.distance())
            }
            ParamTarget::LightDecay(h) => scene.lights.get(h)?.as_point().map(|p| p.decay()),
            ParamTarget::MaterialAoIntensity(m) => assets.material(m).map(|m| m.ao_map_intensity),
            ParamTarget::MaterialRoughness(m) => assets.material(m).map(|m| m.roughness),
        }
    }

    /// Clamps `value` into range and snaps it to the step grid.
    #[must_use]
    pub fn sanitize(&self, value: f32) -> f32 {
        let value = if value.is_finite() { value } else { self.min };
        let snapped = if self.step > 0.0 {
            self.min + ((value - self.min) / self.step).round() * self.step
        } else {
            value
        };
        snapped.clamp(self.min, self.max)
    }

    /// Writes a new value and returns the value actually applied.
    pub fn write_back(&self, scene: &mut Scene, assets: &AssetServer, value: f32) -> Result<f32> {
        let applied = self.sanitize(value);

        let written = match self.target {
            ParamTarget::LightIntensity(h) => scene
                .lights
                .get_mut(h)
                .map(|l| l.set_intensity(applied))
                .is_some(),
            ParamTarget::LightDistance(h) => scene
                .lights
                .get_mut(h)
                .and_then(|l| l.as_point_mut())
                .map(|p| p.set_distance(applied))
                .is_some(),
            ParamTarget::LightDecay(h) => scene
                .lights
                .get_mut(h)
                .and_then(|l| l.as_point_mut())
                .map(|p| p.set_decay(applied))
                .is_some(),
            ParamTarget::MaterialAoIntensity(m) => {
                assets.materials.update(m, |mat| mat.ao_map_intensity = applied)
            }
            ParamTarget::MaterialRoughness(m) => {
                assets.materials.update(m, |mat| mat.roughness = applied)
            }
        };

        if !written {
            return Err(GroveError::BindingTargetGone(self.label.clone()));
        }
        if applied != value {
            log::warn!("'{}': {value} adjusted to {applied}", self.label);
        }
        Ok(applied)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParameterPanel {
    bindings: Vec<ParamBinding>,
}

impl ParameterPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, binding: ParamBinding) -> usize {
        self.bindings.push(binding);
        self.bindings.len() - 1
    }

    #[must_use]
    pub fn bindings(&self) -> &[ParamBinding] {
        &self.bindings
    }

    #[must_use]
    pub fn find(&self, label: &str) -> Option<usize> {
        self.bindings.iter().position(|b| b.label == label)
    }

    /// Flat list of live bindings; bindings whose target is gone are skipped.
    #[must_use]
    pub fn snapshot(&self, scene: &Scene, assets: &AssetServer) -> Vec<ParamView> {
        self.bindings
            .iter()
            .filter_map(|b| {
                Some(ParamView {
                    label: b.label.clone(),
                    current_value: b.read(scene, assets)?,
                    valid_range: (b.min, b.max),
                    step: b.step,
                })
            })
            .collect()
    }

    pub fn write(
        &self,
        index: usize,
        value: f32,
        scene: &mut Scene,
        assets: &AssetServer,
    ) -> Result<f32> {
        self.bindings
            .get(index)
            .ok_or(GroveError::BindingOutOfBounds(index))?
            .write_back(scene, assets, value)
    }
}
