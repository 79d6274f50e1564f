//! Scene configuration
//!
//! Every section is `#[serde(default)]`, so a JSON document only needs the
//! fields it changes:
//!
//! ```rust,ignore
//! let config = GroveConfig::from_json_str(r#"{ "placement": { "count": 12, "seed": 7 } }"#)?;
//! ```

use std::path::Path;
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::animation::Trajectory;
use crate::app::InputMapping;
use crate::errors::{GroveError, Result};
use crate::utils::OrbitSettings;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroveConfig {
    pub camera: CameraConfig,
    pub placement: PlacementConfig,
    pub lights: LightsConfig,
    pub shadows: ShadowConfig,
    pub frame: FrameConfig,
}

impl GroveConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub width: u32,
    pub height: u32,
    pub position: Vec3,
    pub target: Vec3,
    pub orbit: OrbitSettings,
    pub input: InputMapping,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 55.0,
            near: 0.1,
            far: 200.0,
            width: 1280,
            height: 720,
            position: Vec3::new(1.0, 1.5, 5.0),
            target: Vec3::ZERO,
            orbit: OrbitSettings::default(),
            input: InputMapping::default(),
        }
    }
}

impl CameraConfig {
    #[must_use]
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub count: i64,
    pub r_min: f32,
    pub r_max: f32,
    pub height: f32,
    pub max_tilt: f32,
    /// Fixed seed for reproducible layouts. Random when absent.
    pub seed: Option<u64>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            count: 30,
            r_min: 3.4,
            r_max: 9.4,
            height: 0.3,
            max_tilt: 0.2,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLightConfig {
    pub color: Vec3,
    pub intensity: f32,
    /// Zero means no cutoff.
    pub distance: f32,
    pub decay: f32,
    pub position: Vec3,
}

impl Default for PointLightConfig {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 33.0,
            distance: 0.0,
            decay: 2.0,
            position: Vec3::new(3.0, 4.0, 3.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigLightConfig {
    pub color: Vec3,
    pub intensity: f32,
    #[serde(default)]
    pub distance: f32,
    #[serde(default = "default_decay")]
    pub decay: f32,
    pub trajectory: Trajectory,
}

fn default_decay() -> f32 {
    2.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightsConfig {
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    pub primary: PointLightConfig,
    pub rig: Vec<RigLightConfig>,
}

impl Default for LightsConfig {
    fn default() -> Self {
        let colors = [
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 0.0),
        ];
        let rig = colors
            .into_iter()
            .zip(Trajectory::defaults())
            .map(|(color, trajectory)| RigLightConfig {
                color,
                intensity: 6.0,
                distance: 3.0,
                decay: 2.0,
                trajectory,
            })
            .collect();

        Self {
            ambient_color: Vec3::ONE,
            ambient_intensity: 0.3,
            primary: PointLightConfig::default(),
            rig,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    pub primary_map_size: u32,
    pub rig_map_size: u32,
    pub primary_casts: bool,
    pub rig_casts: bool,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            primary_map_size: 1024,
            rig_map_size: 256,
            primary_casts: true,
            rig_casts: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub step_seconds: f32,
    /// Turn one placed instance towards the camera each tick.
    pub reorient_instances: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            step_seconds: 1.0 / 60.0,
            reorient_instances: true,
        }
    }
}

impl FrameConfig {
    pub fn step(&self) -> Result<Duration> {
        let invalid = || GroveError::InvalidRange {
            what: "frame step",
            min: self.step_seconds,
            max: f32::INFINITY,
        };
        if !(self.step_seconds.is_finite() && self.step_seconds > 0.0) {
            return Err(invalid());
        }
        Duration::try_from_secs_f32(self.step_seconds).map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            GroveConfig::from_json_str(r#"{ "placement": { "count": 12, "seed": 7 } }"#).unwrap();
        assert_eq!(config.placement.count, 12);
        assert_eq!(config.placement.seed, Some(7));
        assert_eq!(config.placement.r_min, 3.4);
        assert_eq!(config.lights.rig.len(), 3);
        assert_eq!(config.camera.fov_degrees, 55.0);
    }

    #[test]
    fn rejects_zero_step() {
        let frame = FrameConfig {
            step_seconds: 0.0,
            ..FrameConfig::default()
        };
        assert!(frame.step().is_err());
    }

    #[test]
    fn rejects_step_too_large_for_duration() {
        let frame = FrameConfig {
            step_seconds: 1.0e20,
            ..FrameConfig::default()
        };
        assert!(matches!(
            frame.step(),
            Err(GroveError::InvalidRange { what: "frame step", .. })
        ));
    }
}
