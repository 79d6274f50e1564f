use std::f32::consts::PI;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::errors::{GroveError, Result};
use crate::scene::transform::Transform;

/// Spherical coordinates around the orbit target.
///
/// `polar` is measured from +Y, `azimuth` around +Y starting at +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub azimuth: f32,
    pub polar: f32,
    pub radius: f32,
}

impl Spherical {
    #[must_use]
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return Self {
                azimuth: 0.0,
                polar: PI / 2.0,
                radius: 0.0,
            };
        }
        Self {
            azimuth: offset.x.atan2(offset.z),
            polar: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            radius,
        }
    }

    #[must_use]
    pub fn to_offset(self) -> Vec3 {
        let (sin_p, cos_p) = self.polar.sin_cos();
        let (sin_a, cos_a) = self.azimuth.sin_cos();
        Vec3::new(sin_p * sin_a, cos_p, sin_p * cos_a) * self.radius
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    /// Fraction of the remaining distance to the goal covered per update.
    pub damping_factor: f32,
    pub enable_damping: bool,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            min_distance: 1.0,
            max_distance: 40.0,
            min_polar_angle: 0.05,
            max_polar_angle: PI / 2.0 - 0.05,
            damping_factor: 0.05,
            enable_damping: true,
        }
    }
}

impl OrbitSettings {
    pub fn validate(&self) -> Result<()> {
        let ok = |min: f32, max: f32| min.is_finite() && max.is_finite() && min <= max;
        if !(ok(self.min_distance, self.max_distance) && self.min_distance >= 0.0) {
            return Err(GroveError::InvalidRange {
                what: "orbit distance",
                min: self.min_distance,
                max: self.max_distance,
            });
        }
        if !(ok(self.min_polar_angle, self.max_polar_angle)
            && self.min_polar_angle >= 0.0
            && self.max_polar_angle <= PI)
        {
            return Err(GroveError::InvalidRange {
                what: "orbit polar angle",
                min: self.min_polar_angle,
                max: self.max_polar_angle,
            });
        }
        if !(self.damping_factor > 0.0 && self.damping_factor <= 1.0) {
            return Err(GroveError::InvalidRange {
                what: "damping factor",
                min: self.damping_factor,
                max: 1.0,
            });
        }
        Ok(())
    }
}

/// Damped orbit camera around a fixed target.
///
/// Input moves a goal state; [`CameraController::update`] moves the actual
/// state a fixed fraction of the way to the goal each frame. Both states are
/// clamped to the configured distance and polar ranges at every write, so no
/// input sequence can push the camera through a pole or out of range.
#[derive(Debug, Clone)]
pub struct CameraController {
    pub settings: OrbitSettings,
    target: Vec3,
    current: Spherical,
    goal: Spherical,
}

impl CameraController {
    pub fn new(position: Vec3, target: Vec3, settings: OrbitSettings) -> Result<Self> {
        settings.validate()?;
        let start = Self::clamp_with(&settings, Spherical::from_offset(position - target));
        Ok(Self {
            settings,
            target,
            current: start,
            goal: start,
        })
    }

    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    #[must_use]
    pub fn state(&self) -> Spherical {
        self.current
    }

    #[must_use]
    pub fn goal(&self) -> Spherical {
        self.goal
    }

    /// World-space camera position for the current state.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.target + self.current.to_offset()
    }

    /// Moves the goal state. Non-finite deltas are ignored.
    pub fn apply_input_delta(&mut self, d_azimuth: f32, d_polar: f32, d_radius: f32) {
        let finite = |v: f32| if v.is_finite() { v } else { 0.0 };
        let mut goal = self.goal;
        goal.azimuth = (goal.azimuth + finite(d_azimuth)).rem_euclid(2.0 * PI);
        goal.polar += finite(d_polar);
        goal.radius += finite(d_radius);
        self.goal = Self::clamp_with(&self.settings, goal);
    }

    /// Advances the current state towards the goal. Call once per frame.
    pub fn update(&mut self) {
        let next = if self.settings.enable_damping {
            let k = self.settings.damping_factor;
            // Shortest way round for the azimuth
            let d_az = (self.goal.azimuth - self.current.azimuth + PI).rem_euclid(2.0 * PI) - PI;
            Spherical {
                azimuth: (self.current.azimuth + d_az * k).rem_euclid(2.0 * PI),
                polar: self.current.polar + (self.goal.polar - self.current.polar) * k,
                radius: self.current.radius + (self.goal.radius - self.current.radius) * k,
            }
        } else {
            self.goal
        };
        self.current = Self::clamp_with(&self.settings, next);
    }

    /// Writes the current pose into `transform`, looking at the target.
    pub fn apply_to(&self, transform: &mut Transform) {
        transform.position = self.position();
        transform.look_at(self.target, Vec3::Y);
    }

    fn clamp_with(settings: &OrbitSettings, mut s: Spherical) -> Spherical {
        s.polar = s
            .polar
            .clamp(settings.min_polar_angle, settings.max_polar_angle);
        s.radius = s.radius.clamp(settings.min_distance, settings.max_distance);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spherical_round_trips_through_offset() {
        let offset = Vec3::new(1.0, 1.5, 5.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!((back - offset).length() < 1e-5);
    }

    #[test]
    fn damping_converges_to_goal() {
        let mut controls =
            CameraController::new(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO, OrbitSettings::default())
                .unwrap();
        controls.apply_input_delta(0.5, 0.0, 2.0);
        let goal = controls.goal();
        for _ in 0..1000 {
            controls.update();
        }
        let state = controls.state();
        assert!((state.azimuth - goal.azimuth).abs() < 1e-3);
        assert!((state.radius - goal.radius).abs() < 1e-3);
    }
}
