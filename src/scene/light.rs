use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Clamps a light parameter to `[0, +inf)`, mapping NaN to zero.
fn non_negative(what: &str, value: f32) -> f32 {
    if value >= 0.0 {
        value
    } else {
        log::warn!("Light {what} must be non-negative, got {value}; clamping to 0");
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    distance: f32,
    decay: f32,
}

impl PointLight {
    /// `distance` is the falloff cutoff (0 means infinite), `decay` the
    /// attenuation exponent. Negative inputs are clamped to zero.
    #[must_use]
    pub fn new(distance: f32, decay: f32) -> Self {
        Self {
            distance: non_negative("distance", distance),
            decay: non_negative("decay", decay),
        }
    }

    #[inline]
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    #[inline]
    #[must_use]
    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = non_negative("distance", distance);
    }

    pub fn set_decay(&mut self, decay: f32) {
        self.decay = non_negative("decay", decay);
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            distance: 0.0,
            decay: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    /// Shines along the node's -Z axis.
    Directional,
    Point(PointLight),
}

/// Light component attached to a scene node.
///
/// The light's position is the world translation of its node.
#[derive(Debug, Clone)]
pub struct Light {
    pub uuid: Uuid,
    pub color: Vec3,
    intensity: f32,
    pub kind: LightKind,
}

impl Light {
    fn with_kind(color: Vec3, intensity: f32, kind: LightKind) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            color,
            intensity: non_negative("intensity", intensity),
            kind,
        }
    }

    #[must_use]
    pub fn new_ambient(color: Vec3, intensity: f32) -> Self {
        Self::with_kind(color, intensity, LightKind::Ambient)
    }

    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32) -> Self {
        Self::with_kind(color, intensity, LightKind::Directional)
    }

    #[must_use]
    pub fn new_point(color: Vec3, intensity: f32, distance: f32, decay: f32) -> Self {
        Self::with_kind(
            color,
            intensity,
            LightKind::Point(PointLight::new(distance, decay)),
        )
    }

    #[inline]
    #[must_use]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = non_negative("intensity", intensity);
    }

    #[must_use]
    pub fn as_point(&self) -> Option<&PointLight> {
        match &self.kind {
            LightKind::Point(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_point_mut(&mut self) -> Option<&mut PointLight> {
        match &mut self.kind {
            LightKind::Point(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_ambient(&self) -> bool {
        matches!(self.kind, LightKind::Ambient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_parameters_are_clamped() {
        let mut light = Light::new_point(Vec3::ONE, -3.0, -1.0, f32::NAN);
        assert_eq!(light.intensity(), 0.0);
        let point = light.as_point().unwrap();
        assert_eq!(point.distance(), 0.0);
        assert_eq!(point.decay(), 0.0);

        light.set_intensity(12.0);
        assert_eq!(light.intensity(), 12.0);
        light.as_point_mut().unwrap().set_decay(-0.5);
        assert_eq!(light.as_point().unwrap().decay(), 0.0);
    }
}
