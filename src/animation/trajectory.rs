use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

/// `amplitude * sin(frequency * t + phase)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub amplitude: f32,
    /// Angular frequency in radians per second.
    pub frequency: f32,
    #[serde(default)]
    pub phase: f32,
}

impl Wave {
    #[must_use]
    pub const fn sin(amplitude: f32, frequency: f32) -> Self {
        Self {
            amplitude,
            frequency,
            phase: 0.0,
        }
    }

    #[must_use]
    pub const fn cos(amplitude: f32, frequency: f32) -> Self {
        Self {
            amplitude,
            frequency,
            phase: FRAC_PI_2,
        }
    }

    #[must_use]
    pub const fn with_phase(mut self, phase: f32) -> Self {
        self.phase = phase;
        self
    }

    #[inline]
    #[must_use]
    pub fn eval(&self, t: f32) -> f32 {
        self.amplitude * (self.frequency * t + self.phase).sin()
    }
}

pub type Waves = SmallVec<[Wave; 3]>;

/// Closed-form path: each axis is `base + Σ waves`.
///
/// Position depends on `t` alone, so any time can be evaluated directly with
/// no stepping and no accumulated error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trajectory {
    #[serde(default)]
    pub base: Vec3,
    #[serde(default)]
    pub x: Waves,
    #[serde(default)]
    pub y: Waves,
    #[serde(default)]
    pub z: Waves,
}

impl Trajectory {
    /// Stationary at `base`.
    #[must_use]
    pub fn fixed(base: Vec3) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    /// Horizontal circle of `radius` at `angular_speed` rad/s, starting on +X.
    /// A negative speed orbits clockwise seen from above.
    #[must_use]
    pub fn orbit(radius: f32, angular_speed: f32) -> Self {
        Self {
            base: Vec3::ZERO,
            x: smallvec![Wave::cos(radius, angular_speed)],
            y: SmallVec::new(),
            z: smallvec![Wave::sin(radius, angular_speed)],
        }
    }

    #[must_use]
    pub fn with_base(mut self, base: Vec3) -> Self {
        self.base = base;
        self
    }

    /// Adds a vertical bobbing term.
    #[must_use]
    pub fn with_bob(mut self, amplitude: f32, frequency: f32) -> Self {
        self.y.push(Wave::sin(amplitude, frequency));
        self
    }

    #[must_use]
    pub fn position(&self, t: f32) -> Vec3 {
        let sum = |waves: &Waves| waves.iter().map(|w| w.eval(t)).sum::<f32>();
        self.base + Vec3::new(sum(&self.x), sum(&self.y), sum(&self.z))
    }

    /// Three default paths at distinct radii and frequencies.
    ///
    /// The third path has a radius that breathes with time,
    /// `(7 + sin 0.32t, 7 + sin 0.5t)` on x/z, expanded into plain sinusoids.
    #[must_use]
    pub fn defaults() -> [Self; 3] {
        let inner = Self::orbit(4.0, 0.5).with_bob(1.0, 3.0);

        let middle = Self::orbit(5.0, -0.32).with_bob(1.0, 4.0).with_bob(1.0, 2.5);

        let outer = Self {
            base: Vec3::ZERO,
            // cos(0.18t) * (7 + sin 0.32t)
            x: smallvec![
                Wave::cos(7.0, 0.18),
                Wave::sin(0.5, 0.5),
                Wave::sin(0.5, 0.14),
            ],
            y: smallvec![Wave::sin(1.0, 4.0), Wave::sin(1.0, 2.5)],
            // -sin(0.18t) * (7 + sin 0.5t)
            z: smallvec![
                Wave::sin(7.0, 0.18).with_phase(PI),
                Wave::cos(-0.5, 0.32),
                Wave::cos(0.5, 0.68),
            ],
        };

        [inner, middle, outer]
    }
}
