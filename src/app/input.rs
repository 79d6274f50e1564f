use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

/// Windowing-agnostic input, already reduced to what the core consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer drag in pixels since the previous event.
    PointerDelta { dx: f32, dy: f32 },
    /// Wheel steps; positive zooms in.
    Scroll { dy: f32 },
    /// Drawing surface resized, in physical pixels.
    Resize { width: u32, height: u32 },
}

/// Orbit deltas produced from one input event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrbitDelta {
    pub azimuth: f32,
    pub polar: f32,
    pub radius: f32,
}

/// Pixel-to-orbit conversion.
///
/// A drag across the full surface height turns the camera a full circle.
/// Each scroll step scales the distance by `1 - zoom_speed`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputMapping {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    #[serde(skip, default = "default_screen_height")]
    screen_height: f32,
}

fn default_screen_height() -> f32 {
    720.0
}

impl Default for InputMapping {
    fn default() -> Self {
        Self {
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            screen_height: default_screen_height(),
        }
    }
}

impl InputMapping {
    #[must_use]
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn screen_height(&self) -> f32 {
        self.screen_height
    }

    pub fn set_screen_height(&mut self, height: u32) {
        if height > 0 {
            self.screen_height = height as f32;
        }
    }

    /// Maps a pointer or scroll event to orbit deltas for a camera at
    /// `radius`. Resize events produce none.
    #[must_use]
    pub fn orbit_delta(&self, event: &InputEvent, radius: f32) -> Option<OrbitDelta> {
        match *event {
            InputEvent::PointerDelta { dx, dy } => {
                let per_pixel = TAU / self.screen_height.max(1.0) * self.rotate_speed;
                Some(OrbitDelta {
                    azimuth: -dx * per_pixel,
                    polar: -dy * per_pixel,
                    radius: 0.0,
                })
            }
            InputEvent::Scroll { dy } if dy != 0.0 => {
                let scale = (1.0 - self.zoom_speed).powf(dy.abs());
                let new_radius = if dy > 0.0 { radius * scale } else { radius / scale };
                Some(OrbitDelta {
                    radius: new_radius - radius,
                    ..OrbitDelta::default()
                })
            }
            InputEvent::Scroll { .. } | InputEvent::Resize { .. } => None,
        }
    }
}
