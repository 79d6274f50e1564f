//! Asset module
//!
//! - [`AssetServer`]: shared geometry/material storage (cheap to clone)
//! - [`Prefab`]: a loader's result, a detached node hierarchy as plain data
//! - [`AssetLoader`]: the seam to the external loader, completing through a
//!   [`LoadCompletion`] channel

pub mod loader;
pub mod prefab;
pub mod storage;

pub use loader::{AssetLoader, AssetSource, LoadCompletion, LoadResult, PrefabLibrary, TokioLoader};
pub use prefab::{Prefab, PrefabNode};
pub use storage::AssetStorage;

use std::sync::Arc;

use glam::Vec3;
use slotmap::new_key_type;

new_key_type! {
    pub struct GeometryHandle;
    pub struct MaterialHandle;
}

/// Geometry descriptor. Vertex data is produced by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Box { width: f32, height: f32, depth: f32 },
    Plane { width: f32, height: f32 },
    Sphere { radius: f32 },
    Cone { radius: f32, height: f32 },
    /// Debug axes, `size` units long.
    Axes { size: f32 },
}

impl Geometry {
    #[must_use]
    pub fn new_box(width: f32, height: f32, depth: f32) -> Self {
        Self::Box {
            width,
            height,
            depth,
        }
    }

    #[must_use]
    pub fn new_plane(width: f32, height: f32) -> Self {
        Self::Plane { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Double,
}

/// Standard (roughness/AO) material parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub color: Vec3,
    pub roughness: f32,
    pub ao_map_intensity: f32,
    pub side: Side,
    /// Helpers and other unlit debug geometry.
    pub unlit: bool,
}

impl Material {
    #[must_use]
    pub fn new_standard(name: impl Into<String>, color: Vec3) -> Self {
        Self {
            name: name.into(),
            color,
            roughness: 1.0,
            ao_map_intensity: 1.0,
            side: Side::Front,
            unlit: false,
        }
    }

    #[must_use]
    pub fn new_unlit(name: impl Into<String>, color: Vec3) -> Self {
        Self {
            unlit: true,
            ..Self::new_standard(name, color)
        }
    }

    #[must_use]
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    #[must_use]
    pub fn with_ao_map_intensity(mut self, intensity: f32) -> Self {
        self.ao_map_intensity = intensity;
        self
    }

    #[must_use]
    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }
}

/// Converts a `0xRRGGBB` colour to linear-ish `[0, 1]` RGB.
#[must_use]
pub fn color_hex(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

#[derive(Clone, Default)]
pub struct AssetServer {
    pub geometries: Arc<AssetStorage<GeometryHandle, Geometry>>,
    pub materials: Arc<AssetStorage<MaterialHandle, Material>>,
}

impl AssetServer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_geometry(&self, geometry: Geometry) -> GeometryHandle {
        self.geometries.add(geometry)
    }

    pub fn add_material(&self, material: Material) -> MaterialHandle {
        self.materials.add(material)
    }

    #[must_use]
    pub fn material(&self, handle: MaterialHandle) -> Option<Arc<Material>> {
        self.materials.get(handle)
    }
}
