use glam::{Affine3A, EulerRot, Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Local TRS transform of a scene node.
///
/// Position, rotation and scale are public and may be written freely. The
/// cached local matrix is refreshed lazily: [`Transform::update_local_matrix`]
/// compares the public fields against the last committed values and only
/// rebuilds the matrix when something changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    #[serde(skip, default = "identity")]
    local_matrix: Affine3A,

    #[serde(skip, default = "identity")]
    pub(crate) world_matrix: Affine3A,

    // Shadow state for dirty checking
    #[serde(skip)]
    committed: Option<(Vec3, Quat, Vec3)>,
}

fn identity() -> Affine3A {
    Affine3A::IDENTITY
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,
            committed: None,
        }
    }

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Rebuilds the cached local matrix if the TRS fields changed since the
    /// last call. Returns whether a rebuild happened.
    pub fn update_local_matrix(&mut self) -> bool {
        let current = (self.position, self.rotation, self.scale);
        if self.committed == Some(current) {
            return false;
        }
        self.local_matrix =
            Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position);
        self.committed = Some(current);
        true
    }

    /// Composes the local matrix straight from the TRS fields, ignoring the cache.
    #[inline]
    #[must_use]
    pub fn compose(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Sets rotation from XYZ Euler angles in radians.
    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
    }

    #[must_use]
    pub fn rotation_euler(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    /// World matrix as of the last hierarchy update.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    pub(crate) fn set_world_matrix(&mut self, mat: Affine3A) {
        self.world_matrix = mat;
    }

    /// Replaces position/rotation/scale with the decomposition of `mat`.
    ///
    /// Shear is lost in the decomposition.
    pub fn apply_local_matrix(&mut self, mat: Affine3A) {
        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        self.scale = scale;
        self.rotation = rotation;
        self.position = translation;
        self.mark_dirty();
    }

    /// Rotates so that -Z points at `target`. `target` and `up` are in the
    /// parent's space. Degenerate inputs leave the rotation untouched.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let offset = target - self.position;
        if offset.length_squared() < 1e-12 {
            return;
        }
        let forward = offset.normalize();
        if forward.cross(up).length_squared() < 1e-4 {
            return;
        }

        let right = forward.cross(up).normalize();
        let new_up = right.cross(forward).normalize();
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, new_up, -forward));
    }

    /// Forces the next [`Transform::update_local_matrix`] to rebuild.
    pub fn mark_dirty(&mut self) {
        self.committed = None;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.rotation == other.rotation
            && self.scale == other.scale
    }
}
