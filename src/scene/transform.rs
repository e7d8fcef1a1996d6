use glam::{Affine3A, EulerRot, Mat3, Quat, Vec3};

/// Local transform of a node: translation, rotation, scale (TRS).
///
/// A plain value type. Writes that should reach the native engine go
/// through [`NodeGraph`](crate::scene::NodeGraph), never through a
/// `Transform` held by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn from_scale(scale: Vec3) -> Self {
        Self {
            scale,
            ..Self::IDENTITY
        }
    }

    /// Decomposes an affine matrix.
    ///
    /// Shear is lost in the decomposition.
    #[must_use]
    pub fn from_matrix(mat: Affine3A) -> Self {
        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Local matrix, `T * R * S`.
    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Rotation from Euler angles (radians) in the given order.
    #[must_use]
    pub fn euler_rotation(order: EulerRot, a: f32, b: f32, c: f32) -> Quat {
        Quat::from_euler(order, a, b, c)
    }

    /// Current rotation as XYZ Euler angles.
    #[must_use]
    pub fn rotation_euler(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    /// Rotation that points -Z at `target`, both expressed in the parent
    /// space of this transform. Returns `None` when `forward` and `up` are
    /// collinear.
    #[must_use]
    pub fn look_at_rotation(&self, target: Vec3, up: Vec3) -> Option<Quat> {
        let forward = (target - self.translation).normalize_or_zero();
        if forward.cross(up).length_squared() < 1e-4 {
            return None;
        }

        let right = forward.cross(up).normalize();
        let new_up = right.cross(forward).normalize();
        Some(Quat::from_mat3(&Mat3::from_cols(right, new_up, -forward)))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
