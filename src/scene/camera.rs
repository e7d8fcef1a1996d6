use glam::Mat4;

/// Perspective camera attached to a node.
///
/// The view matrix is not stored here: it is the inverse of the owning
/// node's world transform and is derived by the native renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub aspect: f32,
    /// Vertical field of view, in radians.
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// `fovy_degrees` is converted to radians.
    #[must_use]
    pub fn new_perspective(fovy_degrees: f32, aspect: f32, znear: f32, zfar: f32) -> Self {
        Self {
            aspect,
            fovy: fovy_degrees.to_radians(),
            znear,
            zfar,
        }
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new_perspective(60.0, 16.0 / 9.0, 0.1, 1000.0)
    }
}
