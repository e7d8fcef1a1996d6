use glam::Vec3;

/// Point light attached to a node; positioned by the node's world transform.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    pub color: Vec3,
    pub intensity: f32,
}

impl PointLight {
    #[must_use]
    pub fn new(color: Vec3, intensity: f32) -> Self {
        Self { color, intensity }
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}
