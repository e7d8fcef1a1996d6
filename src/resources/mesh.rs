use glam::Vec3;
use uuid::Uuid;

use crate::errors::{PgeError, Result};

/// Triangle mesh geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub uuid: Uuid,
    pub name: String,
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
}

impl Mesh {
    /// Fails with [`PgeError::InvalidResource`] if the index count is not a
    /// multiple of three or an index points past the vertex list.
    pub fn new(name: impl Into<String>, vertices: Vec<Vec3>, indices: Vec<u32>) -> Result<Self> {
        let name = name.into();
        if indices.len() % 3 != 0 {
            return Err(PgeError::InvalidResource(format!(
                "mesh {name:?}: index count {} is not a multiple of 3",
                indices.len()
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(PgeError::InvalidResource(format!(
                "mesh {name:?}: index {bad} out of range for {} vertices",
                vertices.len()
            )));
        }
        Ok(Self {
            uuid: Uuid::new_v4(),
            name,
            vertices,
            indices,
        })
    }

    /// Axis-aligned cube centred on the origin.
    #[must_use]
    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;
        let vertices = vec![
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ];
        #[rustfmt::skip]
        let indices = vec![
            4, 5, 6, 4, 6, 7, // +z
            1, 0, 3, 1, 3, 2, // -z
            5, 1, 2, 5, 2, 6, // +x
            0, 4, 7, 0, 7, 3, // -x
            7, 6, 2, 7, 2, 3, // +y
            0, 1, 5, 0, 5, 4, // -y
        ];
        Self {
            uuid: Uuid::new_v4(),
            name: "Cube".to_owned(),
            vertices,
            indices,
        }
    }

    #[must_use]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// `(min, max)` corners of the bounding box, `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(min, max), &v| (min.min(v), max.max(v))),
        )
    }
}
