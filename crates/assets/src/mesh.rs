use crate::AssetError;
use serde::{Deserialize, Serialize};

/// Flat triangle-list geometry: positions and normals (3 floats per
/// vertex), optional colors (4 floats per vertex).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub normals: Vec<f32>,
    /// Empty when the source carries no per-vertex colors.
    pub colors: Vec<f32>,
}

impl MeshData {
    /// Validate and construct. Fails with [`AssetError::MalformedAsset`]
    /// when the buffers do not describe whole triangles.
    pub fn new(vertices: Vec<f32>, normals: Vec<f32>, colors: Vec<f32>) -> Result<Self, AssetError> {
        if vertices.len() != normals.len() {
            return Err(AssetError::MalformedAsset(format!(
                "vertex/normal length mismatch: {} vs {}",
                vertices.len(),
                normals.len()
            )));
        }
        if vertices.len() % 9 != 0 {
            return Err(AssetError::MalformedAsset(format!(
                "vertex data is not triangle-aligned: {} floats",
                vertices.len()
            )));
        }
        if !colors.is_empty() && colors.len() / 4 != vertices.len() / 3 {
            return Err(AssetError::MalformedAsset(format!(
                "color count {} does not match vertex count {}",
                colors.len() / 4,
                vertices.len() / 3
            )));
        }
        Ok(Self {
            vertices,
            normals,
            colors,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 9
    }

    pub fn has_colors(&self) -> bool {
        !self.colors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_triangles_accepted() {
        let mesh = MeshData::new(vec![0.0; 18], vec![0.0; 18], vec![]).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn partial_triangle_rejected() {
        // 12 floats = 4 vertices, not a whole number of triangles.
        let err = MeshData::new(vec![0.0; 12], vec![0.0; 12], vec![]).unwrap_err();
        assert!(matches!(err, AssetError::MalformedAsset(_)));
    }

    #[test]
    fn mismatched_normals_rejected() {
        let err = MeshData::new(vec![0.0; 9], vec![0.0; 18], vec![]).unwrap_err();
        assert!(matches!(err, AssetError::MalformedAsset(_)));
    }

    #[test]
    fn colors_must_cover_every_vertex() {
        // 3 vertices need 12 color floats, not 8.
        let err = MeshData::new(vec![0.0; 9], vec![0.0; 9], vec![0.0; 8]).unwrap_err();
        assert!(matches!(err, AssetError::MalformedAsset(_)));

        let mesh = MeshData::new(vec![0.0; 9], vec![0.0; 9], vec![0.5; 12]).unwrap();
        assert!(mesh.has_colors());
    }
}
