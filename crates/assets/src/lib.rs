//! Mesh loading: normalizes heterogeneous model sources into flat
//! vertex/normal(/color) buffers.
//!
//! # Invariants
//! - A loaded mesh always has `vertices.len() == normals.len()`, both
//!   multiples of 9 (whole triangles, 3 vertices x 3 floats).
//! - Loading is all-or-nothing: no partially constructed mesh survives a
//!   failure.
//!
//! The text (OBJ) and binary (FBX) format parsers are external
//! collaborators; this crate consumes their output (a text blob, a node
//! tree) and extracts geometry from it.

mod fbx;
mod mesh;
mod obj;

pub use fbx::FbxNode;
pub use mesh::MeshData;

use std::path::Path;

/// Errors from mesh loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// Malformed construction options: missing or unusable source data.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Parsed source lacks required geometry or normal data.
    #[error("malformed asset: {0}")]
    MalformedAsset(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A model source, normalized by [`load_mesh`] into a [`MeshData`].
#[derive(Debug, Clone)]
pub enum MeshSource {
    /// Pre-resolved flat arrays, passed through unmodified.
    Vertex { vertices: Vec<f32>, normals: Vec<f32> },
    /// OBJ-style text blob, scanned line by line.
    Obj(String),
    /// Parsed FBX node tree (the binary parse itself happens upstream).
    Fbx(Vec<FbxNode>),
}

/// Load a mesh from one of the supported source encodings.
///
/// Dispatches on the source variant and validates the result through
/// [`MeshData::new`]. Construction is all-or-nothing.
pub fn load_mesh(source: MeshSource) -> Result<MeshData, AssetError> {
    let data = match source {
        MeshSource::Vertex { vertices, normals } => {
            if vertices.is_empty() || normals.is_empty() {
                return Err(AssetError::InvalidArgument(
                    "vertex source requires non-empty vertices and normals".into(),
                ));
            }
            MeshData::new(vertices, normals, Vec::new())?
        }
        MeshSource::Obj(text) => obj::extract(&text)?,
        MeshSource::Fbx(nodes) => fbx::extract(&nodes)?,
    };
    tracing::debug!(
        vertices = data.vertex_count(),
        triangles = data.triangle_count(),
        "mesh loaded"
    );
    Ok(data)
}

/// Read an OBJ file from disk and load it.
pub fn load_obj_file(path: impl AsRef<Path>) -> Result<MeshData, AssetError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    load_mesh(MeshSource::Obj(text))
}

pub fn crate_info() -> &'static str {
    "lantern-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn triangle() -> (Vec<f32>, Vec<f32>) {
        (
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        )
    }

    #[test]
    fn vertex_source_passthrough_preserves_arrays() {
        let (vertices, normals) = triangle();
        let mesh = load_mesh(MeshSource::Vertex {
            vertices: vertices.clone(),
            normals: normals.clone(),
        })
        .unwrap();
        assert_eq!(mesh.vertices, vertices);
        assert_eq!(mesh.normals, normals);
        assert!(!mesh.has_colors());
    }

    #[test]
    fn vertex_source_empty_is_invalid_argument() {
        let err = load_mesh(MeshSource::Vertex {
            vertices: vec![],
            normals: vec![],
        })
        .unwrap_err();
        assert!(matches!(err, AssetError::InvalidArgument(_)));
    }

    #[test]
    fn vertex_source_length_mismatch_is_malformed() {
        let (vertices, _) = triangle();
        let err = load_mesh(MeshSource::Vertex {
            vertices,
            normals: vec![0.0, 0.0, 1.0],
        })
        .unwrap_err();
        assert!(matches!(err, AssetError::MalformedAsset(_)));
    }

    #[test]
    fn obj_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "v 0 0 0").unwrap();
        writeln!(file, "v 1 0 0").unwrap();
        writeln!(file, "v 0 1 0").unwrap();
        writeln!(file, "vn 0 0 1").unwrap();
        writeln!(file, "vn 0 0 1").unwrap();
        writeln!(file, "vn 0 0 1").unwrap();
        let mesh = load_obj_file(file.path()).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn missing_obj_file_is_io_error() {
        let err = load_obj_file("/nonexistent/model.obj").unwrap_err();
        assert!(matches!(err, AssetError::Io(_)));
    }
}
