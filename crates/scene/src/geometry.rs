use lantern_assets::MeshSource;

/// Non-indexed unit-ish cube: 12 triangles, 36 vertices, spanning -1..1
/// on every axis, with flat per-face normals.
pub fn cube_source() -> MeshSource {
    #[rustfmt::skip]
    let vertices = vec![
        // Front face (Z+)
        -1.0, -1.0,  1.0,   1.0, -1.0,  1.0,   1.0,  1.0,  1.0,
         1.0,  1.0,  1.0,  -1.0,  1.0,  1.0,  -1.0, -1.0,  1.0,
        // Back face (Z-)
        -1.0, -1.0, -1.0,  -1.0,  1.0, -1.0,   1.0,  1.0, -1.0,
         1.0,  1.0, -1.0,   1.0, -1.0, -1.0,  -1.0, -1.0, -1.0,
        // Top face (Y+)
        -1.0,  1.0, -1.0,  -1.0,  1.0,  1.0,   1.0,  1.0,  1.0,
         1.0,  1.0,  1.0,   1.0,  1.0, -1.0,  -1.0,  1.0, -1.0,
        // Bottom face (Y-)
        -1.0, -1.0, -1.0,   1.0, -1.0, -1.0,   1.0, -1.0,  1.0,
         1.0, -1.0,  1.0,  -1.0, -1.0,  1.0,  -1.0, -1.0, -1.0,
        // Right face (X+)
         1.0, -1.0, -1.0,   1.0,  1.0, -1.0,   1.0,  1.0,  1.0,
         1.0,  1.0,  1.0,   1.0, -1.0,  1.0,   1.0, -1.0, -1.0,
        // Left face (X-)
        -1.0, -1.0, -1.0,  -1.0, -1.0,  1.0,  -1.0,  1.0,  1.0,
        -1.0,  1.0,  1.0,  -1.0,  1.0, -1.0,  -1.0, -1.0, -1.0,
    ];

    let mut normals = Vec::with_capacity(vertices.len());
    for face_normal in [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
    ] {
        for _ in 0..6 {
            normals.extend_from_slice(&face_normal);
        }
    }

    MeshSource::Vertex { vertices, normals }
}
