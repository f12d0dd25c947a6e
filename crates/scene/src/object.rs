use crate::physics::GravityBody;
use glam::Vec3;
use lantern_assets::{AssetError, MeshData, MeshSource, load_mesh};
use lantern_common::{ObjectId, ShaderProgram, Transform};

/// Render-facing mesh: loaded geometry plus an optional bound shader
/// program. When no program is bound, the render pass falls back to the
/// camera's program, then the engine default.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub data: MeshData,
    pub shader_program: Option<ShaderProgram>,
}

impl Mesh {
    pub fn new(data: MeshData, shader_program: Option<ShaderProgram>) -> Self {
        Self {
            data,
            shader_program,
        }
    }
}

/// A positioned, renderable scene object owning exactly one mesh.
///
/// Construction is two-phase: [`GameObject::new`] is the pure constructor
/// over an already-resolved mesh; [`GameObject::load`] composes the mesh
/// loader with it. The mesh is created once and never swapped.
#[derive(Debug)]
pub struct GameObject {
    pub id: ObjectId,
    pub transform: Transform,
    mesh: Mesh,
    /// Attached constant-acceleration integrator; `None` leaves the
    /// per-frame hook a no-op.
    pub body: Option<GravityBody>,
}

impl GameObject {
    /// Construct from an already-resolved mesh.
    pub fn new(mesh: Mesh) -> Self {
        Self {
            id: ObjectId::new(),
            transform: Transform::default(),
            mesh,
            body: None,
        }
    }

    /// Resolve a mesh from `source` and construct. Fails with the
    /// loader's error; no object exists on failure.
    pub fn load(
        source: MeshSource,
        shader_program: Option<ShaderProgram>,
    ) -> Result<Self, AssetError> {
        let data = load_mesh(source)?;
        Ok(Self::new(Mesh::new(data, shader_program)))
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.transform.scale = Vec3::splat(scale);
    }

    /// Per-frame update hook. Integrates the gravity body when one is
    /// attached; otherwise a no-op.
    pub fn update(&mut self, dt: f32) {
        if let Some(body) = &mut self.body {
            body.tick(&mut self.transform, dt);
        }
    }
}
