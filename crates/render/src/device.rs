use crate::RenderError;
use glam::{Mat4, Vec3};
use lantern_common::{BufferHandle, ShaderProgram};

/// The rasterization-API collaborator contract.
///
/// Modeled on a GL-style immediate interface: transient buffer uploads,
/// named attributes and uniforms resolved per program, triangle-list
/// draws. Backends own every resource behind the opaque handles.
///
/// Uniform and attribute names follow the engine's wire contract
/// (`a_position`, `u_model`, `u_lights[i].color`, ...). Setting a name a
/// program does not declare is a no-op, as with a GL location lookup that
/// returns null.
pub trait GraphicsDevice {
    /// Hardware capability: how many 4-component uniform vectors a
    /// fragment shader may declare. Queried once at engine construction
    /// to derive the light budget.
    fn max_fragment_uniform_vectors(&self) -> u32;

    /// Compile and link a program from per-stage sources. Errors carry
    /// the backend's compile/link log.
    fn create_shader_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ShaderProgram, RenderError>;

    /// Clear color and depth of the current target.
    fn clear(&mut self, color: [f32; 4]);

    /// Upload a transient buffer for the next draw. The handle is only
    /// valid until [`release_state`](Self::release_state).
    fn upload_buffer(&mut self, data: &[f32]) -> BufferHandle;

    /// Location of a named vertex attribute, if the program declares it.
    fn attribute_location(&self, program: ShaderProgram, name: &str) -> Option<u32>;

    /// Bind a buffer to a named attribute with the given component count
    /// per vertex. Unknown names are ignored.
    fn bind_attribute(
        &mut self,
        program: ShaderProgram,
        name: &str,
        buffer: BufferHandle,
        components: u32,
    );

    /// Select the program for the next draw. An unknown or unlinked
    /// handle is an error; callers treat it as a per-draw skip.
    fn use_program(&mut self, program: ShaderProgram) -> Result<(), RenderError>;

    fn set_uniform_mat4(&mut self, program: ShaderProgram, name: &str, value: &Mat4);
    fn set_uniform_vec3(&mut self, program: ShaderProgram, name: &str, value: Vec3);
    fn set_uniform_f32(&mut self, program: ShaderProgram, name: &str, value: f32);
    fn set_uniform_i32(&mut self, program: ShaderProgram, name: &str, value: i32);

    /// Issue a triangle-list draw over `vertex_count` vertices.
    fn draw_triangles(&mut self, vertex_count: u32);

    /// Drop all attribute, buffer, and program bindings.
    fn release_state(&mut self);
}
