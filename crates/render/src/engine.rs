use crate::{GraphicsDevice, RenderError, shader};
use glam::Vec3;
use lantern_assets::MeshSource;
use lantern_common::{CameraId, LightId, ObjectId, ShaderProgram};
use lantern_scene::{Camera, GameObject, Light};
use tracing::{debug, warn};

/// Background for every camera clear: opaque black.
pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// The engine: owns the graphics device and the scene registries, and
/// drives the per-tick update and render pass.
///
/// # Invariants
/// - Registration order is draw order; removal preserves the order of the
///   remaining entries.
/// - Every registered object is drawn against every registered camera.
/// - `u_lightCount` never exceeds the light budget derived at
///   construction.
pub struct Engine<D: GraphicsDevice> {
    device: D,
    cameras: Vec<Camera>,
    objects: Vec<GameObject>,
    lights: Vec<Light>,
    max_lights: u32,
    default_program: ShaderProgram,
}

impl<D: GraphicsDevice> Engine<D> {
    /// Build an engine over `device`: queries the uniform-vector capacity,
    /// derives the light budget, and compiles the default program with
    /// that budget baked in.
    pub fn new(mut device: D) -> Result<Self, RenderError> {
        let capacity = device.max_fragment_uniform_vectors();
        let max_lights = shader::max_lights(capacity);
        let default_program = device.create_shader_program(
            &shader::vertex_shader_source(max_lights),
            &shader::fragment_shader_source(max_lights),
        )?;
        debug!(capacity, max_lights, "engine initialized");
        Ok(Self {
            device,
            cameras: Vec::new(),
            objects: Vec::new(),
            lights: Vec::new(),
            max_lights,
            default_program,
        })
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Light budget derived from the device capacity at construction.
    pub fn max_lights(&self) -> u32 {
        self.max_lights
    }

    pub fn default_program(&self) -> ShaderProgram {
        self.default_program
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn cameras_mut(&mut self) -> &mut [Camera] {
        &mut self.cameras
    }

    pub fn objects(&self) -> &[GameObject] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [GameObject] {
        &mut self.objects
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut [Light] {
        &mut self.lights
    }

    pub fn add_camera(&mut self, camera: Camera) -> CameraId {
        let id = camera.id;
        self.cameras.push(camera);
        id
    }

    /// Unregister a camera. A no-op when the id is not registered.
    pub fn remove_camera(&mut self, id: CameraId) {
        if let Some(pos) = self.cameras.iter().position(|c| c.id == id) {
            self.cameras.remove(pos);
        }
    }

    pub fn add_object(&mut self, object: GameObject) -> ObjectId {
        let id = object.id;
        self.objects.push(object);
        id
    }

    pub fn remove_object(&mut self, id: ObjectId) {
        if let Some(pos) = self.objects.iter().position(|o| o.id == id) {
            self.objects.remove(pos);
        }
    }

    pub fn add_light(&mut self, light: Light) -> LightId {
        let id = light.id;
        self.lights.push(light);
        id
    }

    pub fn remove_light(&mut self, id: LightId) {
        if let Some(pos) = self.lights.iter().position(|l| l.id == id) {
            self.lights.remove(pos);
        }
    }

    /// Load a mesh from `source`, wrap it in an object bound to the engine
    /// default program, and register it.
    pub fn create_object(&mut self, source: MeshSource) -> Result<ObjectId, RenderError> {
        let object = GameObject::load(source, Some(self.default_program))?;
        Ok(self.add_object(object))
    }

    /// One tick: clear every camera's target, run each object's update
    /// hook, then draw each object against every camera in registration
    /// order.
    pub fn update(&mut self, dt: f32) {
        for _ in &self.cameras {
            self.device.clear(CLEAR_COLOR);
        }
        for i in 0..self.objects.len() {
            self.objects[i].update(dt);
            for j in 0..self.cameras.len() {
                render_object(
                    &mut self.device,
                    &self.objects[i],
                    &self.cameras[j],
                    &self.lights,
                    self.max_lights,
                    self.default_program,
                );
            }
        }
    }
}

/// Draw one object through one camera.
///
/// Per-draw lifecycle: upload transient buffers, resolve the program
/// (mesh, then camera, then engine default), bind attributes, set
/// uniforms, draw, release all state. A program the device rejects skips
/// this draw only.
fn render_object<D: GraphicsDevice>(
    device: &mut D,
    object: &GameObject,
    camera: &Camera,
    lights: &[Light],
    max_lights: u32,
    default_program: ShaderProgram,
) {
    let mesh = object.mesh();
    let program = mesh
        .shader_program
        .or(camera.shader_program)
        .unwrap_or(default_program);

    if let Err(err) = device.use_program(program) {
        warn!(object = ?object.id, %err, "skipping draw");
        device.release_state();
        return;
    }

    let positions = device.upload_buffer(&mesh.data.vertices);
    device.bind_attribute(program, "a_position", positions, 3);
    let normals = device.upload_buffer(&mesh.data.normals);
    device.bind_attribute(program, "a_normal", normals, 3);
    if mesh.data.has_colors() && device.attribute_location(program, "a_color").is_some() {
        let colors = device.upload_buffer(&mesh.data.colors);
        device.bind_attribute(program, "a_color", colors, 4);
    }

    device.set_uniform_mat4(program, "u_model", &object.transform.model_matrix());
    device.set_uniform_mat4(program, "u_view", &camera.view_matrix());
    device.set_uniform_mat4(program, "u_projection", &camera.projection_matrix());

    let count = (lights.len() as u32).min(max_lights);
    device.set_uniform_i32(program, "u_lightCount", count as i32);
    for (i, light) in lights.iter().take(count as usize).enumerate() {
        device.set_uniform_vec3(program, &format!("u_lights[{i}].color"), light.color);
        device.set_uniform_f32(program, &format!("u_lights[{i}].intensity"), light.intensity);
        device.set_uniform_vec3(
            program,
            &format!("u_lights[{i}].direction"),
            light.direction().unwrap_or(Vec3::ZERO),
        );
    }

    device.draw_triangles(mesh.data.vertex_count() as u32);
    device.release_state();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DeviceCall, RecordingDevice};
    use glam::Vec2;
    use lantern_scene::cube_source;

    fn engine_with_capacity(capacity: u32) -> Engine<RecordingDevice> {
        Engine::new(RecordingDevice::with_capacity(capacity)).unwrap()
    }

    #[test]
    fn budget_comes_from_device_capacity() {
        // floor((224 - 5) / 3)
        assert_eq!(engine_with_capacity(224).max_lights(), 73);
        assert_eq!(engine_with_capacity(14).max_lights(), 3);
    }

    #[test]
    fn degenerate_capacity_still_renders_with_zero_lights() {
        // Capacity 5 leaves no room for lights at all.
        let mut engine = engine_with_capacity(5);
        assert_eq!(engine.max_lights(), 0);
        engine.add_camera(Camera::default());
        engine.create_object(cube_source()).unwrap();
        engine.add_light(Light::directional(Vec3::ONE, 1.0));
        engine.device_mut().clear_calls();

        engine.update(0.016);

        assert_eq!(engine.device_mut().draw_count(), 1);
        assert_eq!(
            engine.device_mut().i32_uniform_values("u_lightCount"),
            vec![0]
        );
    }

    #[test]
    fn cube_frame_issues_one_draw_of_36_vertices() {
        let mut engine = engine_with_capacity(224);
        engine.add_camera(Camera::default());
        engine.create_object(cube_source()).unwrap();
        engine.add_light(Light::directional(Vec3::ONE, 1.0));
        engine.device_mut().clear_calls();

        engine.update(0.016);

        let calls = engine.device_mut().calls().to_vec();
        let draws: Vec<_> = calls
            .iter()
            .filter_map(|c| match c {
                DeviceCall::DrawTriangles { vertex_count } => Some(*vertex_count),
                _ => None,
            })
            .collect();
        // 12 triangles.
        assert_eq!(draws, vec![36]);
        assert_eq!(
            engine.device_mut().i32_uniform_values("u_lightCount"),
            vec![1]
        );
    }

    #[test]
    fn frame_clears_once_per_camera() {
        let mut engine = engine_with_capacity(224);
        engine.add_camera(Camera::default());
        engine.add_camera(Camera::default());
        engine.device_mut().clear_calls();

        engine.update(0.016);

        let clears = engine
            .device_mut()
            .calls()
            .iter()
            .filter(|c| matches!(c, DeviceCall::Clear { color } if *color == CLEAR_COLOR))
            .count();
        assert_eq!(clears, 2);
    }

    #[test]
    fn every_object_draws_against_every_camera() {
        let mut engine = engine_with_capacity(224);
        engine.add_camera(Camera::default());
        engine.add_camera(Camera::default());
        engine.create_object(cube_source()).unwrap();
        engine.create_object(cube_source()).unwrap();
        engine.create_object(cube_source()).unwrap();
        engine.device_mut().clear_calls();

        engine.update(0.016);

        assert_eq!(engine.device_mut().draw_count(), 6);
    }

    #[test]
    fn light_count_is_truncated_to_the_budget() {
        // Capacity 14 yields a budget of 3.
        let mut engine = engine_with_capacity(14);
        engine.add_camera(Camera::default());
        engine.create_object(cube_source()).unwrap();
        for _ in 0..5 {
            engine.add_light(Light::directional(Vec3::ONE, 1.0));
        }
        engine.device_mut().clear_calls();

        engine.update(0.016);

        assert_eq!(
            engine.device_mut().i32_uniform_values("u_lightCount"),
            vec![3]
        );
        // Only the first three registered slots are uploaded.
        let slot_names: Vec<_> = engine
            .device_mut()
            .calls()
            .iter()
            .filter_map(|c| match c {
                DeviceCall::SetUniformVec3 { name, .. } if name.ends_with(".color") => {
                    Some(name.clone())
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            slot_names,
            vec!["u_lights[0].color", "u_lights[1].color", "u_lights[2].color"]
        );
    }

    #[test]
    fn area_lights_upload_zero_direction() {
        let mut engine = engine_with_capacity(224);
        engine.add_camera(Camera::default());
        engine.create_object(cube_source()).unwrap();
        engine.add_light(Light::area(
            Vec3::ONE,
            2.0,
            Vec3::new(0.0, 5.0, 0.0),
            Vec2::new(2.0, 2.0),
        ));
        engine.device_mut().clear_calls();

        engine.update(0.016);

        let dir = engine
            .device_mut()
            .calls()
            .iter()
            .find_map(|c| match c {
                DeviceCall::SetUniformVec3 { name, value, .. }
                    if name == "u_lights[0].direction" =>
                {
                    Some(*value)
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(dir, Vec3::ZERO);
    }

    #[test]
    fn broken_program_skips_only_its_own_draw() {
        let mut engine = engine_with_capacity(224);
        engine.add_camera(Camera::default());

        let broken = GameObject::load(cube_source(), Some(ShaderProgram(999))).unwrap();
        engine.add_object(broken);
        engine.create_object(cube_source()).unwrap();
        engine.device_mut().clear_calls();

        engine.update(0.016);

        // One draw survives; the skipped path still releases state.
        assert_eq!(engine.device_mut().draw_count(), 1);
        let releases = engine
            .device_mut()
            .calls()
            .iter()
            .filter(|c| matches!(c, DeviceCall::ReleaseState))
            .count();
        assert_eq!(releases, 2);
    }

    #[test]
    fn program_resolution_prefers_mesh_then_camera_then_default() {
        let mut engine = engine_with_capacity(224);
        let device = engine.device_mut();
        let camera_program = device
            .create_shader_program(
                &shader::vertex_shader_source(1),
                &shader::fragment_shader_source(1),
            )
            .unwrap();
        let mesh_program = device
            .create_shader_program(
                &shader::vertex_shader_source(1),
                &shader::fragment_shader_source(1),
            )
            .unwrap();

        let mut camera = Camera::default();
        camera.shader_program = Some(camera_program);
        engine.add_camera(camera);

        let with_mesh_program = GameObject::load(cube_source(), Some(mesh_program)).unwrap();
        engine.add_object(with_mesh_program);
        let without = GameObject::load(cube_source(), None).unwrap();
        engine.add_object(without);
        engine.device_mut().clear_calls();

        engine.update(0.016);

        let used: Vec<_> = engine
            .device_mut()
            .calls()
            .iter()
            .filter_map(|c| match c {
                DeviceCall::UseProgram { program } => Some(*program),
                _ => None,
            })
            .collect();
        assert_eq!(used, vec![mesh_program, camera_program]);
    }

    #[test]
    fn state_is_released_after_every_draw() {
        let mut engine = engine_with_capacity(224);
        engine.add_camera(Camera::default());
        engine.create_object(cube_source()).unwrap();
        engine.create_object(cube_source()).unwrap();
        engine.device_mut().clear_calls();

        engine.update(0.016);

        let calls = engine.device_mut().calls();
        let mut open = false;
        for call in calls {
            match call {
                DeviceCall::UseProgram { .. } => open = true,
                DeviceCall::ReleaseState => open = false,
                DeviceCall::DrawTriangles { .. } => assert!(open),
                _ => {}
            }
        }
        assert!(!open);
    }

    #[test]
    fn removal_is_a_noop_for_unknown_ids_and_preserves_order() {
        let mut engine = engine_with_capacity(224);
        let a = engine.add_light(Light::directional(Vec3::X, 1.0));
        let b = engine.add_light(Light::directional(Vec3::Y, 1.0));
        let c = engine.add_light(Light::directional(Vec3::Z, 1.0));

        engine.remove_light(LightId::new());
        assert_eq!(engine.lights().len(), 3);

        engine.remove_light(b);
        let remaining: Vec<_> = engine.lights().iter().map(|l| l.id).collect();
        assert_eq!(remaining, vec![a, c]);
    }

    #[test]
    fn objects_update_before_rendering() {
        let mut engine = engine_with_capacity(224);
        engine.add_camera(Camera::default());
        let id = engine.create_object(cube_source()).unwrap();
        if let Some(obj) = engine.objects_mut().iter_mut().find(|o| o.id == id) {
            obj.body = Some(lantern_scene::GravityBody::default());
        }
        engine.device_mut().clear_calls();

        engine.update(1.0);

        let obj = engine.objects().iter().find(|o| o.id == id).unwrap();
        assert!(obj.transform.position.y < 0.0);
        let expected = obj.transform.model_matrix();
        // The drawn model matrix reflects the post-update transform.
        let drawn = engine
            .device_mut()
            .calls()
            .iter()
            .find_map(|c| match c {
                DeviceCall::SetUniformMat4 { name, value, .. } if name == "u_model" => {
                    Some(*value)
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(drawn, expected);
    }
}
