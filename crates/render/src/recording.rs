use crate::{GraphicsDevice, RenderError, shader};
use glam::{Mat4, Vec3};
use lantern_common::{BufferHandle, ShaderProgram};
use std::collections::HashMap;

/// One recorded device operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    Clear {
        color: [f32; 4],
    },
    UploadBuffer {
        buffer: BufferHandle,
        len: usize,
    },
    UseProgram {
        program: ShaderProgram,
    },
    BindAttribute {
        program: ShaderProgram,
        name: String,
        buffer: BufferHandle,
        components: u32,
    },
    SetUniformMat4 {
        program: ShaderProgram,
        name: String,
        value: Mat4,
    },
    SetUniformVec3 {
        program: ShaderProgram,
        name: String,
        value: Vec3,
    },
    SetUniformF32 {
        program: ShaderProgram,
        name: String,
        value: f32,
    },
    SetUniformI32 {
        program: ShaderProgram,
        name: String,
        value: i32,
    },
    DrawTriangles {
        vertex_count: u32,
    },
    ReleaseState,
}

/// Headless [`GraphicsDevice`] that records every call.
///
/// Stands in for the GPU backend in tests and the CLI: compile always
/// succeeds, draws go nowhere, and the full call stream stays available
/// for inspection. The uniform-vector capacity is configurable so tests
/// can pick their light budget.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    capacity: u32,
    calls: Vec<DeviceCall>,
    programs: HashMap<u64, HashMap<String, u32>>,
    next_handle: u64,
}

/// A common WebGL-class capacity; yields a budget of 73 lights.
pub const DEFAULT_UNIFORM_VECTORS: u32 = 224;

impl RecordingDevice {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_UNIFORM_VECTORS)
    }

    /// Pretend the hardware reports `max_uniform_vectors` fragment
    /// uniform vectors.
    pub fn with_capacity(max_uniform_vectors: u32) -> Self {
        Self {
            capacity: max_uniform_vectors,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DeviceCall::DrawTriangles { .. }))
            .count()
    }

    /// Values recorded for a named i32 uniform, in call order.
    pub fn i32_uniform_values(&self, uniform: &str) -> Vec<i32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DeviceCall::SetUniformI32 { name, value, .. } if name == uniform => Some(*value),
                _ => None,
            })
            .collect()
    }

    fn next(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl GraphicsDevice for RecordingDevice {
    fn max_fragment_uniform_vectors(&self) -> u32 {
        self.capacity
    }

    fn create_shader_program(
        &mut self,
        vertex_source: &str,
        _fragment_source: &str,
    ) -> Result<ShaderProgram, RenderError> {
        let handle = self.next();
        self.programs
            .insert(handle, shader::attribute_locations(vertex_source));
        Ok(ShaderProgram(handle))
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.calls.push(DeviceCall::Clear { color });
    }

    fn upload_buffer(&mut self, data: &[f32]) -> BufferHandle {
        let buffer = BufferHandle(self.next());
        self.calls.push(DeviceCall::UploadBuffer {
            buffer,
            len: data.len(),
        });
        buffer
    }

    fn attribute_location(&self, program: ShaderProgram, name: &str) -> Option<u32> {
        self.programs.get(&program.0)?.get(name).copied()
    }

    fn bind_attribute(
        &mut self,
        program: ShaderProgram,
        name: &str,
        buffer: BufferHandle,
        components: u32,
    ) {
        self.calls.push(DeviceCall::BindAttribute {
            program,
            name: name.to_string(),
            buffer,
            components,
        });
    }

    fn use_program(&mut self, program: ShaderProgram) -> Result<(), RenderError> {
        if !self.programs.contains_key(&program.0) {
            return Err(RenderError::InvalidProgram(program));
        }
        self.calls.push(DeviceCall::UseProgram { program });
        Ok(())
    }

    fn set_uniform_mat4(&mut self, program: ShaderProgram, name: &str, value: &Mat4) {
        self.calls.push(DeviceCall::SetUniformMat4 {
            program,
            name: name.to_string(),
            value: *value,
        });
    }

    fn set_uniform_vec3(&mut self, program: ShaderProgram, name: &str, value: Vec3) {
        self.calls.push(DeviceCall::SetUniformVec3 {
            program,
            name: name.to_string(),
            value,
        });
    }

    fn set_uniform_f32(&mut self, program: ShaderProgram, name: &str, value: f32) {
        self.calls.push(DeviceCall::SetUniformF32 {
            program,
            name: name.to_string(),
            value,
        });
    }

    fn set_uniform_i32(&mut self, program: ShaderProgram, name: &str, value: i32) {
        self.calls.push(DeviceCall::SetUniformI32 {
            program,
            name: name.to_string(),
            value,
        });
    }

    fn draw_triangles(&mut self, vertex_count: u32) {
        self.calls.push(DeviceCall::DrawTriangles { vertex_count });
    }

    fn release_state(&mut self) {
        self.calls.push(DeviceCall::ReleaseState);
    }
}
