//! Byte layout of the packed uniform block the generated shaders declare.
//!
//! Offsets follow the WGSL uniform address space: three `mat4x4<f32>`
//! matrices, the light count padded out to 16 bytes, then an
//! `array<Light, N>` of 32-byte elements.

pub const MODEL_OFFSET: u64 = 0;
pub const VIEW_OFFSET: u64 = 64;
pub const PROJECTION_OFFSET: u64 = 128;
pub const LIGHT_COUNT_OFFSET: u64 = 192;
pub const LIGHTS_OFFSET: u64 = 208;
pub const LIGHT_STRIDE: u64 = 32;

/// Total block size for a program whose light array holds `light_capacity`
/// entries.
pub fn uniform_block_size(light_capacity: u32) -> u64 {
    LIGHTS_OFFSET + LIGHT_STRIDE * light_capacity as u64
}

/// Resolve a wire-contract uniform name to its byte offset in the block.
/// Unknown names and light indices at or past `light_capacity` resolve to
/// `None`; callers treat that as a no-op set.
pub fn uniform_offset(name: &str, light_capacity: u32) -> Option<u64> {
    match name {
        "u_model" => Some(MODEL_OFFSET),
        "u_view" => Some(VIEW_OFFSET),
        "u_projection" => Some(PROJECTION_OFFSET),
        "u_lightCount" => Some(LIGHT_COUNT_OFFSET),
        _ => light_offset(name, light_capacity),
    }
}

fn light_offset(name: &str, light_capacity: u32) -> Option<u64> {
    let rest = name.strip_prefix("u_lights[")?;
    let close = rest.find(']')?;
    let index: u32 = rest[..close].parse().ok()?;
    if index >= light_capacity {
        return None;
    }
    let field = rest[close + 1..].strip_prefix('.')?;
    let field_offset = match field {
        "color" => 0,
        "intensity" => 12,
        "direction" => 16,
        _ => return None,
    };
    Some(LIGHTS_OFFSET + LIGHT_STRIDE * index as u64 + field_offset)
}

/// Vertex format for an attribute with `components` floats per vertex.
pub fn vertex_format(components: u32) -> Option<wgpu::VertexFormat> {
    match components {
        1 => Some(wgpu::VertexFormat::Float32),
        2 => Some(wgpu::VertexFormat::Float32x2),
        3 => Some(wgpu::VertexFormat::Float32x3),
        4 => Some(wgpu::VertexFormat::Float32x4),
        _ => None,
    }
}
