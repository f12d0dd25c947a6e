//! Light-budget derivation and WGSL shader-source generation.
//!
//! The fragment stage's light array is a compile-time bound: both the
//! array length and the loop limit are baked into the generated source
//! from the derived budget. Changing the hardware limit therefore means
//! compiling a new program.

use std::collections::HashMap;

/// Uniform vectors reserved for non-light state (matrices, light count).
pub const OTHER_UNIFORM_VECTORS: u32 = 5;
/// Uniform vectors consumed per light (color + intensity + direction).
pub const LIGHT_UNIFORM_VECTORS: u32 = 3;

/// Derive the light budget from the reported uniform-vector capacity.
/// Pure: `floor((capacity - OTHER_UNIFORM_VECTORS) / LIGHT_UNIFORM_VECTORS)`.
pub fn max_lights(max_uniform_vectors: u32) -> u32 {
    max_uniform_vectors.saturating_sub(OTHER_UNIFORM_VECTORS) / LIGHT_UNIFORM_VECTORS
}

/// Shared uniform-block declaration, identical in both stages so the
/// backend can bind one buffer for the whole program.
///
/// WGSL forbids zero-length arrays, so a zero budget still declares one
/// slot; the fragment loop bound stays at the true budget and never
/// reads it.
fn uniform_block(max_lights: u32) -> String {
    let max_lights = max_lights.max(1);
    format!(
        r#"struct Light {{
    color: vec3<f32>,
    intensity: f32,
    direction: vec3<f32>,
    _pad: f32,
}};

struct Globals {{
    u_model: mat4x4<f32>,
    u_view: mat4x4<f32>,
    u_projection: mat4x4<f32>,
    u_lightCount: u32,
    u_lights: array<Light, {max_lights}>,
}};

@group(0) @binding(0)
var<uniform> globals: Globals;
"#
    )
}

/// Default vertex stage: transforms positions into clip space and normals
/// into world space with the model matrix.
pub fn vertex_shader_source(max_lights: u32) -> String {
    format!(
        r#"{block}
struct VertexInput {{
    @location(0) a_position: vec3<f32>,
    @location(1) a_normal: vec3<f32>,
}};

struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) v_normal: vec3<f32>,
}};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {{
    var out: VertexOutput;
    out.clip_position = globals.u_projection * globals.u_view * globals.u_model
        * vec4<f32>(in.a_position, 1.0);
    out.v_normal = (globals.u_model * vec4<f32>(in.a_normal, 0.0)).xyz;
    return out;
}}
"#,
        block = uniform_block(max_lights)
    )
}

/// Default fragment stage: accumulates every registered light slot up to
/// `u_lightCount`, with the budget as the loop literal.
pub fn fragment_shader_source(max_lights: u32) -> String {
    format!(
        r#"{block}
struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) v_normal: vec3<f32>,
}};

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let normal = normalize(in.v_normal);
    let base_color = vec3<f32>(1.0, 0.0, 0.0);
    var final_color = vec3<f32>(0.0, 0.0, 0.0);

    for (var i = 0u; i < {max_lights}u; i = i + 1u) {{
        if (i >= globals.u_lightCount) {{
            break;
        }}
        let light = globals.u_lights[i];
        let light_intensity = max(dot(normal, light.direction), 0.2);
        final_color = final_color + light.color * light_intensity * light.intensity;
    }}

    return vec4<f32>(base_color * final_color, 1.0);
}}
"#,
        block = uniform_block(max_lights)
    )
}

/// Scan generated source for `@location(n) name:` vertex-attribute
/// declarations. Backends use this for name-to-location resolution.
pub fn attribute_locations(vertex_source: &str) -> HashMap<String, u32> {
    let mut locations = HashMap::new();
    let mut rest = vertex_source;
    while let Some(start) = rest.find("@location(") {
        rest = &rest[start + "@location(".len()..];
        let Some(close) = rest.find(')') else { break };
        let Ok(loc) = rest[..close].trim().parse::<u32>() else {
            continue;
        };
        let after = rest[close + 1..].trim_start();
        if let Some(colon) = after.find(':') {
            let name = after[..colon].trim();
            // Only attribute names from the wire contract; skip varyings.
            if name.starts_with("a_") {
                locations.insert(name.to_string(), loc);
            }
        }
    }
    locations
}

/// Recover the light-array bound from generated source. Backends size the
/// program's uniform block with it.
pub fn light_capacity(source: &str) -> Option<u32> {
    let start = source.find("array<Light,")?;
    let rest = &source[start + "array<Light,".len()..];
    let close = rest.find('>')?;
    rest[..close].trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_formula() {
        // floor((224 - 5) / 3)
        assert_eq!(max_lights(224), 73);
        assert_eq!(max_lights(16), 3);
        assert_eq!(max_lights(OTHER_UNIFORM_VECTORS), 0);
        assert_eq!(max_lights(0), 0);
    }

    #[test]
    fn budget_is_deterministic_in_capacity() {
        for u in 0..512 {
            assert_eq!(max_lights(u), max_lights(u));
            assert_eq!(max_lights(u), u.saturating_sub(5) / 3);
        }
    }

    #[test]
    fn fragment_source_bakes_budget_as_array_bound_and_loop_literal() {
        let src = fragment_shader_source(7);
        assert!(src.contains("array<Light, 7>"));
        assert!(src.contains("i < 7u"));
    }

    #[test]
    fn zero_budget_declares_one_unreachable_slot() {
        let src = fragment_shader_source(0);
        assert!(src.contains("array<Light, 1>"));
        assert!(src.contains("i < 0u"));
        assert_eq!(light_capacity(&vertex_shader_source(0)), Some(1));
    }

    #[test]
    fn stages_declare_identical_uniform_blocks() {
        let vs = vertex_shader_source(12);
        let fs = fragment_shader_source(12);
        assert_eq!(light_capacity(&vs), Some(12));
        assert_eq!(light_capacity(&fs), Some(12));
    }

    #[test]
    fn attribute_scan_finds_wire_contract_names() {
        let locations = attribute_locations(&vertex_shader_source(4));
        assert_eq!(locations.get("a_position"), Some(&0));
        assert_eq!(locations.get("a_normal"), Some(&1));
        assert_eq!(locations.get("a_color"), None);
        // Varyings are not attributes.
        assert_eq!(locations.get("v_normal"), None);
    }

    #[test]
    fn light_capacity_scan() {
        assert_eq!(light_capacity("u_lights: array<Light, 42>,"), Some(42));
        assert_eq!(light_capacity("no lights here"), None);
    }
}
