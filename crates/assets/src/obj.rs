//! Line-oriented OBJ geometry extraction.
//!
//! Only `v ` (position) and `vn ` (normal) records are consumed; faces,
//! texture coordinates, groups and materials are ignored. An asset with
//! geometry but no normals is rejected, not defaulted.

use crate::{AssetError, MeshData};

pub fn extract(text: &str) -> Result<MeshData, AssetError> {
    let vertices = scan(text, "v ")?;
    let normals = scan(text, "vn ")?;

    if vertices.is_empty() {
        return Err(AssetError::MalformedAsset(
            "OBJ data contains no vertices".into(),
        ));
    }
    if normals.is_empty() {
        return Err(AssetError::MalformedAsset(
            "OBJ data contains no normals".into(),
        ));
    }

    MeshData::new(vertices, normals, Vec::new())
}

/// Collect the three numeric fields following `prefix` on every matching
/// line, in file order.
fn scan(text: &str, prefix: &str) -> Result<Vec<f32>, AssetError> {
    let mut out = Vec::new();
    for line in text.lines() {
        if !line.starts_with(prefix) {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(AssetError::MalformedAsset(format!(
                "truncated `{}` record: {line:?}",
                prefix.trim_end()
            )));
        }
        for field in &fields[1..=3] {
            let value: f32 = field.parse().map_err(|_| {
                AssetError::MalformedAsset(format!("non-numeric field {field:?} in {line:?}"))
            })?;
            out.push(value);
        }
    }
    Ok(out)
}
