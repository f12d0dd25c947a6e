//! Geometry extraction from a parsed FBX node tree.
//!
//! The binary FBX parse happens upstream; this module walks the resulting
//! named-node hierarchy: `Objects` → each `Geometry` child contributes its
//! `Vertices` triplets, and separately its `LayerElementNormal` →
//! `Normals` triplets. Geometries missing either list are skipped with a
//! warning; an entirely empty result is a malformed asset.

use crate::{AssetError, MeshData};
use serde::{Deserialize, Serialize};

/// One node of a parsed FBX document: a name, positional numeric
/// properties, and child nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FbxNode {
    pub name: String,
    pub properties: Vec<f64>,
    pub children: Vec<FbxNode>,
}

impl FbxNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_properties(mut self, properties: Vec<f64>) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_children(mut self, children: Vec<FbxNode>) -> Self {
        self.children = children;
        self
    }

    fn child(&self, name: &str) -> Option<&FbxNode> {
        self.children.iter().find(|n| n.name == name)
    }
}

pub fn extract(nodes: &[FbxNode]) -> Result<MeshData, AssetError> {
    let objects = nodes
        .iter()
        .find(|n| n.name == "Objects")
        .ok_or_else(|| AssetError::MalformedAsset("FBX data: Objects node is missing".into()))?;

    let mut vertices = Vec::new();
    let mut normals = Vec::new();

    for geometry in objects.children.iter().filter(|n| n.name == "Geometry") {
        match geometry.child("Vertices") {
            Some(list) => vertices.extend(list.properties.iter().map(|&v| v as f32)),
            None => tracing::warn!("FBX geometry without Vertices, skipping"),
        }
        match geometry
            .child("LayerElementNormal")
            .and_then(|layer| layer.child("Normals"))
        {
            Some(list) => normals.extend(list.properties.iter().map(|&v| v as f32)),
            None => tracing::warn!("FBX geometry without Normals, skipping"),
        }
    }

    if vertices.is_empty() {
        return Err(AssetError::MalformedAsset(
            "FBX data: vertices are missing".into(),
        ));
    }
    if normals.is_empty() {
        return Err(AssetError::MalformedAsset(
            "FBX data: normals are missing".into(),
        ));
    }

    MeshData::new(vertices, normals, Vec::new())
}
