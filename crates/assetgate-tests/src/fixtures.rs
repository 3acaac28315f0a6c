//! Test fixture utilities for creating synthetic asset trees.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch directory of asset files.
pub struct AssetTree {
    pub root: TempDir,
}

impl AssetTree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Get the tree root path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn add(&self, relative: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fixture dir");
        }
        fs::write(&path, contents).expect("Failed to write fixture file");
        path
    }

    /// Path of `relative` under the root, as a string.
    pub fn display(&self, relative: &str) -> String {
        self.root.path().join(relative).display().to_string()
    }
}

impl Default for AssetTree {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// glTF / GLB
// ============================================================================

/// glTF JSON with one scene containing one node.
pub fn gltf_with_scene() -> String {
    serde_json::json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": "root" }]
    })
    .to_string()
}

/// glTF JSON that parses but declares no scenes and no nodes.
pub fn gltf_empty() -> String {
    serde_json::json!({ "asset": { "version": "2.0" } }).to_string()
}

/// GLB container around [`gltf_with_scene`], JSON chunk only.
pub fn glb_with_scene() -> Vec<u8> {
    let mut json = gltf_with_scene().into_bytes();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let total_len = 12 + 8 + json.len();

    let mut glb = Vec::with_capacity(total_len);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_len as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes()); // "JSON"
    glb.extend_from_slice(&json);
    glb
}

// ============================================================================
// Mesh formats
// ============================================================================

/// OBJ with a single textured quad.
pub fn obj_quad() -> &'static str {
    "o quad\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\nf 1/1 2/2 3/3 4/4\n"
}

/// OBJ with vertices but no faces, so no meshes.
pub fn obj_points_only() -> &'static str {
    "v 0 0 0\nv 1 0 0\nv 0 1 0\n"
}

/// ASCII FBX 7.4 with one mesh geometry.
pub fn fbx_ascii_mesh(name: &str) -> String {
    format!(
        "; FBX 7.4.0 project file\n\
         FBXHeaderExtension:  {{\n    FBXHeaderVersion: 1003\n}}\n\
         Objects:  {{\n    Geometry: 1001, \"Geometry::{name}\", \"Mesh\" {{\n        \
         Vertices: *9 {{\n            a: 0,0,0,1,0,0,0,1,0\n        }}\n    }}\n}}\n"
    )
}

/// Binary FBX 7.4 with one mesh geometry and one triangle.
pub fn fbx_binary_mesh(name: &str) -> Vec<u8> {
    let mut out = b"Kaydara FBX Binary  \x00\x1a\x00".to_vec();
    out.extend_from_slice(&7400u32.to_le_bytes());

    let geometry_name = format!("{}\u{0}\u{1}Geometry", name);
    let vertices: Vec<u8> = [0.0f64, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    let indices: Vec<u8> = [0i32, 1, !2].iter().flat_map(|v| v.to_le_bytes()).collect();

    let vertices_node = fbx_node("Vertices", &[fbx_array(b'd', 9, &vertices)], &[]);
    let index_node = fbx_node("PolygonVertexIndex", &[fbx_array(b'i', 3, &indices)], &[]);
    let geometry = fbx_node(
        "Geometry",
        &[fbx_long(1001), fbx_string(&geometry_name), fbx_string("Mesh")],
        &[vertices_node, index_node],
    );
    let objects = fbx_node("Objects", &[], &[geometry]);

    append_node(&mut out, &objects);
    out.extend_from_slice(&[0u8; 13]);
    out
}

/// An unsized FBX node; offsets are fixed up when appended.
#[derive(Clone)]
struct FbxNode {
    name: String,
    properties: Vec<Vec<u8>>,
    children: Vec<FbxNode>,
}

fn fbx_node(name: &str, properties: &[Vec<u8>], children: &[FbxNode]) -> FbxNode {
    FbxNode {
        name: name.to_string(),
        properties: properties.to_vec(),
        children: children.to_vec(),
    }
}

fn fbx_long(value: i64) -> Vec<u8> {
    let mut p = vec![b'L'];
    p.extend_from_slice(&value.to_le_bytes());
    p
}

fn fbx_string(value: &str) -> Vec<u8> {
    let mut p = vec![b'S'];
    p.extend_from_slice(&(value.len() as u32).to_le_bytes());
    p.extend_from_slice(value.as_bytes());
    p
}

fn fbx_array(code: u8, count: u32, data: &[u8]) -> Vec<u8> {
    let mut p = vec![code];
    p.extend_from_slice(&count.to_le_bytes());
    p.extend_from_slice(&0u32.to_le_bytes());
    p.extend_from_slice(&(data.len() as u32).to_le_bytes());
    p.extend_from_slice(data);
    p
}

fn append_node(out: &mut Vec<u8>, node: &FbxNode) {
    let header_at = out.len();
    out.extend_from_slice(&[0u8; 12]);
    out.push(node.name.len() as u8);
    out.extend_from_slice(node.name.as_bytes());

    let props_start = out.len();
    for p in &node.properties {
        out.extend_from_slice(p);
    }
    let props_len = out.len() - props_start;

    for child in &node.children {
        append_node(out, child);
    }
    if !node.children.is_empty() {
        out.extend_from_slice(&[0u8; 13]);
    }

    let end = out.len() as u32;
    out[header_at..header_at + 4].copy_from_slice(&end.to_le_bytes());
    out[header_at + 4..header_at + 8].copy_from_slice(&(node.properties.len() as u32).to_le_bytes());
    out[header_at + 8..header_at + 12].copy_from_slice(&(props_len as u32).to_le_bytes());
}

/// ASCII STL with one facet.
pub fn stl_ascii_triangle() -> &'static str {
    "solid tri\n facet normal 0 0 1\n  outer loop\n   vertex 0 0 0\n   vertex 1 0 0\n   vertex 0 1 0\n  endloop\n endfacet\nendsolid tri\n"
}

/// Binary STL with `count` facets and a zeroed 80-byte header.
pub fn stl_binary_triangles(count: u32) -> Vec<u8> {
    let mut out = vec![0u8; 80];
    out.extend_from_slice(&count.to_le_bytes());
    for i in 0..count {
        let z = i as f32;
        for v in [0.0f32, 0.0, 1.0, 0.0, 0.0, z, 1.0, 0.0, z, 0.0, 1.0, z] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }
    out
}

/// Bytes no supported parser accepts.
pub fn corrupt_bytes() -> Vec<u8> {
    vec![0x00, 0xde, 0xad, 0xbe, 0xef, 0xff, 0x13, 0x37]
}
