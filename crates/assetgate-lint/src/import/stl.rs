//! STL import through `stl_io` (ASCII and binary). A file with at least one
//! facet is one mesh.

use super::{ImportError, ImportedMesh, ImportedScene};
use std::io::Cursor;

const FORMAT: &str = "STL";

pub(super) fn parse(bytes: &[u8]) -> Result<ImportedScene, ImportError> {
    let mesh = stl_io::read_stl(&mut Cursor::new(bytes))
        .map_err(|e| ImportError::malformed(FORMAT, e.to_string()))?;

    if mesh.faces.is_empty() {
        return Ok(ImportedScene::default());
    }

    let positions: Vec<[f32; 3]> = mesh.vertices.iter().map(|v| [v[0], v[1], v[2]]).collect();
    let mut faces = Vec::with_capacity(mesh.faces.len());
    for face in &mesh.faces {
        if face.vertices.iter().any(|&i| i >= positions.len()) {
            return Err(ImportError::malformed(FORMAT, "facet references a missing vertex"));
        }
        faces.push(face.vertices.iter().map(|&i| i as u32).collect());
    }

    Ok(ImportedScene {
        meshes: vec![ImportedMesh {
            name: "solid".to_string(),
            vertex_count: positions.len(),
            positions,
            faces,
            ..ImportedMesh::default()
        }],
    })
}
