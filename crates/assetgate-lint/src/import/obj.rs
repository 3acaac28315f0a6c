//! Wavefront OBJ import through `tobj`.
//!
//! Each `o`/`g` section with at least one face becomes a mesh. Material
//! libraries are not loaded; only geometry matters here.

use super::{ImportError, ImportFlags, ImportedMesh, ImportedScene};
use std::io::Cursor;

const FORMAT: &str = "OBJ";

pub(super) fn parse(bytes: &[u8], flags: ImportFlags) -> Result<ImportedScene, ImportError> {
    let options = tobj::LoadOptions {
        single_index: true,
        triangulate: flags.triangulate,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };

    let mut reader = Cursor::new(bytes);
    let (models, _materials) = tobj::load_obj_buf(&mut reader, &options, |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })
    .map_err(|e| ImportError::malformed(FORMAT, e.to_string()))?;

    let meshes = models
        .into_iter()
        .filter(|model| !model.mesh.indices.is_empty())
        .map(|model| to_mesh(model.name, model.mesh))
        .collect();
    Ok(ImportedScene { meshes })
}

fn to_mesh(name: String, mesh: tobj::Mesh) -> ImportedMesh {
    let positions: Vec<[f32; 3]> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();
    // With `single_index` the texcoords are parallel to the positions, or absent.
    let uvs: Vec<[f32; 2]> = mesh
        .texcoords
        .chunks_exact(2)
        .map(|t| [t[0], t[1]])
        .collect();

    let mut faces = Vec::new();
    if mesh.face_arities.is_empty() {
        faces.extend(mesh.indices.chunks_exact(3).map(<[u32]>::to_vec));
    } else {
        let mut rest = mesh.indices.as_slice();
        for &arity in &mesh.face_arities {
            let (face, tail) = rest.split_at((arity as usize).min(rest.len()));
            faces.push(face.to_vec());
            rest = tail;
        }
    }

    ImportedMesh {
        name,
        vertex_count: positions.len(),
        uvs: if uvs.len() == positions.len() { uvs } else { Vec::new() },
        positions,
        faces,
        tangents: Vec::new(),
    }
}
