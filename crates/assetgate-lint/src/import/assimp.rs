//! Open Asset Import Library backend (`russimp`).

use super::{ImportError, ImportFlags, ImportedMesh, ImportedScene, MeshImporter};
use russimp::scene::{PostProcess, Scene};
use std::path::Path;

/// Importer backed by the native assimp library.
///
/// The native scene is copied into an [`ImportedScene`] and freed inside
/// `import`, so `release` has nothing extra to do.
#[derive(Debug, Clone)]
pub struct AssimpImporter {
    extensions: Vec<&'static str>,
}

impl AssimpImporter {
    pub const DEFAULT_EXTENSIONS: &'static [&'static str] =
        &[".fbx", ".obj", ".stl", ".dae", ".3ds", ".ply", ".blend"];

    pub fn new() -> Self {
        Self::with_extensions(Self::DEFAULT_EXTENSIONS)
    }

    /// Importer claiming only `extensions`.
    pub fn with_extensions(extensions: &[&'static str]) -> Self {
        Self {
            extensions: extensions.to_vec(),
        }
    }
}

impl Default for AssimpImporter {
    fn default() -> Self {
        Self::new()
    }
}

fn post_process(flags: ImportFlags) -> Vec<PostProcess> {
    let mut steps = Vec::new();
    if flags.triangulate {
        steps.push(PostProcess::Triangulate);
    }
    if flags.calc_tangent_space {
        steps.push(PostProcess::CalcTangentSpace);
    }
    steps
}

impl MeshImporter for AssimpImporter {
    fn extensions(&self) -> &[&'static str] {
        &self.extensions
    }

    fn import(&self, path: &Path, flags: ImportFlags) -> Result<Option<ImportedScene>, ImportError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| ImportError::malformed("assimp", "path is not valid UTF-8"))?;
        let scene = Scene::from_file(path_str, post_process(flags))
            .map_err(|e| ImportError::malformed("assimp", e.to_string()))?;

        let meshes = scene
            .meshes
            .iter()
            .map(|mesh| {
                let positions: Vec<[f32; 3]> = mesh.vertices.iter().map(|v| [v.x, v.y, v.z]).collect();
                let uvs = mesh
                    .texture_coords
                    .first()
                    .and_then(|channel| channel.as_ref())
                    .map(|coords| coords.iter().map(|t| [t.x, t.y]).collect())
                    .unwrap_or_default();
                ImportedMesh {
                    name: mesh.name.clone(),
                    vertex_count: positions.len(),
                    positions,
                    uvs,
                    faces: mesh.faces.iter().map(|face| face.0.clone()).collect(),
                    tangents: mesh.tangents.iter().map(|t| [t.x, t.y, t.z]).collect(),
                }
            })
            .collect();

        Ok(Some(ImportedScene { meshes }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_process_steps_follow_flags() {
        assert!(post_process(ImportFlags::default()).is_empty());
        assert_eq!(post_process(ImportFlags::full()).len(), 2);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = AssimpImporter::new().import(Path::new("/nonexistent/asset.fbx"), ImportFlags::full());
        assert!(result.is_err());
    }
}
