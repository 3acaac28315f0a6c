//! Generic mesh inspector backed by a [`MeshImporter`].

use super::{InspectionResult, Inspector, StructuralIssue};
use crate::import::{BuiltinImporter, ImportFlags, ImportedScene, MeshImporter};
use std::path::Path;

/// Imports a file (triangulated, with tangent space) and requires at least one mesh.
pub struct MeshInspector {
    importer: Box<dyn MeshImporter>,
    extensions: Vec<&'static str>,
}

impl MeshInspector {
    /// Inspector over a custom importer, claiming the importer's extensions.
    pub fn new(importer: Box<dyn MeshImporter>) -> Self {
        let extensions = importer.extensions().to_vec();
        Self {
            importer,
            extensions,
        }
    }

    /// Inspector over the built-in OBJ/FBX/STL importer.
    pub fn with_builtin_importer() -> Self {
        Self::new(Box::new(BuiltinImporter))
    }

    /// Inspector over the native assimp importer.
    #[cfg(feature = "assimp")]
    pub fn with_assimp_importer() -> Self {
        Self::new(Box::new(crate::import::AssimpImporter::new()))
    }

    pub const FLAGS: ImportFlags = ImportFlags {
        triangulate: true,
        calc_tangent_space: true,
    };
}

impl Inspector for MeshInspector {
    fn id(&self) -> &'static str {
        "mesh/import"
    }

    fn extensions(&self) -> &[&'static str] {
        &self.extensions
    }

    fn inspect(&self, path: &Path) -> InspectionResult {
        let scene = match self.importer.import(path, Self::FLAGS) {
            Ok(Some(scene)) => SceneGuard::new(self.importer.as_ref(), scene),
            Ok(None) => return InspectionResult::ParseError("importer returned no scene".to_string()),
            Err(e) => return InspectionResult::ParseError(e.to_string()),
        };

        if scene.meshes.is_empty() {
            InspectionResult::Structural(vec![StructuralIssue::NoMeshes])
        } else {
            InspectionResult::Valid
        }
    }
}

/// Holds an imported scene and hands it back to its importer when dropped.
pub(crate) struct SceneGuard<'a> {
    importer: &'a dyn MeshImporter,
    scene: Option<ImportedScene>,
}

impl<'a> SceneGuard<'a> {
    pub(crate) fn new(importer: &'a dyn MeshImporter, scene: ImportedScene) -> Self {
        Self {
            importer,
            scene: Some(scene),
        }
    }
}

impl std::ops::Deref for SceneGuard<'_> {
    type Target = ImportedScene;

    fn deref(&self) -> &ImportedScene {
        // Only taken in `drop`.
        self.scene.as_ref().unwrap_or_else(|| unreachable!("scene already released"))
    }
}

impl Drop for SceneGuard<'_> {
    fn drop(&mut self) {
        if let Some(scene) = self.scene.take() {
            self.importer.release(scene);
        }
    }
}
