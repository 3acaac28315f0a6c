//! Generic mesh import backend.
//!
//! The mesh inspector does not parse formats itself; it asks a
//! [`MeshImporter`] for an [`ImportedScene`] and only looks at the result.
//! [`BuiltinImporter`] handles OBJ (via `tobj`), STL (via `stl_io`), and FBX
//! (binary and ASCII). With the `assimp` feature, `AssimpImporter` hands
//! files to the native Open Asset Import Library instead.

#[cfg(feature = "assimp")]
mod assimp;
mod fbx;
mod obj;
mod process;
mod stl;

use std::path::Path;
use thiserror::Error;

#[cfg(feature = "assimp")]
pub use assimp::AssimpImporter;
pub use process::{compute_tangents, triangulate};

/// Post-processing requested from the importer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportFlags {
    /// Split polygons with more than three corners into triangles.
    pub triangulate: bool,
    /// Compute per-corner tangents from UVs (requires triangles).
    pub calc_tangent_space: bool,
}

impl ImportFlags {
    /// Triangulate and compute tangent space.
    pub fn full() -> Self {
        Self {
            triangulate: true,
            calc_tangent_space: true,
        }
    }
}

/// Errors raised by an importer.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The file could not be read.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// No importer handles this extension.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The content does not follow the format.
    #[error("malformed {format} data: {message}")]
    Malformed {
        format: &'static str,
        message: String,
    },
}

impl ImportError {
    pub(crate) fn malformed(format: &'static str, message: impl Into<String>) -> Self {
        ImportError::Malformed {
            format,
            message: message.into(),
        }
    }
}

/// One mesh in an imported scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedMesh {
    pub name: String,
    /// Vertex positions. May be empty when the format only reports a count.
    pub positions: Vec<[f32; 3]>,
    /// Texture coordinates, parallel to `positions` when present.
    pub uvs: Vec<[f32; 2]>,
    /// Declared vertex count, at least `positions.len()`.
    pub vertex_count: usize,
    /// Polygons as indices into `positions`.
    pub faces: Vec<Vec<u32>>,
    /// Per-vertex tangents, filled when tangent space was requested and UVs exist.
    pub tangents: Vec<[f32; 3]>,
}

impl ImportedMesh {
    pub fn triangle_count(&self) -> usize {
        self.faces
            .iter()
            .map(|face| face.len().saturating_sub(2))
            .sum()
    }
}

/// Result of a successful import.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedScene {
    pub meshes: Vec<ImportedMesh>,
}

impl ImportedScene {
    fn apply(&mut self, flags: ImportFlags) {
        for mesh in &mut self.meshes {
            if flags.triangulate {
                triangulate(mesh);
            }
            if flags.calc_tangent_space {
                compute_tangents(mesh);
            }
        }
    }
}

/// Loads mesh files into an [`ImportedScene`].
///
/// `import` returns `Ok(None)` when the backend ran but produced no scene.
/// Every scene handed out must come back through `release`.
pub trait MeshImporter: Send + Sync {
    /// Extensions this importer can read.
    fn extensions(&self) -> &[&'static str];

    fn import(&self, path: &Path, flags: ImportFlags) -> Result<Option<ImportedScene>, ImportError>;

    /// Releases a scene obtained from `import`.
    fn release(&self, scene: ImportedScene) {
        drop(scene);
    }
}

/// Importer for OBJ, FBX and STL files.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinImporter;

impl BuiltinImporter {
    pub const EXTENSIONS: &'static [&'static str] = &[".fbx", ".obj", ".stl"];

    /// Imports in-memory data, choosing the parser from `extension`.
    pub fn import_bytes(
        &self,
        extension: &str,
        bytes: &[u8],
        flags: ImportFlags,
    ) -> Result<Option<ImportedScene>, ImportError> {
        let mut scene = match extension.trim_start_matches('.').to_lowercase().as_str() {
            "obj" => obj::parse(bytes, flags)?,
            "fbx" => fbx::parse(bytes)?,
            "stl" => stl::parse(bytes)?,
            other => return Err(ImportError::UnsupportedFormat(other.to_string())),
        };
        scene.apply(flags);
        Ok(Some(scene))
    }
}

impl MeshImporter for BuiltinImporter {
    fn extensions(&self) -> &[&'static str] {
        Self::EXTENSIONS
    }

    fn import(&self, path: &Path, flags: ImportFlags) -> Result<Option<ImportedScene>, ImportError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = std::fs::read(path)?;
        self.import_bytes(&extension, &bytes, flags)
    }
}
