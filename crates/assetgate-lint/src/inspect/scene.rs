//! glTF / GLB scene inspector.

use super::{InspectionResult, Inspector, StructuralIssue};
use std::path::Path;

/// Checks glTF documents for at least one scene and at least one node.
///
/// Both checks always run, so an empty document yields "no scenes" then
/// "no nodes".
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneInspector;

impl SceneInspector {
    pub const EXTENSIONS: &'static [&'static str] = &[".gltf", ".glb"];

    pub fn new() -> Self {
        Self
    }

    /// Checks an already-parsed document.
    pub fn check_document(document: &gltf::Document) -> InspectionResult {
        let mut issues = Vec::new();
        if document.scenes().next().is_none() {
            issues.push(StructuralIssue::NoScenes);
        }
        if document.nodes().next().is_none() {
            issues.push(StructuralIssue::NoNodes);
        }
        InspectionResult::from_structural(issues)
    }

    /// Inspects in-memory glTF JSON or GLB bytes.
    pub fn inspect_slice(bytes: &[u8]) -> InspectionResult {
        if let Err(message) = check_glb_header(bytes) {
            return InspectionResult::ParseError(message);
        }
        match gltf::Gltf::from_slice(bytes) {
            Ok(gltf) => Self::check_document(&gltf.document),
            Err(e) => InspectionResult::ParseError(e.to_string()),
        }
    }
}

const GLB_MAGIC: &[u8] = b"glTF";
/// 12-byte file header plus the 8-byte header of the mandatory JSON chunk.
const GLB_MIN_LEN: usize = 20;

/// Bounds-checks the GLB header before the bytes reach the `gltf` reader.
///
/// JSON input passes through untouched.
fn check_glb_header(bytes: &[u8]) -> Result<(), String> {
    if !bytes.starts_with(GLB_MAGIC) {
        return Ok(());
    }
    if bytes.len() < GLB_MIN_LEN {
        return Err(format!("GLB is {} bytes, shorter than its headers", bytes.len()));
    }

    let declared = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    if declared < GLB_MIN_LEN || declared > bytes.len() {
        return Err(format!(
            "GLB header declares {} bytes, file has {}",
            declared,
            bytes.len()
        ));
    }

    let json_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;
    if json_len > declared - GLB_MIN_LEN {
        return Err(format!("GLB JSON chunk of {} bytes overruns the file", json_len));
    }
    Ok(())
}

impl Inspector for SceneInspector {
    fn id(&self) -> &'static str {
        "scene/gltf"
    }

    fn extensions(&self) -> &[&'static str] {
        Self::EXTENSIONS
    }

    fn inspect(&self, path: &Path) -> InspectionResult {
        // Only the document is loaded; external buffers and images are not read.
        match std::fs::read(path) {
            Ok(bytes) => Self::inspect_slice(&bytes),
            Err(e) => InspectionResult::ParseError(e.to_string()),
        }
    }
}
