//! Format inspectors and the extension registry that dispatches to them.
//!
//! Each inspector claims a set of extensions and answers one question for a
//! file: does it meet minimal structural validity? Two inspectors ship by
//! default:
//! - [`SceneInspector`]: glTF/GLB documents, checked for scenes and nodes
//! - [`MeshInspector`]: generic mesh formats imported through a [`MeshImporter`]
//!
//! [`MeshImporter`]: crate::import::MeshImporter

pub mod mesh;
pub mod scene;


use crate::policy::{normalize_extension, AssetPolicy};
use crate::report::IssueKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

pub use mesh::MeshInspector;
pub use scene::SceneInspector;

/// Parsed-but-degenerate content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralIssue {
    NoScenes,
    NoNodes,
    NoMeshes,
}

impl fmt::Display for StructuralIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StructuralIssue::NoScenes => "no scenes",
            StructuralIssue::NoNodes => "no nodes",
            StructuralIssue::NoMeshes => "no meshes",
        })
    }
}

/// Outcome of inspecting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectionResult {
    Valid,
    /// One or more structural problems, in the order they were checked.
    Structural(Vec<StructuralIssue>),
    ParseError(String),
}

impl InspectionResult {
    /// `Valid` if `issues` is empty, otherwise `Structural`.
    pub fn from_structural(issues: Vec<StructuralIssue>) -> Self {
        if issues.is_empty() {
            InspectionResult::Valid
        } else {
            InspectionResult::Structural(issues)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, InspectionResult::Valid)
    }

    /// Converts the result into zero or more issue kinds.
    pub fn into_issue_kinds(self) -> Vec<IssueKind> {
        match self {
            InspectionResult::Valid => Vec::new(),
            InspectionResult::Structural(issues) => issues
                .into_iter()
                .map(|issue| IssueKind::Structural { issue })
                .collect(),
            InspectionResult::ParseError(message) => vec![IssueKind::ParseError { message }],
        }
    }
}

/// A per-format strategy that opens and minimally validates one file.
///
/// Implementations must not panic on bad input; every failure is reported
/// through the returned [`InspectionResult`]. Any backend handle acquired
/// during `inspect` must be released before it returns.
pub trait Inspector: Send + Sync {
    /// Identifier used in logs and policy listings (e.g. "scene/gltf").
    fn id(&self) -> &'static str;

    /// Lowercase extensions, with leading dot, this inspector is responsible for.
    fn extensions(&self) -> &[&'static str];

    /// Inspects a single file.
    fn inspect(&self, path: &Path) -> InspectionResult;
}

/// Maps extensions to inspectors.
pub struct InspectorRegistry {
    inspectors: Vec<Box<dyn Inspector>>,
    by_extension: BTreeMap<String, usize>,
}

impl InspectorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            inspectors: Vec::new(),
            by_extension: BTreeMap::new(),
        }
    }

    /// Registry with the scene and mesh inspectors.
    ///
    /// The mesh inspector uses assimp when the `assimp` feature is enabled and
    /// the built-in importer otherwise. glTF always goes to the scene inspector.
    pub fn default_inspectors() -> Self {
        let mut registry = Self::new();
        #[cfg(feature = "assimp")]
        registry.register(Box::new(MeshInspector::with_assimp_importer()));
        #[cfg(not(feature = "assimp"))]
        registry.register(Box::new(MeshInspector::with_builtin_importer()));
        registry.register(Box::new(SceneInspector::new()));
        registry
    }

    /// Registers an inspector. Later registrations take over extensions
    /// already claimed by earlier ones.
    pub fn register(&mut self, inspector: Box<dyn Inspector>) {
        let index = self.inspectors.len();
        for ext in inspector.extensions() {
            if let Some(ext) = normalize_extension(ext) {
                self.by_extension.insert(ext, index);
            }
        }
        self.inspectors.push(inspector);
    }

    /// Inspector responsible for `ext` (case-insensitive, dot optional).
    pub fn for_extension(&self, ext: &str) -> Option<&dyn Inspector> {
        let ext = normalize_extension(ext)?;
        self.by_extension
            .get(&ext)
            .map(|&index| self.inspectors[index].as_ref())
    }

    /// Claimed extensions with the id of their inspector, sorted by extension.
    pub fn claimed_extensions(&self) -> Vec<(&str, &'static str)> {
        self.by_extension
            .iter()
            .map(|(ext, &index)| (ext.as_str(), self.inspectors[index].id()))
            .collect()
    }

    /// Extensions the policy allows that no inspector claims.
    pub fn unclaimed(&self, policy: &AssetPolicy) -> Vec<String> {
        policy
            .allowed_extensions()
            .filter(|ext| !self.by_extension.contains_key(*ext))
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inspectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inspectors.is_empty()
    }
}

impl Default for InspectorRegistry {
    fn default() -> Self {
        Self::default_inspectors()
    }
}
