//! Discovered asset candidates.

use crate::policy::normalize_extension;
use std::path::{Path, PathBuf};

/// A file found during a scan, with its classification fields derived up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    /// Path as discovered (root-relative if the root was relative).
    pub path: PathBuf,
    /// Lowercase extension including the leading dot (e.g. ".glb").
    pub extension: String,
    /// File name without its last extension.
    pub base_name: String,
}

impl AssetFile {
    /// Classifies a path. Returns `None` for files without an extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy();
        let extension = normalize_extension(&ext)?;
        let base_name = path.file_stem()?.to_string_lossy().into_owned();

        Some(Self {
            path: path.to_path_buf(),
            extension,
            base_name,
        })
    }

    /// File name including the extension.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Uppercased extension without the dot, e.g. "GLB".
    pub fn ext_tag(&self) -> String {
        ext_tag(&self.extension)
    }
}

/// Uppercases an extension and strips its leading dot.
pub(crate) fn ext_tag(extension: &str) -> String {
    extension.trim_start_matches('.').to_uppercase()
}
