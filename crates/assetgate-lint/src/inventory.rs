//! Asset inventory listing (file, type, size) for a source directory.

use crate::asset::AssetFile;
use crate::policy::normalize_extension;
use crate::scan::{discover, CancelFlag, ScanError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Extensions listed by default: source meshes plus converted scene files.
pub const INVENTORY_EXTENSIONS: &[&str] = &[".fbx", ".obj", ".gltf", ".glb", ".usd", ".usda", ".usdc"];

/// One row of the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub path: PathBuf,
    /// Lowercase extension with its dot.
    pub extension: String,
    /// Size in whole KiB, rounded down.
    pub size_kb: u64,
}

/// Lists files under `root` whose extension is in `extensions`, sorted by path.
///
/// Files whose metadata cannot be read are listed with size 0.
pub fn inventory<S: AsRef<str>>(root: &Path, extensions: &[S]) -> Result<Vec<InventoryEntry>, ScanError> {
    let wanted: BTreeSet<String> = extensions
        .iter()
        .filter_map(|ext| normalize_extension(ext.as_ref().trim()))
        .collect();

    let files = discover(root, &CancelFlag::new())?;
    Ok(files
        .into_iter()
        .filter_map(|path| AssetFile::from_path(&path))
        .filter(|asset| wanted.contains(&asset.extension))
        .map(|asset| {
            let size_kb = std::fs::metadata(&asset.path)
                .map(|m| m.len() / 1024)
                .unwrap_or(0);
            InventoryEntry {
                path: asset.path,
                extension: asset.extension,
                size_kb,
            }
        })
        .collect())
}
