//! CLI command implementations

pub mod gltf_meta;
pub mod list;
pub mod policy;
pub mod scan;

use anyhow::{Context, Result};
use assetgate_lint::AssetPolicy;
use std::path::Path;

/// Loads the policy file if one was given, otherwise the default policy.
pub fn load_policy(policy_path: Option<&str>) -> Result<AssetPolicy> {
    match policy_path {
        Some(path) => AssetPolicy::from_file(Path::new(path))
            .with_context(|| format!("Failed to load policy: {}", path)),
        None => Ok(AssetPolicy::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_policy() {
        let policy = load_policy(None).unwrap();
        assert!(policy.is_allowed_extension(".glb"));
    }

    #[test]
    fn test_load_missing_policy_has_context() {
        let err = load_policy(Some("/nonexistent/policy.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load policy"));
    }
}
