//! Asset policy: which files are in scope and what names are acceptable.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions accepted by the default studio policy.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".fbx", ".obj", ".gltf", ".glb"];

/// Default naming rule: lowercase snake_case, digits allowed.
pub const DEFAULT_NAME_RULE: &str = "[a-z0-9]+(?:_[a-z0-9]+)*";

/// Errors raised while building or loading a policy.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The name rule is not a valid regular expression.
    #[error("invalid name rule '{rule}': {source}")]
    InvalidNameRule {
        rule: String,
        #[source]
        source: regex::Error,
    },

    /// An allowed extension was empty (or just ".").
    #[error("allowed extensions must not be empty strings")]
    EmptyExtension,

    /// The policy file could not be read.
    #[error("failed to read policy file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The policy file is not valid policy JSON.
    #[error("failed to parse policy file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk policy configuration. Missing fields fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Permitted file extensions, with or without the leading dot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_extensions: Option<Vec<String>>,
    /// Pattern the whole base name must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_rule: Option<String>,
}

/// Immutable rule set governing which files are scanned and how they must be named.
#[derive(Debug, Clone)]
pub struct AssetPolicy {
    allowed_extensions: BTreeSet<String>,
    name_rule: String,
    matcher: Regex,
}

impl AssetPolicy {
    /// Builds a policy from extensions and a name rule.
    ///
    /// Extensions are normalized to lowercase with a leading dot. The rule is
    /// anchored so it must match the entire base name.
    pub fn new<I, S>(allowed_extensions: I, name_rule: &str) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_extensions = allowed_extensions
            .into_iter()
            .map(|ext| normalize_extension(ext.as_ref().trim()).ok_or(PolicyError::EmptyExtension))
            .collect::<Result<BTreeSet<_>, _>>()?;

        let matcher = Regex::new(&format!("^(?:{})$", name_rule)).map_err(|source| {
            PolicyError::InvalidNameRule {
                rule: name_rule.to_string(),
                source,
            }
        })?;

        Ok(Self {
            allowed_extensions,
            name_rule: name_rule.to_string(),
            matcher,
        })
    }

    /// Builds a policy from a config, filling gaps with the defaults.
    pub fn from_config(config: &PolicyConfig) -> Result<Self, PolicyError> {
        let rule = config.name_rule.as_deref().unwrap_or(DEFAULT_NAME_RULE);
        match &config.allowed_extensions {
            Some(exts) => Self::new(exts, rule),
            None => Self::new(DEFAULT_EXTENSIONS, rule),
        }
    }

    /// Loads a policy from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path).map_err(|source| PolicyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: PolicyConfig =
            serde_json::from_str(&content).map_err(|source| PolicyError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_config(&config)
    }

    /// Case-insensitive membership test. Accepts the extension with or without its dot.
    pub fn is_allowed_extension(&self, ext: &str) -> bool {
        normalize_extension(ext)
            .map(|ext| self.allowed_extensions.contains(&ext))
            .unwrap_or(false)
    }

    /// Full-string match of the base name against the name rule.
    pub fn matches_name_rule(&self, base_name: &str) -> bool {
        self.matcher.is_match(base_name)
    }

    /// Normalized allowed extensions, sorted.
    pub fn allowed_extensions(&self) -> impl Iterator<Item = &str> {
        self.allowed_extensions.iter().map(String::as_str)
    }

    /// The name rule as written (unanchored).
    pub fn name_rule(&self) -> &str {
        &self.name_rule
    }

    /// Round-trips the policy back to its config form.
    pub fn to_config(&self) -> PolicyConfig {
        PolicyConfig {
            allowed_extensions: Some(self.allowed_extensions.iter().cloned().collect()),
            name_rule: Some(self.name_rule.clone()),
        }
    }
}

impl Default for AssetPolicy {
    fn default() -> Self {
        // Both inputs are compile-time constants covered by tests.
        Self::new(DEFAULT_EXTENSIONS, DEFAULT_NAME_RULE)
            .unwrap_or_else(|e| unreachable!("default policy is invalid: {}", e))
    }
}

/// Lowercases an extension and ensures a single leading dot.
///
/// Whitespace is kept: `foo. fbx` has the extension ". fbx", not ".fbx".
pub(crate) fn normalize_extension(ext: &str) -> Option<String> {
    let bare = ext.trim_start_matches('.');
    if bare.is_empty() {
        return None;
    }
    Some(format!(".{}", bare.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_builds() {
        let policy = AssetPolicy::default();
        let exts: Vec<_> = policy.allowed_extensions().collect();
        assert_eq!(exts, vec![".fbx", ".glb", ".gltf", ".obj"]);
        assert_eq!(policy.name_rule(), DEFAULT_NAME_RULE);
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let policy = AssetPolicy::default();
        assert!(policy.is_allowed_extension(".FBX"));
        assert!(policy.is_allowed_extension("gltf"));
        assert!(policy.is_allowed_extension(".Glb"));
        assert!(!policy.is_allowed_extension(".usd"));
        assert!(!policy.is_allowed_extension(""));
    }

    #[test]
    fn test_extensions_normalized_on_construction() {
        let policy = AssetPolicy::new(["FBX", ".Obj", "..abc"], "[a-z]+").unwrap();
        let exts: Vec<_> = policy.allowed_extensions().collect();
        assert_eq!(exts, vec![".abc", ".fbx", ".obj"]);
    }

    #[test]
    fn test_config_extensions_are_trimmed() {
        let policy = AssetPolicy::new([" FBX ", "\t.obj"], "[a-z]+").unwrap();
        assert_eq!(policy.allowed_extensions().collect::<Vec<_>>(), vec![".fbx", ".obj"]);
        assert!(matches!(
            AssetPolicy::new(["  "], "[a-z]+").unwrap_err(),
            PolicyError::EmptyExtension
        ));
    }

    #[test]
    fn test_padded_file_extension_not_allowed() {
        let policy = AssetPolicy::default();
        assert!(!policy.is_allowed_extension(". fbx"));
        assert!(!policy.is_allowed_extension(".fbx "));
    }

    #[test]
    fn test_empty_extension_rejected() {
        let err = AssetPolicy::new([".fbx", "."], "[a-z]+").unwrap_err();
        assert!(matches!(err, PolicyError::EmptyExtension));
    }

    #[test]
    fn test_name_rule_is_full_match() {
        let policy = AssetPolicy::default();
        assert!(policy.matches_name_rule("hero_01"));
        assert!(policy.matches_name_rule("bad"));
        assert!(!policy.matches_name_rule("Hero 02"));
        assert!(!policy.matches_name_rule("hero_01 "));
        assert!(!policy.matches_name_rule("_hero"));
        assert!(!policy.matches_name_rule(""));

        // A rule that would match as a substring search must not match partially.
        let policy = AssetPolicy::new([".obj"], "[a-z]+").unwrap();
        assert!(!policy.matches_name_rule("abc123"));
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let policy = AssetPolicy::new([".obj"], "foo|bar").unwrap();
        assert!(policy.matches_name_rule("foo"));
        assert!(policy.matches_name_rule("bar"));
        assert!(!policy.matches_name_rule("foox"));
        assert!(!policy.matches_name_rule("xbar"));
    }

    #[test]
    fn test_invalid_rule_rejected() {
        let err = AssetPolicy::new([".obj"], "([a-z]").unwrap_err();
        assert!(matches!(err, PolicyError::InvalidNameRule { .. }));
    }

    #[test]
    fn test_from_config_fills_defaults() {
        let config: PolicyConfig = serde_json::from_str(r#"{"name_rule": "[A-Z][a-z]+"}"#).unwrap();
        let policy = AssetPolicy::from_config(&config).unwrap();
        assert!(policy.matches_name_rule("Hero"));
        assert!(policy.is_allowed_extension(".glb"));
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        let result: Result<PolicyConfig, _> = serde_json::from_str(r#"{"name_rules": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        std::fs::write(
            &path,
            r#"{"allowed_extensions": ["usd", ".USDA"], "name_rule": "[a-z]+"}"#,
        )
        .unwrap();

        let policy = AssetPolicy::from_file(&path).unwrap();
        assert!(policy.is_allowed_extension(".usda"));
        assert!(!policy.is_allowed_extension(".fbx"));

        let missing = AssetPolicy::from_file(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, PolicyError::Read { .. }));
    }

    #[test]
    fn test_to_config_round_trip() {
        let policy = AssetPolicy::default();
        let rebuilt = AssetPolicy::from_config(&policy.to_config()).unwrap();
        assert_eq!(
            rebuilt.allowed_extensions().collect::<Vec<_>>(),
            policy.allowed_extensions().collect::<Vec<_>>()
        );
        assert_eq!(rebuilt.name_rule(), policy.name_rule());
    }
}
