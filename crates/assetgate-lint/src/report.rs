//! Issue types and line/JSON rendering.

use crate::asset::ext_tag;
use crate::inspect::StructuralIssue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Closed taxonomy of per-file problems.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// Base name fails the policy pattern. Carries the file name as found.
    InvalidName { name: String },
    /// The backend could not open or parse the file.
    ParseError { message: String },
    /// Parsed, but the content fails minimal structural requirements.
    Structural { issue: StructuralIssue },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::InvalidName { name } => write!(f, "invalid name: '{}'", name),
            IssueKind::ParseError { message } => write!(f, "parse error: {}", message),
            IssueKind::Structural { issue } => write!(f, "{}", issue),
        }
    }
}

/// A single problem found for one path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
    pub path: PathBuf,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl Issue {
    pub fn new(path: impl Into<PathBuf>, kind: IssueKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Human-readable description of the issue.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Uppercased extension tag of the issue's path, empty if there is none.
    pub fn ext_tag(&self) -> String {
        self.path
            .extension()
            .map(|ext| ext_tag(&ext.to_string_lossy()))
            .unwrap_or_default()
    }
}

/// Renders `[EXT] path: message`.
pub fn format_issue_line(issue: &Issue) -> String {
    format!("[{}] {}: {}", issue.ext_tag(), issue.path.display(), issue.message())
}

/// Renders the legacy metadata scanner's `[GLTF] path: message` form.
pub fn format_legacy_line(issue: &Issue) -> String {
    format!("[GLTF] {}: {}", issue.path.display(), issue.message())
}

/// One issue as it appears in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRecord {
    pub path: String,
    #[serde(flatten)]
    pub kind: IssueKind,
    pub message: String,
}

/// Machine-readable result of a completed scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Root directory that was scanned.
    pub root: String,
    /// Number of issues found.
    pub issue_count: usize,
    /// Issues in traversal order.
    pub issues: Vec<IssueRecord>,
}

impl ScanReport {
    pub fn new(root: &Path, issues: &[Issue]) -> Self {
        Self {
            root: root.display().to_string(),
            issue_count: issues.len(),
            issues: issues
                .iter()
                .map(|issue| IssueRecord {
                    path: issue.path.display().to_string(),
                    kind: issue.kind.clone(),
                    message: issue.message(),
                })
                .collect(),
        }
    }
}
