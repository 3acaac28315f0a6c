//! Directory scanner: discovery, policy filtering, and inspector dispatch.

use crate::asset::AssetFile;
use crate::inspect::{InspectionResult, Inspector, InspectorRegistry, SceneInspector};
use crate::policy::AssetPolicy;
use crate::report::{Issue, IssueKind};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use walkdir::WalkDir;

/// Errors that end a scan without an issue list.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The root is missing, not a directory, or unreadable.
    #[error("cannot access directory {}: {source}", path.display())]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scan was aborted through its [`CancelFlag`].
    #[error("scan cancelled")]
    Cancelled,
}

/// Shared abort switch, checked between files.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Knobs for a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Inspect files on the rayon pool. Output order is unaffected.
    pub parallel: bool,
    /// Abort switch; a cancelled scan returns [`ScanError::Cancelled`].
    pub cancel: CancelFlag,
}

/// Counters for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Regular files found under the root.
    pub discovered: usize,
    /// Files with an allowed extension.
    pub in_scope: usize,
    /// Files handed to an inspector.
    pub inspected: usize,
    /// Files passing the name rule whose extension has no inspector.
    pub skipped_unclaimed: usize,
}

/// Issues plus counters.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub issues: Vec<Issue>,
    pub stats: ScanStats,
}

/// What happened to one in-scope file.
enum FileVerdict {
    Issues(Vec<Issue>),
    Unclaimed,
}

/// Policy-driven validator over a directory tree.
pub struct Scanner {
    policy: AssetPolicy,
    registry: InspectorRegistry,
    options: ScanOptions,
}

impl Scanner {
    pub fn new(policy: AssetPolicy, registry: InspectorRegistry) -> Self {
        Self {
            policy,
            registry,
            options: ScanOptions::default(),
        }
    }

    /// Default policy with the default inspectors.
    pub fn with_defaults() -> Self {
        Self::new(AssetPolicy::default(), InspectorRegistry::default_inspectors())
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn policy(&self) -> &AssetPolicy {
        &self.policy
    }

    pub fn registry(&self) -> &InspectorRegistry {
        &self.registry
    }

    /// Allowed extensions no inspector claims. Files with these are skipped.
    pub fn unclaimed_extensions(&self) -> Vec<String> {
        self.registry.unclaimed(&self.policy)
    }

    /// Scans `root` and returns issues in lexicographic path order.
    pub fn scan(&self, root: &Path) -> Result<Vec<Issue>, ScanError> {
        self.scan_with_stats(root).map(|outcome| outcome.issues)
    }

    /// Like [`Scanner::scan`], also returning counters.
    pub fn scan_with_stats(&self, root: &Path) -> Result<ScanOutcome, ScanError> {
        let files = discover(root, &self.options.cancel)?;

        let unclaimed = self.unclaimed_extensions();
        if !unclaimed.is_empty() {
            tracing::warn!(
                "allowed extensions without an inspector will be skipped: {}",
                unclaimed.join(", ")
            );
        }

        let mut stats = ScanStats {
            discovered: files.len(),
            ..ScanStats::default()
        };

        let candidates: Vec<AssetFile> = files
            .iter()
            .filter_map(|path| AssetFile::from_path(path))
            .filter(|asset| self.policy.is_allowed_extension(&asset.extension))
            .collect();
        stats.in_scope = candidates.len();

        // Both branches keep `candidates` order; rayon's indexed collect is order-preserving.
        let verdicts: Vec<Option<FileVerdict>> = if self.options.parallel {
            candidates.par_iter().map(|asset| self.check_file(asset)).collect()
        } else {
            candidates.iter().map(|asset| self.check_file(asset)).collect()
        };

        if self.options.cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let mut issues = Vec::new();
        for verdict in verdicts {
            match verdict {
                Some(FileVerdict::Issues(found)) => issues.extend(found),
                Some(FileVerdict::Unclaimed) => stats.skipped_unclaimed += 1,
                // Only produced when cancelled, handled above.
                None => {}
            }
        }
        stats.inspected = stats.in_scope - stats.skipped_unclaimed - name_failures(&issues);

        tracing::info!(
            root = %root.display(),
            discovered = stats.discovered,
            in_scope = stats.in_scope,
            issues = issues.len(),
            "scan complete"
        );

        Ok(ScanOutcome { issues, stats })
    }

    /// Name gate, then inspector dispatch. `None` means the scan was cancelled first.
    fn check_file(&self, asset: &AssetFile) -> Option<FileVerdict> {
        if self.options.cancel.is_cancelled() {
            return None;
        }

        if !self.policy.matches_name_rule(&asset.base_name) {
            tracing::debug!(path = %asset.path.display(), "name rule rejected");
            return Some(FileVerdict::Issues(vec![Issue::new(
                asset.path.clone(),
                IssueKind::InvalidName {
                    name: asset.file_name(),
                },
            )]));
        }

        let inspector = match self.registry.for_extension(&asset.extension) {
            Some(inspector) => inspector,
            None => {
                tracing::debug!(path = %asset.path.display(), "no inspector, skipped");
                return Some(FileVerdict::Unclaimed);
            }
        };

        Some(FileVerdict::Issues(inspect_file(inspector, &asset.path)))
    }
}

fn name_failures(issues: &[Issue]) -> usize {
    issues
        .iter()
        .filter(|issue| matches!(issue.kind, IssueKind::InvalidName { .. }))
        .count()
}

fn inspect_file(inspector: &dyn Inspector, path: &Path) -> Vec<Issue> {
    // A panicking backend is reported against its file like any other parse failure.
    let result = panic::catch_unwind(AssertUnwindSafe(|| inspector.inspect(path)))
        .unwrap_or_else(|payload| {
            tracing::warn!(path = %path.display(), inspector = inspector.id(), "inspector panicked");
            InspectionResult::ParseError(format!("inspector panicked: {}", panic_message(&*payload)))
        });
    tracing::debug!(path = %path.display(), inspector = inspector.id(), valid = result.is_valid(), "inspected");
    result
        .into_issue_kinds()
        .into_iter()
        .map(|kind| Issue::new(path.to_path_buf(), kind))
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Regular files under `root`, following symlinks, sorted by full path.
///
/// Only an inaccessible root is fatal; unreadable entries below it are logged and skipped.
pub(crate) fn discover(root: &Path, cancel: &CancelFlag) -> Result<Vec<PathBuf>, ScanError> {
    std::fs::read_dir(root).map_err(|source| ScanError::DirectoryAccess {
        path: root.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => tracing::warn!("skipping unreadable entry: {}", e),
        }
    }

    files.sort();
    Ok(files)
}

/// Legacy metadata-only scan: `.gltf` files, no name rule, scene checks only.
pub fn scan_gltf_metadata(root: &Path) -> Result<Vec<Issue>, ScanError> {
    let inspector = SceneInspector::new();
    let files = discover(root, &CancelFlag::new())?;

    Ok(files
        .iter()
        .filter_map(|path| AssetFile::from_path(path))
        .filter(|asset| asset.extension == ".gltf")
        .flat_map(|asset| inspect_file(&inspector, &asset.path))
        .collect())
}
