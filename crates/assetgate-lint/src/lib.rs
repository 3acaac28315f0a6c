//! Policy-driven validation engine for AssetGate.
//!
//! Walks an asset tree, filters files by the studio [`AssetPolicy`],
//! dispatches each surviving file to a per-format [`Inspector`], and
//! aggregates everything into a deterministic list of [`Issue`]s.
//!
//! # Example
//!
//! ```no_run
//! use assetgate_lint::{format_issue_line, Scanner};
//! use std::path::Path;
//!
//! let scanner = Scanner::with_defaults();
//! let issues = scanner.scan(Path::new("assets")).unwrap();
//!
//! for issue in &issues {
//!     println!("{}", format_issue_line(issue));
//! }
//! ```

pub mod asset;
pub mod import;
pub mod inspect;
pub mod inventory;
pub mod policy;
pub mod report;
pub mod scan;

pub use asset::AssetFile;
#[cfg(feature = "assimp")]
pub use import::AssimpImporter;
pub use import::{BuiltinImporter, ImportError, ImportFlags, ImportedMesh, ImportedScene, MeshImporter};
pub use inspect::{
    InspectionResult, Inspector, InspectorRegistry, MeshInspector, SceneInspector,
    StructuralIssue,
};
pub use inventory::{inventory, InventoryEntry, INVENTORY_EXTENSIONS};
pub use policy::{AssetPolicy, PolicyConfig, PolicyError, DEFAULT_EXTENSIONS, DEFAULT_NAME_RULE};
pub use report::{format_issue_line, format_legacy_line, Issue, IssueKind, ScanReport};
pub use scan::{scan_gltf_metadata, CancelFlag, ScanError, ScanOptions, ScanOutcome, ScanStats, Scanner};
