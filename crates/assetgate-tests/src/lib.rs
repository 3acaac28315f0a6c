//! AssetGate End-to-End Test Infrastructure
//!
//! Builds synthetic asset trees on disk and drives the scanner and CLI
//! against them.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p assetgate-tests
//! ```

pub mod fixtures;
pub mod harness;

pub use fixtures::AssetTree;
pub use harness::{CliResult, TestHarness};
