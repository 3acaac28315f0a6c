//! AssetGate CLI library.
//!
//! Command implementations behind the `assetgate` binary. Commands write
//! their rendered output to any `io::Write` so they can be driven from tests.

pub mod commands;
pub mod logging;
