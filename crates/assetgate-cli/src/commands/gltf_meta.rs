//! Legacy glTF metadata check: scenes and nodes of every `.gltf` file, no naming policy.

use anyhow::{Context, Result};
use assetgate_lint::{format_legacy_line, scan_gltf_metadata};
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

/// Run the gltf-meta command, printing to stdout.
pub fn run(root: &str) -> Result<ExitCode> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_to(&mut out, root)
}

/// Run the gltf-meta command, writing `[GLTF] path: message` lines to `out`.
pub fn run_to<W: Write>(out: &mut W, root: &str) -> Result<ExitCode> {
    let issues = scan_gltf_metadata(Path::new(root)).with_context(|| format!("Failed to scan: {}", root))?;
    for issue in &issues {
        writeln!(out, "{}", format_legacy_line(issue))?;
    }
    Ok(ExitCode::SUCCESS)
}
