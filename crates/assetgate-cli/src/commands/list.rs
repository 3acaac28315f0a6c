//! List command implementation
//!
//! Prints the asset inventory of a directory: path, type, and size.

use anyhow::{Context, Result};
use assetgate_lint::{inventory, InventoryEntry, INVENTORY_EXTENSIONS};
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

/// Run the list command, printing to stdout.
pub fn run(root: &str, json: bool) -> Result<ExitCode> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_to(&mut out, root, json)
}

/// Run the list command, writing the table (or JSON) to `out`.
pub fn run_to<W: Write>(out: &mut W, root: &str, json: bool) -> Result<ExitCode> {
    let entries = inventory(Path::new(root), INVENTORY_EXTENSIONS)
        .with_context(|| format!("Failed to list: {}", root))?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
    } else {
        write_table(out, &entries)?;
    }
    Ok(ExitCode::SUCCESS)
}

fn write_table<W: Write>(out: &mut W, entries: &[InventoryEntry]) -> std::io::Result<()> {
    let width = entries
        .iter()
        .map(|e| e.path.display().to_string().len())
        .max()
        .unwrap_or(0)
        .max("File".len());

    writeln!(out, "{:<width$}  {:<6}  {:>9}", "File", "Type", "Size (KB)", width = width)?;
    for entry in entries {
        writeln!(
            out,
            "{:<width$}  {:<6}  {:>9}",
            entry.path.display().to_string(),
            entry.extension,
            entry.size_kb,
            width = width
        )?;
    }
    Ok(())
}
