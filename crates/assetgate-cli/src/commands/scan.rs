//! Scan command implementation
//!
//! Validates an asset tree against the policy and prints one line per issue.

use anyhow::{Context, Result};
use assetgate_lint::{
    format_issue_line, CancelFlag, InspectorRegistry, ScanError, ScanOptions, ScanReport, Scanner,
};
use colored::Colorize;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

/// Exit code for a scan aborted with Ctrl-C.
pub const EXIT_CANCELLED: u8 = 130;

/// What a Ctrl-C should do to a running scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// First press: the scan stops at the next file boundary.
    Cancel,
    /// Repeated press: exit without waiting for the current file.
    Exit,
}

/// Raises `cancel` on the first interrupt; later interrupts ask for an immediate exit.
pub fn on_interrupt(cancel: &CancelFlag) -> Interrupt {
    if cancel.is_cancelled() {
        Interrupt::Exit
    } else {
        cancel.cancel();
        Interrupt::Cancel
    }
}

/// Arguments for the scan command.
#[derive(Debug, Clone, Default)]
pub struct ScanArgs {
    /// Root directory to scan.
    pub root: String,
    /// Optional JSON policy file.
    pub policy: Option<String>,
    /// Inspect files in parallel.
    pub parallel: bool,
    /// Emit a JSON report instead of issue lines.
    pub json: bool,
}

/// Run the scan command, printing to stdout.
///
/// # Returns
/// Exit code 0 for any completed scan, issues or not. An inaccessible root
/// is returned as an error.
pub fn run(args: &ScanArgs, cancel: CancelFlag) -> Result<ExitCode> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_to(&mut out, args, cancel)
}

/// Run the scan command, writing results to `out`.
pub fn run_to<W: Write>(out: &mut W, args: &ScanArgs, cancel: CancelFlag) -> Result<ExitCode> {
    let policy = super::load_policy(args.policy.as_deref())?;
    let scanner = Scanner::new(policy, InspectorRegistry::default_inspectors()).with_options(ScanOptions {
        parallel: args.parallel,
        cancel,
    });

    let unclaimed = scanner.unclaimed_extensions();
    if !unclaimed.is_empty() && !args.json {
        eprintln!(
            "{}: no inspector for {}; these files are only name-checked",
            "warning".yellow().bold(),
            unclaimed.join(", ")
        );
    }

    let root = Path::new(&args.root);
    let outcome = match scanner.scan_with_stats(root) {
        Ok(outcome) => outcome,
        Err(ScanError::Cancelled) => {
            eprintln!("{}: scan cancelled", "warning".yellow().bold());
            return Ok(ExitCode::from(EXIT_CANCELLED));
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to scan: {}", args.root)),
    };

    if args.json {
        let report = ScanReport::new(root, &outcome.issues);
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        for issue in &outcome.issues {
            writeln!(out, "{}", format_issue_line(issue))?;
        }
        let summary = format!(
            "{} issue(s), {} of {} file(s) in scope",
            outcome.issues.len(),
            outcome.stats.in_scope,
            outcome.stats.discovered
        );
        if outcome.issues.is_empty() {
            eprintln!("{} {}", "CLEAN".green().bold(), summary.dimmed());
        } else {
            eprintln!("{} {}", "ISSUES".yellow().bold(), summary.dimmed());
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn scan_text(root: &Path) -> (ExitCode, String) {
        let args = ScanArgs {
            root: root.display().to_string(),
            ..ScanArgs::default()
        };
        let mut out = Vec::new();
        let code = run_to(&mut out, &args, CancelFlag::new()).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_issue_lines() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Hero 02.obj"), "v 0 0 0\n").unwrap();
        fs::write(dir.path().join("empty.gltf"), r#"{"asset":{"version":"2.0"}}"#).unwrap();

        let (code, text) = scan_text(dir.path());
        assert_eq!(code, ExitCode::SUCCESS);

        let root = dir.path().display();
        assert_eq!(
            text,
            format!(
                "[OBJ] {root}/Hero 02.obj: invalid name: 'Hero 02.obj'\n\
                 [GLTF] {root}/empty.gltf: no scenes\n\
                 [GLTF] {root}/empty.gltf: no nodes\n"
            )
        );
    }

    #[test]
    fn test_clean_scan_prints_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (code, text) = scan_text(dir.path());
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(text.is_empty());
    }

    #[test]
    fn test_json_report() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.glb"), "not a glb").unwrap();

        let args = ScanArgs {
            root: dir.path().display().to_string(),
            json: true,
            ..ScanArgs::default()
        };
        let mut out = Vec::new();
        run_to(&mut out, &args, CancelFlag::new()).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["issue_count"], 1);
        assert_eq!(json["issues"][0]["kind"], "parse_error");
    }

    #[test]
    fn test_missing_root_is_error() {
        let args = ScanArgs {
            root: "/nonexistent/assetgate-root".to_string(),
            ..ScanArgs::default()
        };
        let mut out = Vec::new();
        let err = run_to(&mut out, &args, CancelFlag::new()).unwrap_err();
        assert!(err.downcast_ref::<ScanError>().is_some());
        assert!(out.is_empty());
    }

    #[test]
    fn test_second_interrupt_exits() {
        let cancel = CancelFlag::new();
        assert_eq!(on_interrupt(&cancel), Interrupt::Cancel);
        assert!(cancel.is_cancelled());
        assert_eq!(on_interrupt(&cancel), Interrupt::Exit);
        assert_eq!(on_interrupt(&cancel.clone()), Interrupt::Exit);
    }

    #[test]
    fn test_cancelled_scan_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Bad.obj"), "").unwrap();

        let cancel = CancelFlag::new();
        cancel.cancel();
        let args = ScanArgs {
            root: dir.path().display().to_string(),
            ..ScanArgs::default()
        };
        let mut out = Vec::new();
        let code = run_to(&mut out, &args, cancel).unwrap();
        assert_eq!(code, ExitCode::from(EXIT_CANCELLED));
        assert!(out.is_empty());
    }
}
