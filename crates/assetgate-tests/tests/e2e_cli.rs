//! CLI Tests for AssetGate
//!
//! Exercises the command implementations through the library and the
//! `assetgate` binary through cargo.

use assetgate_cli::commands::scan::{self, ScanArgs};
use assetgate_lint::CancelFlag;
use assetgate_tests::fixtures::{self, AssetTree};
use assetgate_tests::TestHarness;
use pretty_assertions::assert_eq;
use std::process::ExitCode;

#[test]
fn test_scan_lines_match_contract() {
    let tree = AssetTree::new();
    tree.add("hero_01.fbx", fixtures::fbx_binary_mesh("hero_01"));
    tree.add("Hero 02.obj", fixtures::obj_quad());
    tree.add("bad.glb", fixtures::corrupt_bytes());

    let args = ScanArgs {
        root: tree.path().display().to_string(),
        ..ScanArgs::default()
    };
    let mut out = Vec::new();
    let code = scan::run_to(&mut out, &args, CancelFlag::new()).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        format!("[OBJ] {}: invalid name: 'Hero 02.obj'", tree.display("Hero 02.obj"))
    );
    assert!(lines[1].starts_with(&format!("[GLB] {}: parse error: ", tree.display("bad.glb"))));
}

#[test]
fn test_scan_with_policy_file() {
    let tree = AssetTree::new();
    tree.add("Hero.obj", fixtures::obj_quad());
    tree.add("hero.obj", fixtures::obj_quad());
    let policy = tree.add(
        "policy/studio.json",
        r#"{"allowed_extensions": ["obj"], "name_rule": "[A-Z][a-z]+"}"#,
    );

    let args = ScanArgs {
        root: tree.path().display().to_string(),
        policy: Some(policy.display().to_string()),
        ..ScanArgs::default()
    };
    let mut out = Vec::new();
    scan::run_to(&mut out, &args, CancelFlag::new()).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text.trim_end(),
        format!("[OBJ] {}: invalid name: 'hero.obj'", tree.display("hero.obj"))
    );
}

#[test]
fn test_binary_exit_codes() {
    let tree = AssetTree::new();
    tree.add("Bad Name.obj", fixtures::obj_quad());

    let result = TestHarness::run_cli(tree.path(), &["scan", "."]);
    result.assert_success();
    assert_eq!(result.stdout.trim_end(), "[OBJ] ./Bad Name.obj: invalid name: 'Bad Name.obj'");

    let missing = TestHarness::run_cli(tree.path(), &["scan", "no-such-dir"]);
    missing.assert_failure();
    assert_eq!(missing.exit_code, 1);
    assert!(missing.stdout.is_empty());
    assert!(missing.stderr.contains("no-such-dir"));
}
