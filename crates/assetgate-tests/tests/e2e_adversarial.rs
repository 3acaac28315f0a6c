//! Adversarial input tests for AssetGate.
//!
//! Feeds truncated and bit-flipped binaries through a full scan and verifies:
//! 1. The scan never panics and always returns `Ok`
//! 2. Every damaged file is reported as a parse error
//! 3. A damaged file never hides issues on its neighbours
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p assetgate-tests --test e2e_adversarial
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use assetgate_lint::{AssetPolicy, InspectorRegistry, Issue, IssueKind, ScanOptions, Scanner};
use assetgate_tests::fixtures::{self, AssetTree};
use pretty_assertions::assert_eq;

/// Every format with a binary encoding.
fn binary_policy() -> AssetPolicy {
    AssetPolicy::new([".glb", ".fbx", ".stl", ".obj"], "[a-z0-9_]+").expect("valid policy")
}

/// Scans `root` sequentially and in parallel, failing on any panic.
fn scan_without_panic(root: PathBuf) -> Vec<Issue> {
    let mut runs = Vec::new();
    for parallel in [false, true] {
        let scan_root = root.clone();
        let result = std::panic::catch_unwind(move || {
            Scanner::new(binary_policy(), InspectorRegistry::default_inspectors())
                .with_options(ScanOptions {
                    parallel,
                    ..ScanOptions::default()
                })
                .scan(&scan_root)
        });
        assert!(result.is_ok(), "Scan of {:?} caused a panic (parallel: {})", root, parallel);
        let issues = result
            .unwrap()
            .unwrap_or_else(|e| panic!("Scan of {:?} failed: {}", root, e));
        runs.push(issues);
    }
    assert_eq!(runs[0], runs[1], "parallel scan disagrees with sequential scan");
    runs.remove(0)
}

/// Issue kinds grouped by file name.
fn kinds_by_file(issues: &[Issue]) -> BTreeMap<String, Vec<IssueKind>> {
    let mut out: BTreeMap<String, Vec<IssueKind>> = BTreeMap::new();
    for issue in issues {
        let name = issue
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        out.entry(name).or_default().push(issue.kind.clone());
    }
    out
}

/// Asserts that each of `names` got exactly one parse error and nothing else.
fn assert_parse_errors(issues: &[Issue], names: &[String]) {
    let by_file = kinds_by_file(issues);
    for name in names {
        let kinds = by_file
            .get(name)
            .unwrap_or_else(|| panic!("{} was not reported; issues: {:?}", name, issues));
        assert_eq!(kinds.len(), 1, "{}: {:?}", name, kinds);
        assert!(
            matches!(kinds[0], IssueKind::ParseError { .. }),
            "{} should be a parse error, got {:?}",
            name,
            kinds[0]
        );
    }
    assert_eq!(by_file.len(), names.len(), "unexpected issues: {:?}", issues);
}

fn flip(bytes: &[u8], at: usize, mask: u8) -> Vec<u8> {
    let mut out = bytes.to_vec();
    out[at] ^= mask;
    out
}

// ============================================================================
// GLB
// ============================================================================

#[test]
fn test_zero_length_glb_next_to_misnamed_mesh() {
    let tree = AssetTree::new();
    let mut bad = b"glTF".to_vec();
    bad.extend_from_slice(&2u32.to_le_bytes());
    bad.extend_from_slice(&0u32.to_le_bytes());
    tree.add("bad.glb", bad);
    tree.add("Hero 02.obj", fixtures::obj_quad());

    let issues = scan_without_panic(tree.path().to_path_buf());
    assert_eq!(issues.len(), 2);
    assert_eq!(
        issues[0].kind,
        IssueKind::InvalidName {
            name: "Hero 02.obj".to_string()
        }
    );
    assert!(matches!(issues[1].kind, IssueKind::ParseError { .. }));
}

#[test]
fn test_truncated_glb() {
    let glb = fixtures::glb_with_scene();
    let tree = AssetTree::new();
    let mut names = Vec::new();
    for cut in 0..glb.len() {
        let name = format!("cut_{:03}.glb", cut);
        tree.add(&name, &glb[..cut]);
        names.push(name);
    }
    tree.add("whole.glb", &glb);

    let issues = scan_without_panic(tree.path().to_path_buf());
    assert_parse_errors(&issues, &names);
}

#[test]
fn test_bit_flipped_glb_headers() {
    let glb = fixtures::glb_with_scene();
    let tree = AssetTree::new();
    // Declared length, JSON chunk length, first JSON byte.
    let flips = [("flip_length.glb", 11, 0x80), ("flip_chunk.glb", 15, 0x80), ("flip_json.glb", 20, 0x01)];
    for (name, at, mask) in flips {
        tree.add(name, flip(&glb, at, mask));
    }

    let issues = scan_without_panic(tree.path().to_path_buf());
    let names: Vec<String> = flips.iter().map(|(name, _, _)| name.to_string()).collect();
    assert_parse_errors(&issues, &names);
}

#[test]
fn test_every_single_byte_flip_of_glb() {
    let glb = fixtures::glb_with_scene();
    let tree = AssetTree::new();
    for at in 0..glb.len() {
        tree.add(&format!("flip_{:03}.glb", at), flip(&glb, at, 0xff));
    }

    let issues = scan_without_panic(tree.path().to_path_buf());
    assert!(
        !issues.iter().any(|i| matches!(i.kind, IssueKind::InvalidName { .. })),
        "{:?}",
        issues
    );
}

// ============================================================================
// FBX
// ============================================================================

#[test]
fn test_truncated_binary_fbx() {
    let fbx = fixtures::fbx_binary_mesh("hero");
    // Cutting exactly before the trailing null record, or right after the
    // 27-byte header, leaves a well-formed file.
    let objects_end = fbx.len() - 13;
    let tree = AssetTree::new();
    let mut names = Vec::new();
    for cut in (0..objects_end)
        .step_by(7)
        .chain([objects_end - 1])
        .filter(|&cut| cut != 27)
    {
        let name = format!("cut_{:03}.fbx", cut);
        tree.add(&name, &fbx[..cut]);
        names.push(name);
    }
    names.dedup();

    let issues = scan_without_panic(tree.path().to_path_buf());
    assert_parse_errors(&issues, &names);
}

#[test]
fn test_bit_flipped_binary_fbx() {
    let fbx = fixtures::fbx_binary_mesh("hero");
    let tree = AssetTree::new();
    // High byte of the Objects end offset, then the magic itself.
    tree.add("flip_end.fbx", flip(&fbx, 30, 0x80));
    tree.add("flip_magic.fbx", flip(&fbx, 0, 0x80));

    let issues = scan_without_panic(tree.path().to_path_buf());
    assert_parse_errors(&issues, &["flip_end.fbx".to_string(), "flip_magic.fbx".to_string()]);
}

#[test]
fn test_wide_fbx_record_with_huge_property_length() {
    let mut fbx = b"Kaydara FBX Binary  \x00\x1a\x00".to_vec();
    fbx.extend_from_slice(&7500u32.to_le_bytes());
    let end = (fbx.len() + 25 + "Objects".len()) as u64;
    fbx.extend_from_slice(&end.to_le_bytes());
    fbx.extend_from_slice(&0u64.to_le_bytes());
    fbx.extend_from_slice(&u64::MAX.to_le_bytes());
    fbx.push("Objects".len() as u8);
    fbx.extend_from_slice(b"Objects");
    fbx.extend_from_slice(&[0u8; 25]);

    let tree = AssetTree::new();
    tree.add("wide.fbx", fbx);
    tree.add("fine.fbx", fixtures::fbx_binary_mesh("fine"));

    let issues = scan_without_panic(tree.path().to_path_buf());
    assert_parse_errors(&issues, &["wide.fbx".to_string()]);
}

#[test]
fn test_every_single_byte_flip_of_binary_fbx() {
    let fbx = fixtures::fbx_binary_mesh("hero");
    let tree = AssetTree::new();
    for at in 0..fbx.len() {
        tree.add(&format!("flip_{:03}.fbx", at), flip(&fbx, at, 0xff));
    }

    let issues = scan_without_panic(tree.path().to_path_buf());
    assert!(
        !issues.iter().any(|i| matches!(i.kind, IssueKind::InvalidName { .. })),
        "{:?}",
        issues
    );
}

// ============================================================================
// STL
// ============================================================================

#[test]
fn test_truncated_binary_stl() {
    let stl = fixtures::stl_binary_triangles(2);
    let tree = AssetTree::new();
    let mut names = Vec::new();
    for cut in (0..stl.len()).step_by(5).chain([stl.len() - 1]) {
        let name = format!("cut_{:03}.stl", cut);
        tree.add(&name, &stl[..cut]);
        names.push(name);
    }
    names.dedup();
    tree.add("whole.stl", &stl);

    let issues = scan_without_panic(tree.path().to_path_buf());
    assert_parse_errors(&issues, &names);
}

#[test]
fn test_binary_stl_with_wrong_facet_count() {
    let stl = fixtures::stl_binary_triangles(2);
    let tree = AssetTree::new();
    // Facet count 2 becomes 3.
    tree.add("flip_count.stl", flip(&stl, 80, 0x01));

    let issues = scan_without_panic(tree.path().to_path_buf());
    assert_parse_errors(&issues, &["flip_count.stl".to_string()]);
}
