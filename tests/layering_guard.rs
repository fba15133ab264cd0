//! Layering guardrails for the workspace crates.
//!
//! `testmynb_core` is the vocabulary layer and stays dependency-free. `testmynb_syntax` builds on it but must never
//! reach up into the runner crate. These tests scan the member manifests and fail if either rule is broken.

/// Dependency names listed under `[dependencies]` in a manifest.
fn main_dependencies(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            if line == "[dependencies]" {
                in_dependencies = true;
                continue;
            }
            if in_dependencies {
                break;
            }
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Strip inline comments for robustness.
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if let Some((name, _)) = line_no_comment.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[test]
fn core_has_no_dependencies() {
    let manifest = include_str!("../crates/testmynb_core/Cargo.toml");
    let deps = main_dependencies(manifest);
    assert!(deps.is_empty(), "`testmynb_core` must stay dependency-free, found: {deps:?}");
}

#[test]
fn syntax_does_not_depend_on_the_runner() {
    let manifest = include_str!("../crates/testmynb_syntax/Cargo.toml");
    let deps = main_dependencies(manifest);
    assert!(deps.iter().any(|d| d == "testmynb_core"));
    assert!(
        !deps.iter().any(|d| d == "testmynb"),
        "`testmynb_syntax` must not depend on the `testmynb` runner crate"
    );
}
