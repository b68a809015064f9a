use std::fs;
use std::process::{Command, Output};
use tempfile::tempdir;

fn smellscan(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_smellscan"))
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_clean_tree_exits_zero() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("ok.ts"), "export const ok = true;\n").unwrap();
    let out = smellscan(&["scan", dir.path().to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout, "summary: errors=0 warnings=0 infos=0 units=1\n");
}

#[test]
fn test_findings_at_threshold_exit_one() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("calc.ts"),
        "export function f(x: number) {\n  return x * 42;\n}\n",
    )
    .unwrap();
    let root = dir.path().to_str().unwrap();

    let out = smellscan(&["scan", root]);
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("calc.ts:2: [warning] magic-number - "));

    // Warnings do not fail an error-level gate.
    let out = smellscan(&["scan", root, "--fail-on", "error"]);
    assert_eq!(out.status.code(), Some(0));
}

#[test]
fn test_json_output_parses() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.js"), "module.exports = {};\n").unwrap();
    let out = smellscan(&["scan", dir.path().to_str().unwrap(), "--format", "json"]);
    assert_eq!(out.status.code(), Some(0));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["summary"]["units"], 1);
    assert_eq!(v["status"], "complete");
}

#[test]
fn test_run_level_errors_exit_two() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("absent");
    let out = smellscan(&["scan", missing.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("error:"));

    fs::write(dir.path().join("smellscan.toml"), "bogus = 1\n").unwrap();
    let out = smellscan(&["scan", dir.path().to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(2));

    fs::write(dir.path().join("smellscan.toml"), "[rules.no-such-rule]\nenabled = false\n")
        .unwrap();
    let out = smellscan(&["scan", dir.path().to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn test_rules_subcommand_lists_builtins() {
    let out = smellscan(&["rules"]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 10);
    assert!(stdout.contains("god-object-size"));
}
