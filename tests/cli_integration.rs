//! CLI integration tests for Dockyard.
//!
//! These tests run the binary against planning inputs written into a
//! temporary project directory.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const CONFIG: &str = r#"
[build]
jobs = 2
"#;

const MANIFEST: &str = r#"
[artifacts]
vs2022-toolchain = "14.34.31933"
win10sdk = "10.0.19041.0"
"#;

const CATALOG: &str = r#"
component = "tbb"

[[locator]]
platform = "linux"
arch = "x64"

[[locator.candidate]]
id = "clang-14"
version = "14.0"
layout = { family = "linux", sysroot = "/opt/sysroot", gcc_toolchain = "/opt/gcc", tools_path = "/opt/clang/bin" }

[[locator]]
platform = "windows"
arch = "x64"

[[locator.candidate]]
id = "vs-local"
version = "14.34.31933"
secondary = "10.0.19041.0"
layout = { family = "windows", bin_paths = ["C:/VS/bin"], include_paths = ["C:/VS/include"], library_paths = ["C:/VS/lib"] }
"#;

/// Get the dockyard binary command, isolated from the user's home directory.
fn dockyard() -> Command {
    dockyard_with_home(&Path::new(env!("CARGO_TARGET_TMPDIR")).join("empty-home"))
}

fn dockyard_with_home(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dockyard").unwrap();
    cmd.env_remove("DOCKYARD_CONFIG")
        .env_remove("DOCKYARD_MANIFEST")
        .env_remove("DOCKYARD_CATALOG")
        .env("HOME", home)
        .env("USERPROFILE", home);
    cmd
}

/// Create a project directory with all three planning inputs.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_inputs(tmp.path(), MANIFEST);
    tmp
}

fn write_inputs(dir: &Path, manifest: &str) {
    fs::write(dir.join("dockyard.toml"), CONFIG).unwrap();
    fs::write(dir.join("manifest.toml"), manifest).unwrap();
    fs::write(dir.join("catalog.toml"), CATALOG).unwrap();
}

// ============================================================================
// dockyard plan
// ============================================================================

#[test]
fn test_plan_linux_emits_graph() {
    let tmp = project();

    let output = dockyard()
        .args(["plan", "--host", "linux"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let graph: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let actions = graph["actions"].as_array().unwrap();
    // make, two installs, cmake, pack; for debug and release
    assert_eq!(actions.len(), 10);
    assert!(graph["aliases"]["buildzip::linux_intel64"][0]
        .as_str()
        .unwrap()
        .ends_with("tbb-linux_intel64.7z"));
    assert!(actions
        .iter()
        .any(|a| a["program"] == "make" && a["exclusive"] == true));
}

#[test]
fn test_plan_alias_selection() {
    let tmp = project();

    let output = dockyard()
        .args(["plan", "--host", "linux", "--alias", "lib::linux_intel64"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let graph: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let actions = graph["actions"].as_array().unwrap();
    assert_eq!(actions.len(), 3);
    assert!(actions.iter().all(|a| a["config_id"] == "linux_intel64"));
}

#[test]
fn test_plan_writes_output_file() {
    let tmp = project();
    let out = tmp.path().join("graph.json");

    dockyard()
        .args(["plan", "--host", "linux", "--output"])
        .arg(&out)
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let contents = fs::read_to_string(&out).unwrap();
    assert!(contents.contains("\"tbb_build_prefix=linux_intel64\""));
}

#[test]
fn test_plan_unknown_alias_fails() {
    let tmp = project();

    dockyard()
        .args(["plan", "--host", "linux", "--alias", "lib::nowhere"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown alias `lib::nowhere`"));
}

#[test]
fn test_plan_missing_manifest_entry_fails() {
    let tmp = TempDir::new().unwrap();
    write_inputs(tmp.path(), "[artifacts]\nwin10sdk = \"10.0.19041.0\"\n");

    dockyard()
        .args(["plan", "--host", "windows"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "artifact \"vs2022-toolchain\" doesn't appear to be described in any of the manifest files",
        ));
}

#[test]
fn test_plan_missing_catalog_fails() {
    let tmp = project();
    fs::remove_file(tmp.path().join("catalog.toml")).unwrap();

    dockyard()
        .args(["plan", "--host", "linux"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read catalog"));
}

#[test]
fn test_input_paths_from_flags() {
    let tmp = project();
    let elsewhere = TempDir::new().unwrap();

    dockyard()
        .args(["aliases", "--host", "linux", "--catalog"])
        .arg(tmp.path().join("catalog.toml"))
        .arg("--manifest")
        .arg(tmp.path().join("manifest.toml"))
        .arg("--config")
        .arg(tmp.path().join("dockyard.toml"))
        .current_dir(elsewhere.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("lib::linux_intel64"));
}

#[cfg(unix)]
#[test]
fn test_global_config_from_home() {
    let tmp = project();
    let home = TempDir::new().unwrap();
    fs::create_dir_all(home.path().join(".dockyard")).unwrap();
    fs::write(
        home.path().join(".dockyard/config.toml"),
        "[build]\njobs = 9\ndriver = \"gmake\"\n",
    )
    .unwrap();

    let output = dockyard_with_home(home.path())
        .args(["plan", "--host", "linux", "--alias", "lib::linux_intel64"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let graph: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let compile = &graph["actions"][0];
    assert_eq!(compile["program"], "gmake");
    // dockyard.toml sets jobs = 2 and wins over the global file
    assert!(compile["args"]
        .as_array()
        .unwrap()
        .iter()
        .any(|a| a == "2"));
    assert!(!compile["args"].as_array().unwrap().iter().any(|a| a == "9"));
}

// ============================================================================
// dockyard toolchain
// ============================================================================

#[test]
fn test_toolchain_report_windows() {
    let tmp = project();

    dockyard()
        .args(["toolchain", "--host", "windows"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Toolchains for host windows:"))
        .stdout(predicate::str::contains("vs-local 14.34.31933 (local)"))
        .stdout(predicate::str::contains("[missing]"))
        .stdout(predicate::str::contains(
            "no tbb/windows-arm64 toolchain with toolset version 14.34.31933 and SDK version 10.0.19041.0 could be found",
        ));
}

#[test]
fn test_unsupported_host_rejected() {
    let tmp = project();

    dockyard()
        .args(["toolchain", "--host", "solaris"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported platform `solaris`"));
}

// ============================================================================
// dockyard aliases
// ============================================================================

#[test]
fn test_aliases_linux() {
    let tmp = project();

    dockyard()
        .args(["aliases", "--host", "linux"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("buildzip::linux_intel64_dbg"))
        .stdout(predicate::str::contains("lib::linux_intel64\n"))
        .stdout(predicate::str::contains("builds/linux_intel64/bin").not());
}

// ============================================================================
// dockyard completions
// ============================================================================

#[test]
fn test_completions_bash() {
    dockyard()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dockyard"));
}
