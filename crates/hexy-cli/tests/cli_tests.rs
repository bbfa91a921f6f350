//! Black-box tests for the `hexy` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const LAYERED: &str = r#"
[[modules]]
name = "data"
exports = ["user-repository"]

[[modules.providers]]
token = "user-repository"

[[modules]]
name = "services"
imports = ["data"]
exports = ["user-service"]

[[modules.providers]]
token = "user-service"
depends_on = ["user-repository"]

[[modules]]
name = "controllers"
imports = ["services"]

[[modules.providers]]
token = "user-controller"
scope = "request"
depends_on = ["user-service"]
"#;

/// `controllers` reaches past `services` into `data`.
const LEAKY: &str = r#"
[[modules]]
name = "data"
exports = ["user-repository"]

[[modules.providers]]
token = "user-repository"

[[modules]]
name = "services"
imports = ["data"]

[[modules]]
name = "controllers"
imports = ["services"]

[[modules.providers]]
token = "user-controller"
depends_on = ["user-repository"]
"#;

const CYCLIC_IMPORTS: &str = r#"
[[modules]]
name = "a"
imports = ["b"]

[[modules]]
name = "b"
imports = ["a"]
"#;

const DUPLICATE_TOKEN: &str = r#"
[[modules]]
name = "first"

[[modules.providers]]
token = "clock"

[[modules]]
name = "second"

[[modules.providers]]
token = "clock"
scope = "transient"
"#;

/// A `hexy` command isolated from the user's config and environment.
fn hexy(dir: &Path) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("hexy");
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .env_remove("RUST_LOG")
        .env_remove("NO_COLOR");
    cmd
}

fn workspace(manifest: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hexy.toml");
    fs::write(&path, manifest).unwrap();
    (dir, path)
}

// ── basics ────────────────────────────────────────────────────────────────────

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    hexy(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("graph"));
}

#[test]
fn version_flag() {
    let dir = TempDir::new().unwrap();
    hexy(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    hexy(dir.path()).arg("frobnicate").assert().code(2);
}

#[test]
fn shell_completions() {
    let dir = TempDir::new().unwrap();
    hexy(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("complete"));
}

// ── check ─────────────────────────────────────────────────────────────────────

#[test]
fn check_accepts_layered_manifest() {
    let (dir, _) = workspace(LAYERED);
    hexy(dir.path())
        .args(["check", "hexy.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 module(s), 3 provider(s)"))
        .stdout(predicate::str::contains("data -> services -> controllers"));
}

#[test]
fn check_uses_default_manifest_path() {
    let (dir, _) = workspace(LAYERED);
    hexy(dir.path()).arg("check").assert().success();
}

#[test]
fn check_json_reports_load_order() {
    let (dir, _) = workspace(LAYERED);
    let output = hexy(dir.path())
        .args(["--output-format", "json", "check"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["providers"], 3);
    assert_eq!(
        report["load_order"],
        serde_json::json!(["data", "services", "controllers"])
    );
}

#[test]
fn check_rejects_unexported_dependency() {
    let (dir, _) = workspace(LEAKY);
    hexy(dir.path())
        .args(["check", "hexy.toml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("user-repository"))
        .stderr(predicate::str::contains("not visible"));
}

#[test]
fn check_rejects_import_cycle() {
    let (dir, _) = workspace(CYCLIC_IMPORTS);
    hexy(dir.path())
        .args(["check", "hexy.toml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("a -> b -> a"));
}

#[test]
fn check_missing_manifest_is_not_found() {
    let dir = TempDir::new().unwrap();
    hexy(dir.path())
        .args(["check", "absent.toml"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("absent.toml"));
}

#[test]
fn duplicate_tokens_need_allow_overwrite() {
    let (dir, _) = workspace(DUPLICATE_TOKEN);
    hexy(dir.path())
        .args(["check", "hexy.toml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Duplicate registration"));

    hexy(dir.path())
        .args(["check", "hexy.toml", "--allow-overwrite"])
        .assert()
        .success();
}

#[test]
fn quiet_check_prints_nothing() {
    let (dir, _) = workspace(LAYERED);
    hexy(dir.path())
        .args(["-q", "check"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ── graph ─────────────────────────────────────────────────────────────────────

#[test]
fn graph_csv_rows() {
    let (dir, _) = workspace(LAYERED);
    hexy(dir.path())
        .args(["graph", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("module,token,scope,depends_on"))
        .stdout(predicate::str::contains(
            "services,user-service,singleton,user-repository",
        ));
}

#[test]
fn graph_json_is_parseable() {
    let (dir, _) = workspace(LAYERED);
    let output = hexy(dir.path())
        .args(["graph", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let modules: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(modules[2]["name"], "controllers");
    assert_eq!(modules[2]["providers"][0]["scope"], "request");
}

// ── resolve ───────────────────────────────────────────────────────────────────

#[test]
fn resolve_shares_singletons() {
    let (dir, _) = workspace(LAYERED);
    hexy(dir.path())
        .args(["resolve", "user-service", "hexy.toml", "--times", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("user-repository"))
        .stdout(predicate::str::contains("2 distinct instance(s)"));
}

#[test]
fn resolve_request_scope_needs_context() {
    let (dir, _) = workspace(LAYERED);
    hexy(dir.path())
        .args(["resolve", "user-controller", "hexy.toml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("needs a resolution context"));

    hexy(dir.path())
        .args(["resolve", "user-controller", "hexy.toml", "--request", "--times", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 distinct instance(s)"));
}

#[test]
fn resolve_unknown_token_is_not_found() {
    let (dir, _) = workspace(LAYERED);
    hexy(dir.path())
        .args(["resolve", "ghost"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Service not found: ghost"));
}

#[test]
fn transient_default_scope_from_environment() {
    let (dir, _) = workspace(LAYERED);
    hexy(dir.path())
        .env("HEXY_CONTAINER__DEFAULT_SCOPE", "transient")
        .args(["resolve", "user-service", "hexy.toml", "--times", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 distinct instance(s)"));
}

// ── init / config ─────────────────────────────────────────────────────────────

#[test]
fn init_then_read_config() {
    let dir = TempDir::new().unwrap();
    let cfg = dir.path().join("cfg.toml");
    let cfg_arg = cfg.to_str().unwrap();

    hexy(dir.path())
        .args(["-c", cfg_arg, "init"])
        .assert()
        .success();
    assert!(cfg.exists());

    hexy(dir.path())
        .args(["-c", cfg_arg, "config", "get", "container.default_scope"])
        .assert()
        .success()
        .stdout(predicate::str::contains("container.default_scope = singleton"));

    hexy(dir.path())
        .args(["-c", cfg_arg, "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cfg.toml"));
}

#[test]
fn local_config_is_picked_up() {
    let (dir, _) = workspace(DUPLICATE_TOKEN);
    fs::write(
        dir.path().join(".hexy.toml"),
        "[container]\nallow_overwrite = true\n",
    )
    .unwrap();

    hexy(dir.path()).arg("check").assert().success();
}

#[test]
fn broken_config_exits_with_configuration_code() {
    let dir = TempDir::new().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, "[container\n").unwrap();

    hexy(dir.path())
        .args(["-c", cfg.to_str().unwrap(), "config", "list"])
        .assert()
        .code(4);
}

#[test]
fn unknown_config_key_fails() {
    let dir = TempDir::new().unwrap();
    hexy(dir.path())
        .args(["config", "get", "nope.nothing"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Unknown config key"));
}
