//! Integration tests for the installcheck binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_package(dir: &Path, json: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("package.json"), json).unwrap();
}

fn setup_project(root: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    write_package(temp.path(), root);
    temp
}

fn installcheck(dir: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("installcheck"));
    cmd.current_dir(dir);
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("installcheck"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("node_modules"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("installcheck"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_without_manifest_fails_preflight() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    installcheck(temp.path())
        .assert()
        .code(255)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "You must run this command in a project with a package.json file.",
        ));
    Ok(())
}

#[test]
fn cli_healthy_tree_succeeds() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(r#"{"name": "app", "dependencies": {"left-pad": "^1.0.0"}}"#);
    write_package(
        &temp.path().join("node_modules/left-pad"),
        r#"{"name": "left-pad", "version": "1.3.0"}"#,
    );

    installcheck(temp.path())
        .assert()
        .success()
        .stdout("Your node_modules look good.\n");
    Ok(())
}

#[test]
fn cli_reports_mismatch() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(r#"{"name": "app", "dependencies": {"left-pad": "^2.0.0"}}"#);
    write_package(
        &temp.path().join("node_modules/left-pad"),
        r#"{"name": "left-pad", "version": "1.3.0"}"#,
    );

    installcheck(temp.path())
        .assert()
        .code(255)
        .stdout(predicate::str::contains(
            "app asked for left-pad ^2.0.0 but got 1.3.0\n  - in dependencies at .\n",
        ))
        .stdout(predicate::str::ends_with("Your node_modules are messed up.\n"));
    Ok(())
}

#[test]
fn cli_reports_missing_peer_with_relative_path() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(r#"{"name": "app", "dependencies": {"lib": "^1.0.0"}}"#);
    write_package(
        &temp.path().join("node_modules/lib"),
        r#"{"name": "lib", "version": "1.0.0", "peerDependencies": {"react": "^18.0.0"}}"#,
    );

    installcheck(temp.path())
        .assert()
        .code(255)
        .stdout(predicate::str::contains("lib is missing react\n"))
        .stdout(predicate::str::contains(
            "  - in peerDependencies at node_modules/lib\n",
        ));
    Ok(())
}

#[test]
fn cli_optional_peer_is_not_reported() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(
        r#"{
            "name": "app",
            "peerDependencies": {"react": "^18.0.0"},
            "peerDependenciesMeta": {"react": {"optional": true}}
        }"#,
    );

    installcheck(temp.path()).assert().success();
    Ok(())
}

#[test]
fn cli_checks_root_dev_dependencies_only() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(
        r#"{"name": "app", "dependencies": {"a": "1"}, "devDependencies": {"jest": "^29"}}"#,
    );
    write_package(
        &temp.path().join("node_modules/a"),
        r#"{"name": "a", "version": "1.0.0", "devDependencies": {"mocha": "^10"}}"#,
    );

    installcheck(temp.path())
        .assert()
        .code(255)
        .stdout(predicate::str::contains("app is missing jest"))
        .stdout(predicate::str::contains("mocha").not());
    Ok(())
}

#[test]
fn cli_json_output() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(r#"{"name": "app", "dependencies": {"gone": "^1.0.0"}}"#);

    let output = installcheck(temp.path())
        .args(["--format", "json"])
        .output()?;
    assert_eq!(output.status.code(), Some(255));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["ok"], false);
    assert_eq!(json["visited"], 1);
    assert_eq!(json["diagnostics"][0]["kind"], "missing");
    assert_eq!(json["diagnostics"][0]["dependencyName"], "gone");
    assert_eq!(json["diagnostics"][0]["consumerPath"], ".");
    Ok(())
}

#[test]
fn cli_quiet_prints_nothing_when_healthy() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(r#"{"name": "app"}"#);
    installcheck(temp.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    Ok(())
}

#[test]
fn cli_project_flag_targets_other_directory() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let project = temp.path().join("project");
    write_package(&project, r#"{"name": "app", "dependencies": {"gone": "1"}}"#);

    installcheck(temp.path())
        .args(["--project", "project"])
        .assert()
        .code(255)
        .stdout(predicate::str::contains("in dependencies at project\n"));
    Ok(())
}

#[test]
fn cli_corrupt_manifest_aborts() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(r#"{"name": "app", "dependencies": {"bad": "1"}}"#);
    write_package(&temp.path().join("node_modules/bad"), "{ this is not json");

    installcheck(temp.path())
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Failed to parse manifest"))
        .stderr(predicate::str::contains("bad"));
    Ok(())
}

#[test]
fn cli_workspace_member_uses_root_peer_rules() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::write(
        temp.path().join("pnpm-workspace.yaml"),
        "packages:\n  - 'packages/*'\npeerDependencyRules:\n  ignoreMissing:\n    - react\n",
    )?;
    let member = temp.path().join("packages/ui");
    write_package(&member, r#"{"name": "ui", "peerDependencies": {"react": "^18"}}"#);

    installcheck(&member).assert().success();
    installcheck(&member)
        .arg("--no-workspace")
        .assert()
        .code(255)
        .stdout(predicate::str::contains("ui is missing react"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_follows_pnpm_symlink_layout() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::fs::symlink;

    let temp = setup_project(r#"{"name": "app", "dependencies": {"foo": "^1.0.0"}}"#);
    let store = temp.path().join("node_modules/.pnpm");
    write_package(
        &store.join("foo@1.0.0/node_modules/foo"),
        r#"{"name": "foo", "version": "1.0.0", "dependencies": {"bar": "^2.0.0"}}"#,
    );
    write_package(
        &store.join("bar@1.5.0/node_modules/bar"),
        r#"{"name": "bar", "version": "1.5.0"}"#,
    );
    symlink(
        store.join("bar@1.5.0/node_modules/bar"),
        store.join("foo@1.0.0/node_modules/bar"),
    )?;
    symlink(
        store.join("foo@1.0.0/node_modules/foo"),
        temp.path().join("node_modules/foo"),
    )?;

    installcheck(temp.path())
        .assert()
        .code(255)
        .stdout(predicate::str::contains(
            "foo asked for bar ^2.0.0 but got 1.5.0",
        ))
        .stdout(predicate::str::contains(
            "at node_modules/.pnpm/foo@1.0.0/node_modules/foo\n",
        ));
    Ok(())
}
