//! End-to-end tests spawning the `deploykit` binary.

#![allow(deprecated)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn deploykit() -> Command {
    let mut cmd = Command::cargo_bin("deploykit").expect("deploykit binary should exist");
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn write_text(path: &Path, txt: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, txt).expect("write text");
}

fn write_manifest(root: &Path, txt: &str) {
    write_text(&root.join("deploy-copy.toml"), txt);
}

#[test]
fn no_args_shows_help() {
    deploykit()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn no_color_env_accepts_any_value() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_manifest(tmp.path(), "[[targets]]\nsrc = \"dist\"\ndest = \"out\"\n");

    for value in ["1", "", "true"] {
        deploykit()
            .env("NO_COLOR", value)
            .current_dir(tmp.path())
            .arg("check")
            .assert()
            .success()
            .stdout(predicate::str::contains("\u{1b}[").not());
    }
}

#[test]
fn no_color_flag_still_works() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_manifest(tmp.path(), "[[targets]]\nsrc = \"dist\"\ndest = \"out\"\n");

    deploykit()
        .env_remove("NO_COLOR")
        .current_dir(tmp.path())
        .args(["--no-color", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[0]"));
}

#[test]
fn run_deploys_with_default_manifest() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_text(&tmp.path().join("dist/index.html"), "<html>");
    write_text(&tmp.path().join("dist/assets/app.js"), "js");
    write_text(&tmp.path().join("deploy-result/.gitkeep"), "");
    write_text(&tmp.path().join("deploy-result/stale.html"), "old");
    write_manifest(
        tmp.path(),
        r#"
[[targets]]
src = "dist"
dest = "deploy-result"
preserve = [".gitkeep"]
"#,
    );

    deploykit()
        .current_dir(tmp.path())
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("[deploy-copy] Copying from"))
        .stdout(predicate::str::contains("[deploy-copy] Success:"));

    let dest = tmp.path().join("deploy-result");
    assert!(dest.join(".gitkeep").exists());
    assert!(!dest.join("stale.html").exists());
    assert_eq!(
        fs::read_to_string(dest.join("assets/app.js")).expect("read"),
        "js"
    );
}

#[test]
fn run_with_missing_source_warns_and_succeeds() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_manifest(
        tmp.path(),
        "[[targets]]\nsrc = \"missing\"\ndest = \"out\"\n",
    );

    deploykit()
        .arg("run")
        .arg("--cwd")
        .arg(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("does not exist. Skipping."));

    assert!(!tmp.path().join("out").exists());
}

#[test]
fn run_with_failing_target_still_exits_zero() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_text(&tmp.path().join("dist/a.txt"), "a");
    write_text(&tmp.path().join("blocked"), "a file, not a directory");
    write_manifest(
        tmp.path(),
        r#"
[[targets]]
src = "dist"
dest = "blocked"

[[targets]]
src = "dist"
dest = "ok"
"#,
    );

    deploykit()
        .current_dir(tmp.path())
        .args(["run", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Failed to copy to"));

    assert!(tmp.path().join("ok/a.txt").exists());
}

#[cfg(unix)]
#[test]
fn run_prints_warning_for_skipped_special_file() {
    use std::os::unix::net::UnixListener;

    let tmp = tempfile::tempdir().expect("tempdir");
    write_text(&tmp.path().join("dist/a.txt"), "a");
    let _listener = UnixListener::bind(tmp.path().join("dist/dev.sock")).expect("bind socket");
    write_manifest(tmp.path(), "[[targets]]\nsrc = \"dist\"\ndest = \"out\"\n");

    deploykit()
        .current_dir(tmp.path())
        .args(["run", "--quiet"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[deploy-copy] Warning ("))
        .stderr(predicate::str::contains("Special file skipped:"));

    assert!(tmp.path().join("out/a.txt").exists());
}

#[test]
fn run_dry_run_touches_nothing() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_text(&tmp.path().join("dist/a.txt"), "a");
    write_text(&tmp.path().join("out/old.txt"), "old");
    write_manifest(tmp.path(), "[[targets]]\nsrc = \"dist\"\ndest = \"out\"\n");

    deploykit()
        .current_dir(tmp.path())
        .args(["run", "--dry-run", "--workers", "1"])
        .assert()
        .success();

    assert!(tmp.path().join("out/old.txt").exists());
    assert!(!tmp.path().join("out/a.txt").exists());
}

#[test]
fn run_accepts_json_manifest() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_text(&tmp.path().join("dist/a.txt"), "a");
    write_text(
        &tmp.path().join("ci/deploy.json"),
        r#"{"targets": [{"src": "dist", "dest": "out"}]}"#,
    );

    deploykit()
        .current_dir(tmp.path())
        .args(["run", "--config", "ci/deploy.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("does not exist. Creating..."));

    assert!(tmp.path().join("out/a.txt").exists());
}

#[cfg(unix)]
#[test]
fn run_fires_hook_after_build_command() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_manifest(tmp.path(), "[[targets]]\nsrc = \"dist\"\ndest = \"out\"\n");

    deploykit()
        .current_dir(tmp.path())
        .args(["run", "--", "sh", "-c", "mkdir -p dist && echo built > dist/app.js"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(tmp.path().join("out/app.js")).expect("read"),
        "built\n"
    );
}

#[cfg(unix)]
#[test]
fn failed_build_skips_deploy_and_keeps_exit_code() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_text(&tmp.path().join("dist/a.txt"), "a");
    write_manifest(tmp.path(), "[[targets]]\nsrc = \"dist\"\ndest = \"out\"\n");

    deploykit()
        .current_dir(tmp.path())
        .args(["run", "--", "sh", "-c", "exit 3"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("deploy skipped"));

    assert!(!tmp.path().join("out").exists());
}

#[test]
fn invalid_manifest_is_an_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_manifest(
        tmp.path(),
        "[[targets]]\nsrc = \"dist\"\ndest = \"out\"\npreserve = [\"a/b\"]\n",
    );

    deploykit()
        .current_dir(tmp.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: cannot load manifest"))
        .stderr(predicate::str::contains("not a bare file or directory name"));
}

#[test]
fn check_lists_resolved_targets() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_manifest(
        tmp.path(),
        r#"
[[targets]]
src = "dist"
dest = "../published"
preserve = [".gitkeep", "CNAME"]
"#,
    );

    let path_parent = tmp.path().parent().expect("tempdir has a parent");
    deploykit()
        .current_dir(tmp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "[0] {} -> {}",
            tmp.path().join("dist").display(),
            path_parent.join("published").display()
        )))
        .stdout(predicate::str::contains("preserve: .gitkeep, CNAME"))
        .stdout(predicate::str::contains("source directory does not exist yet"));
}
