//! End-to-end CLI tests for the mediadl binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn mediadl() -> Command {
    let mut cmd = Command::cargo_bin("mediadl").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("MEDIADL_MEDIA_CONCURRENCY");
    cmd
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    mediadl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Download the media"))
        .stdout(predicate::str::contains("--concurrency"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    mediadl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mediadl"));
}

/// Test that the manifest argument is required.
#[test]
fn test_binary_without_manifest_fails() {
    mediadl()
        .assert()
        .failure()
        .stderr(predicate::str::contains("MANIFEST"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    mediadl()
        .args(["m.json", "--invalid-flag"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_zero_concurrency_rejected() {
    mediadl()
        .args(["m.json", "-c", "0"])
        .assert()
        .failure();
}

#[test]
fn test_binary_missing_manifest_file_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.json");

    mediadl()
        .arg(&missing)
        .arg("-d")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot load manifest"));
}

#[test]
fn test_binary_malformed_manifest_fails() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("posts.json");
    std::fs::write(&manifest, "{ not json").unwrap();

    mediadl()
        .arg(&manifest)
        .arg("-d")
        .arg(dir.path().join("out"))
        .assert()
        .failure();
}

/// An empty manifest is a successful no-op run.
#[test]
fn test_binary_empty_manifest_succeeds() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("posts.json");
    std::fs::write(&manifest, r#"{"posts":[]}"#).unwrap();
    let out = dir.path().join("out");

    mediadl()
        .arg(&manifest)
        .arg("-d")
        .arg(&out)
        .arg("-q")
        .assert()
        .success();
    assert!(out.is_dir(), "download directory is created up front");
}

/// Media without a MIME type is skipped, so nothing is fetched and the run succeeds.
#[test]
fn test_binary_media_without_mime_type_is_skipped() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("posts.json");
    std::fs::write(
        &manifest,
        r#"{"posts":[{"id":"p1","title":"t","media":[
            {"id":"m1","url":"http://127.0.0.1:9/m1","mime_type":""}
        ]}]}"#,
    )
    .unwrap();
    let out = dir.path().join("out");

    mediadl()
        .arg(&manifest)
        .arg("-d")
        .arg(&out)
        .arg("--no-progress")
        .assert()
        .success()
        .stderr(predicate::str::contains("no mime type"));
}

/// A download directory that is actually a file is rejected before any work.
#[test]
fn test_binary_download_dir_is_file_fails() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("posts.json");
    std::fs::write(&manifest, r#"{"posts":[]}"#).unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "x").unwrap();

    mediadl()
        .arg(&manifest)
        .arg("-d")
        .arg(&blocker)
        .assert()
        .failure();
}
