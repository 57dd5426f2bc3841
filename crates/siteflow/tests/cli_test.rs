#![allow(deprecated)] // TODO: migrate cargo_bin to cargo_bin_cmd!

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("site").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Declare it once"))
        .stdout(predicate::str::contains("up"))
        .stdout(predicate::str::contains("preview"))
        .stdout(predicate::str::contains("destroy"))
        .stdout(predicate::str::contains("outputs"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("site").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("siteflow"));
}

#[test]
fn test_up_help() {
    let mut cmd = Command::cargo_bin("site").unwrap();
    cmd.arg("up")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[STAGE]"));
}

#[test]
fn test_destroy_help() {
    let mut cmd = Command::cargo_bin("site").unwrap();
    cmd.arg("destroy")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[STAGE]"))
        .stdout(predicate::str::contains("--yes"));
}

#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("site").unwrap();
    cmd.arg("invalid-command").assert().failure();
}

/// Commands outside a project directory fail with a missing-site-file
/// message rather than a parse error.
#[test]
fn test_validate_without_project() {
    let temp = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("site").unwrap();
    cmd.current_dir(temp.path())
        .env_remove("SITE_CONFIG_PATH")
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No site file found"));
}

#[test]
fn test_validate_resolves_defaults() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(temp.path().join("site.kdl"), "site \"my-site\"\n").unwrap();

    let mut cmd = Command::cargo_bin("site").unwrap();
    cmd.current_dir(temp.path())
        .env_remove("SITE_CONFIG_PATH")
        .env_remove("SITE_STAGE")
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("my-site"))
        .stdout(predicate::str::contains("./www"))
        .stdout(predicate::str::contains("index.html"))
        .stdout(predicate::str::contains("error.html"))
        .stdout(predicate::str::contains("my-site-dev"));
}

#[test]
fn test_validate_positional_stage() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(
        temp.path().join("site.kdl"),
        r#"
site "my-site" {
    region "ap-northeast-1"
    stage "prod" {
        path "./public"
        error-document "404.html"
    }
}
"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("site").unwrap();
    cmd.current_dir(temp.path())
        .env_remove("SITE_CONFIG_PATH")
        .env_remove("SITE_STAGE")
        .arg("validate")
        .arg("prod")
        .assert()
        .success()
        .stdout(predicate::str::contains("ap-northeast-1"))
        .stdout(predicate::str::contains("./public"))
        .stdout(predicate::str::contains("404.html"))
        .stdout(predicate::str::contains("my-site-prod"));
}

/// The declared resources come out in dependency order: the sync only
/// after both access-policy resources, the distribution after the
/// website configuration.
#[test]
fn test_validate_lists_resources_in_order() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(temp.path().join("site.kdl"), "site \"my-site\"\n").unwrap();

    let mut cmd = Command::cargo_bin("site").unwrap();
    let assert = cmd
        .current_dir(temp.path())
        .env_remove("SITE_CONFIG_PATH")
        .env_remove("SITE_STAGE")
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Declared resources (6)"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let pos = |needle: &str| stdout.find(needle).unwrap();
    assert!(pos("bucket:my-site-dev") < pos("bucket-sync:my-site-dev"));
    assert!(pos("bucket-ownership:my-site-dev") < pos("bucket-sync:my-site-dev"));
    assert!(pos("bucket-access:my-site-dev") < pos("bucket-sync:my-site-dev"));
    assert!(pos("bucket-website:my-site-dev") < pos("distribution:my-site-dev"));
}

/// The hidden -s flag still parses (SITE_STAGE compatibility path).
#[test]
fn test_validate_stage_flag() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(temp.path().join("site.kdl"), "site \"my-site\"\n").unwrap();

    let mut cmd = Command::cargo_bin("site").unwrap();
    cmd.current_dir(temp.path())
        .env_remove("SITE_CONFIG_PATH")
        .env_remove("SITE_STAGE")
        .arg("validate")
        .arg("-s")
        .arg("stg")
        .assert()
        .success()
        .stdout(predicate::str::contains("my-site-stg"));
}

#[test]
fn test_validate_conflict_positional_and_flag() {
    let mut cmd = Command::cargo_bin("site").unwrap();
    cmd.arg("validate")
        .arg("prod")
        .arg("-s")
        .arg("dev")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

/// A missing source directory is not validated up front; the converge
/// proceeds and the failure surfaces from the provider, not from a
/// plan-time check. The endpoint override points at a closed port so the
/// run stops at the auth check instead of touching AWS.
#[test]
fn test_up_missing_source_dir_still_converges() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(temp.path().join("site.kdl"), "site \"my-site\"\n").unwrap();

    let mut cmd = Command::cargo_bin("site").unwrap();
    cmd.current_dir(temp.path())
        .env_remove("SITE_CONFIG_PATH")
        .env_remove("SITE_STAGE")
        .env("AWS_ACCESS_KEY_ID", "testing")
        .env("AWS_SECRET_ACCESS_KEY", "testing")
        .env("AWS_EC2_METADATA_DISABLED", "true")
        .env("AWS_ENDPOINT_URL", "http://127.0.0.1:9")
        .env("AWS_MAX_ATTEMPTS", "1")
        .arg("up")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Connecting to AWS"))
        .stderr(predicate::str::contains("source directory not found").not());
}

/// destroy without --yes must not touch anything; it asks for
/// confirmation and exits successfully.
#[test]
fn test_destroy_requires_yes() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(temp.path().join("site.kdl"), "site \"my-site\"\n").unwrap();

    let mut cmd = Command::cargo_bin("site").unwrap();
    cmd.current_dir(temp.path())
        .env_remove("SITE_CONFIG_PATH")
        .env_remove("SITE_STAGE")
        .arg("destroy")
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));
}
