use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::PathBuf;

/// Helper to get a temporary home directory
fn temp_home_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create temp dir")
}

/// Helper to get config file path in the temp dir
fn config_file_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join(".event-admin").join("config.json")
}

const BINARY_NAME: &str = "event-admin";

#[test]
/// Help command should display usage information.
fn cli_help_displays_usage() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(contains("Administration console for the event platform"))
        .stdout(contains("dashboard"));
}

#[test]
/// Logout command should delete an existing config file.
fn logout_deletes_config_file() {
    let tmp = temp_home_dir();
    let config_path = config_file_path(&tmp);
    fs::create_dir_all(config_path.parent().unwrap()).unwrap();
    fs::write(&config_path, "{}").unwrap();

    assert!(config_path.exists());

    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.arg("logout")
        .env("HOME", tmp.path()) // simulate different $HOME
        .assert()
        .success()
        .stdout(contains("Logging out"));

    assert!(!config_path.exists());
}

#[test]
/// Logout should succeed even if the config file is unreadable.
fn logout_removes_corrupt_config() {
    let tmp = temp_home_dir();
    let config_path = config_file_path(&tmp);
    fs::create_dir_all(config_path.parent().unwrap()).unwrap();
    fs::write(&config_path, "not json").unwrap();

    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.arg("logout").env("HOME", tmp.path()).assert().success();

    assert!(!config_path.exists());
}

#[test]
/// Protected commands refuse to run without a stored session.
fn protected_command_requires_login() {
    let tmp = temp_home_dir();

    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.args(["users", "list"])
        .env("HOME", tmp.path())
        .env_remove("EVENT_ADMIN_API_URL")
        .assert()
        .failure()
        .stderr(contains("not logged in"));

    // Nothing is written for a refused command
    assert!(!config_file_path(&tmp).exists());
}

#[test]
/// Login with blank credentials fails validation before any request is made.
fn login_with_blank_password_is_rejected() {
    let tmp = temp_home_dir();

    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.args(["login", "--email", "admin@example.com", "--password", ""])
        .env("HOME", tmp.path())
        .env_remove("EVENT_ADMIN_PASSWORD")
        .assert()
        .failure()
        .stderr(contains("Please fill in both fields."));

    assert!(!config_file_path(&tmp).exists());
}

#[test]
/// Role names outside user, admin and superadmin are rejected by the parser.
fn set_role_rejects_unknown_role() {
    let tmp = temp_home_dir();

    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.args(["users", "set-role", "u1", "owner"])
        .env("HOME", tmp.path())
        .assert()
        .failure();
}
