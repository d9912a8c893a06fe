use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cmd() -> Command {
    Command::cargo_bin("metals-feed").unwrap()
}

#[test]
fn prints_default_config() {
    cmd()
        .arg("--print-default-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[influx]"))
        .stdout(predicate::str::contains("symbol = \"XAU\""));
}

#[test]
fn rejects_invalid_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("metals-feed.toml");
    std::fs::write(&path, "[feed]\npoll_interval_secs = 0\n").unwrap();

    cmd()
        .arg("--config")
        .arg(&path)
        .env_remove("METALS_POLL_INTERVAL_SECS")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn missing_config_file_fails() {
    let dir = tempdir().unwrap();
    cmd()
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading config"));
}

#[test]
fn once_conflicts_with_iterations() {
    cmd().args(["--once", "--iterations", "3"]).assert().failure();
}

#[test]
fn diagnostics_stay_off_stdout() {
    let dir = tempdir().unwrap();
    cmd()
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .args(["--log-level", "info"])
        .env_remove("METALS_FEED_LOG")
        .env("METALS_FEED_LOG_STYLE", "never")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("[metals_feed::utils::logging] Logging initialized at level: info"))
        .stderr(predicate::str::contains("\x1b[").not());
}
