// ta-check/tests/cli_integration.rs

//! CLI tests that never touch the network: every run either fails before
//! probing or has an empty candidate set.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command isolated from any real config files and cache.
fn isolated_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ta-check").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("TA_CONFIG")
        .env_remove("TA_CACHE_PATH")
        .env_remove("TA_STATUS_URL")
        .env_remove("RUST_LOG");
    cmd
}

/// Write a roster cache file and return its path.
fn write_cache(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("roster.json");
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_help_shows_arguments() {
    let mut cmd = Command::cargo_bin("ta-check").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("DEPARTMENT"))
        .stdout(predicate::str::contains("COHORT"))
        .stdout(predicate::str::contains("--keep-going"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_invalid_cohort_rejected() {
    let home = TempDir::new().unwrap();
    let mut cmd = isolated_cmd(&home);
    cmd.args(["135", "abc"]);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid cohort code 'abc'"));
}

#[test]
fn test_invalid_department_rejected() {
    let home = TempDir::new().unwrap();
    let mut cmd = isolated_cmd(&home);
    cmd.args(["IF", "20"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid department code"));
}

#[test]
fn test_missing_config_file_reported() {
    let home = TempDir::new().unwrap();
    let mut cmd = isolated_cmd(&home);
    cmd.args(["--config", "does-not-exist.toml"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config file"));
}

#[test]
fn test_invalid_config_value_reported() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("ta-check.toml"), "[defaults]\nconcurrency = 0\n").unwrap();
    let mut cmd = isolated_cmd(&home);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Concurrency must be between 1 and 100"));
}

#[test]
fn test_corrupt_cache_is_fatal() {
    let home = TempDir::new().unwrap();
    let cache = write_cache(&home, r#"[["Alice","13520001"],["Bob"]]"#);
    let mut cmd = isolated_cmd(&home);
    cmd.env("TA_CACHE_PATH", &cache).args(["135", "20"]);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Parse error in roster record 1"))
        .stdout(predicate::str::contains("Total").not());
}

#[test]
fn test_empty_cohort_reports_zero() {
    let home = TempDir::new().unwrap();
    let cache = write_cache(&home, r#"[["Alice","18221001"]]"#);
    let mut cmd = isolated_cmd(&home);
    cmd.env("TA_CACHE_PATH", &cache).args(["135", "7"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::diff("Total: 0 students\n"))
        .stderr(predicate::str::contains("13507XXX"));
}

#[test]
fn test_config_file_supplies_defaults() {
    let home = TempDir::new().unwrap();
    let cache = write_cache(&home, r#"[["Alice","13520001"]]"#);
    fs::write(
        home.path().join("ta-check.toml"),
        format!(
            "[defaults]\ndepartment = \"182\"\ncohort = \"21\"\n\n[sources]\ncache_path = {:?}\n",
            cache
        ),
    )
    .unwrap();
    let mut cmd = isolated_cmd(&home);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Total: 0 students"))
        .stderr(predicate::str::contains("18221XXX"));
}

#[test]
fn test_verbose_logs_resolved_settings() {
    let home = TempDir::new().unwrap();
    let cache = write_cache(&home, r#"[["Alice","18221001"]]"#);
    let mut cmd = isolated_cmd(&home);
    cmd.env("TA_CACHE_PATH", &cache)
        .env("TA_CONCURRENCY", "7")
        .args(["135", "7", "--verbose", "--keep-going"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::diff("Total: 0 students\n"))
        .stderr(predicate::str::contains("resolved settings"))
        .stderr(predicate::str::contains("concurrency=7"))
        .stderr(predicate::str::contains("policy=keep-going"));
}
