//! End-to-end tests for the `wirebase` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const COMMON: &str = r#"
[db]
host = "localhost"
username = "app"
password = "hunter2"
"#;

fn app(common: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "config/common.toml", common);
    dir
}

fn write(base: &Path, rel: &str, contents: &str) {
    let path = base.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn wirebase(base: &Path) -> Command {
    let mut cmd = Command::cargo_bin("wirebase").unwrap();
    cmd.current_dir(base)
        .env_remove("APP_ENV")
        .env_remove("RUST_LOG")
        .arg("--base")
        .arg(base);
    cmd
}

// ── surface ───────────────────────────────────────────────────────────────────

#[test]
fn help_lists_commands() {
    Command::cargo_bin("wirebase")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dsn"))
        .stdout(predicate::str::contains("middleware"))
        .stdout(predicate::str::contains("deploy"));
}

#[test]
fn version_flag() {
    Command::cargo_bin("wirebase")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_subcommand_is_usage_error() {
    Command::cargo_bin("wirebase")
        .unwrap()
        .arg("frobnicate")
        .assert()
        .code(2);
}

#[test]
fn completions_for_bash() {
    Command::cargo_bin("wirebase")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("complete"));
}

// ── dsn ───────────────────────────────────────────────────────────────────────

#[test]
fn dsn_assembled_from_defaults_and_common() {
    let dir = app(COMMON);
    wirebase(dir.path())
        .arg("dsn")
        .assert()
        .success()
        .stdout("mysql:dbname=site;host=localhost;charset=utf8\n");
}

#[test]
fn dsn_never_prints_password() {
    let dir = app(COMMON);
    wirebase(dir.path())
        .args(["--output-format", "json", "dsn"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"username\": \"app\""))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn environment_file_overrides_common() {
    let dir = app(COMMON);
    write(dir.path(), "config/production.toml", "[db]\nhost = \"db.internal\"\nport = 3307\n");

    wirebase(dir.path())
        .args(["--env", "production", "dsn"])
        .assert()
        .success()
        .stdout("mysql:dbname=site;host=db.internal;charset=utf8;port=3307\n");

    // Without the flag the production file is not read.
    wirebase(dir.path())
        .arg("dsn")
        .assert()
        .success()
        .stdout(predicate::str::contains("host=localhost"));
}

#[test]
fn app_env_selects_environment() {
    let dir = app(COMMON);
    write(dir.path(), "config/staging.toml", "[db]\ndbname = \"stage\"\n");

    wirebase(dir.path())
        .env("APP_ENV", "staging")
        .arg("dsn")
        .assert()
        .success()
        .stdout(predicate::str::contains("dbname=stage"));
}

#[test]
fn explicit_dsn_wins() {
    let dir = app(COMMON);
    write(dir.path(), "config/local.toml", "[db]\ndsn = \"sqlite:/tmp/app.db\"\n");

    wirebase(dir.path())
        .arg("dsn")
        .assert()
        .success()
        .stdout("sqlite:/tmp/app.db\n");
}

#[test]
fn explicit_dsn_credentials_are_masked() {
    let dir = app(COMMON);
    write(
        dir.path(),
        "config/local.toml",
        "[db]\ndsn = \"mysql://app:hunter2@db/site\"\n",
    );

    wirebase(dir.path())
        .arg("dsn")
        .assert()
        .success()
        .stdout("mysql://app:********@db/site\n");
    wirebase(dir.path())
        .args(["--output-format", "json", "dsn"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter2").not());
    wirebase(dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter2").not());
}

// ── failures ──────────────────────────────────────────────────────────────────

#[test]
fn missing_common_is_not_found() {
    let dir = TempDir::new().unwrap();
    wirebase(dir.path())
        .arg("dsn")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("common.toml"));
}

#[test]
fn missing_host_is_configuration_error() {
    let dir = app("[db]\nusername = \"app\"\npassword = \"x\"\n");
    wirebase(dir.path())
        .arg("dsn")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("db.host"));
}

#[test]
fn malformed_layer_is_configuration_error() {
    let dir = app(COMMON);
    write(dir.path(), "config/development.toml", "[db\nhost = ");
    wirebase(dir.path()).arg("dsn").assert().code(4);
}

#[test]
fn check_without_credentials_fails() {
    let dir = app("[db]\nhost = \"localhost\"\n");
    wirebase(dir.path())
        .arg("check")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("db.username"));
}

#[test]
fn unwritable_log_directory_is_fatal() {
    let dir = app(COMMON);
    // A plain file where the log directory should be.
    fs::write(dir.path().join("tmp"), "").unwrap();

    wirebase(dir.path())
        .arg("dsn")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("logging"));
}

// ── check / logging ───────────────────────────────────────────────────────────

#[test]
fn check_reports_every_stage_and_writes_log() {
    let dir = app(COMMON);
    wirebase(dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("DSN: mysql:dbname=site"))
        .stdout(predicate::str::contains("development.log (level DEBUG)"))
        .stdout(predicate::str::contains("Bootstrap OK"));

    let log = fs::read_to_string(dir.path().join("tmp/log/development.log")).unwrap();
    let first = log.lines().next().unwrap();
    assert!(first.starts_with('['), "missing uid prefix: {first}");
    assert_eq!(first.find(']'), Some(8));
}

#[test]
fn production_log_only_records_errors() {
    let dir = app(COMMON);
    wirebase(dir.path())
        .args(["--env", "production", "check"])
        .assert()
        .success();

    let log = fs::read_to_string(dir.path().join("tmp/log/production.log")).unwrap();
    assert!(!log.contains("INFO"), "unexpected info record: {log}");
}

// ── middleware ────────────────────────────────────────────────────────────────

#[test]
fn middleware_plan_has_router_last() {
    let dir = app(COMMON);
    wirebase(dir.path())
        .arg("middleware")
        .assert()
        .success()
        .stdout(predicate::str::contains("client-ip"))
        .stdout(predicate::str::contains("auth-aware-router (priority 2001)"));
}

#[test]
fn declared_middleware_needing_missing_facility_is_skipped() {
    let dir = app(&format!(
        "{COMMON}\n[middlewares]\npre_router = [{{ name = \"session\", requires = \"redis\" }}, \"csrf\"]\n"
    ));
    wirebase(dir.path())
        .args(["--output-format", "json", "mw"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"csrf\""))
        .stdout(predicate::str::contains("\"session\"").not());
}

// ── config ────────────────────────────────────────────────────────────────────

#[test]
fn config_get_prints_bare_scalars() {
    let dir = app(COMMON);
    wirebase(dir.path())
        .args(["config", "get", "db.charset"])
        .assert()
        .success()
        .stdout("utf8\n");
}

#[test]
fn config_get_redacts_password() {
    let dir = app(COMMON);
    wirebase(dir.path())
        .args(["config", "get", "db.password"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn config_get_table_hides_password() {
    let dir = app(COMMON);
    wirebase(dir.path())
        .args(["config", "get", "db"])
        .assert()
        .success()
        .stdout(predicate::str::contains("localhost"))
        .stdout(predicate::str::contains("hunter2").not());
    wirebase(dir.path())
        .args(["--output-format", "json", "config", "get", "db"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"********\""))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn config_get_missing_key_fails() {
    let dir = app(COMMON);
    wirebase(dir.path())
        .args(["config", "get", "db.nope"])
        .assert()
        .code(4);
}

#[test]
fn config_has() {
    let dir = app(COMMON);
    wirebase(dir.path())
        .args(["config", "has", "db.host"])
        .assert()
        .success()
        .stdout("true\n");
    wirebase(dir.path())
        .args(["config", "has", "db.port"])
        .assert()
        .success()
        .stdout("false\n");
}

#[test]
fn bootstrap_layer_injects_base_and_mode() {
    let dir = app(COMMON);
    wirebase(dir.path())
        .args(["--env", "testing", "config", "get", "app.mode"])
        .assert()
        .success()
        .stdout("testing\n");
}

#[test]
fn fragments_concatenate_lists() {
    let dir = app(&format!("template_paths = [\"/srv/core\"]\n{COMMON}"));
    write(
        dir.path(),
        "config/fragments/blog/config.toml",
        "template_paths = [\"/srv/blog\"]\n",
    );

    wirebase(dir.path())
        .args(["--output-format", "json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/srv/core"))
        .stdout(predicate::str::contains("/srv/blog"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn sources_listed_in_merge_order() {
    let dir = app(COMMON);
    let out = wirebase(dir.path())
        .args(["config", "sources"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(out).unwrap();

    let common = text.find("common.toml").unwrap();
    let local = text.find("local.toml").unwrap();
    assert!(common < local);
}

// ── deploy ────────────────────────────────────────────────────────────────────

#[test]
fn deploy_dry_run_lists_steps() {
    let dir = app(&format!("{COMMON}\n[deploy.tasks]\nprepare = \"mkdir -p {{{{deploy_path}}}}/releases\"\n"));
    wirebase(dir.path())
        .args(["deploy", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("update_code"))
        .stdout(predicate::str::contains("/releases"))
        .stdout(predicate::str::contains("on failure: unlock"))
        .stdout(predicate::str::contains("on success: notify"));

    assert!(!dir.path().join("releases").exists());
}

#[test]
fn deploy_runs_configured_steps() {
    let dir = app(&format!(
        "{COMMON}\n[deploy.tasks]\nrelease = \"mkdir -p {{{{release_path}}}}\"\nnotify = \"touch {{{{deploy_path}}}}/notified\"\n"
    ));
    wirebase(dir.path())
        .args(["deploy", "--yes"])
        .assert()
        .success();

    assert!(dir.path().join("release").is_dir());
    assert!(dir.path().join("notified").exists());
}

#[test]
fn failed_deploy_step_unlocks() {
    let dir = app(&format!(
        "{COMMON}\n[deploy.tasks]\nvendors = \"exit 7\"\nunlock = \"touch {{{{deploy_path}}}}/unlocked\"\nsymlink = \"touch {{{{deploy_path}}}}/linked\"\n"
    ));
    wirebase(dir.path())
        .args(["deploy", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("vendors"));

    assert!(dir.path().join("unlocked").exists());
    assert!(!dir.path().join("linked").exists());
}

#[test]
fn failure_before_lock_skips_unlock() {
    let dir = app(&format!(
        "{COMMON}\n[deploy.tasks]\nprepare = \"exit 3\"\nunlock = \"touch {{{{deploy_path}}}}/unlocked\"\n"
    ));
    wirebase(dir.path())
        .args(["deploy", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("prepare"));

    assert!(!dir.path().join("unlocked").exists());
}
