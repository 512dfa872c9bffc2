//! Integration tests for the `hasskit` CLI binary.
//!
//! Argument parsing, help output, completions and error handling run
//! without a server; the rest talk to a wiremock stand-in.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `hasskit` binary with env isolation.
///
/// Clears all `HASSKIT_*` env vars and points config directories at
/// `config_home` so tests never touch the user's real configuration.
fn hasskit_in(config_home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("hasskit");
    cmd.env("HOME", config_home)
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("RUST_LOG")
        .env_remove("HASSKIT_PROFILE")
        .env_remove("HASSKIT_SERVER")
        .env_remove("HASSKIT_TOKEN")
        .env_remove("HASSKIT_OUTPUT")
        .env_remove("HASSKIT_INSECURE")
        .env_remove("HASSKIT_TIMEOUT")
        .env_remove("HASSKIT_WEBHOOK_ID")
        .env_remove("HASSKIT_REFRESH_TOKEN");
    cmd
}

fn hasskit_cmd() -> assert_cmd::Command {
    hasskit_in(Path::new("/tmp/hasskit-test-nonexistent"))
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Write `contents` where the binary looks for its config on Linux.
fn write_config(config_home: &Path, contents: &str) {
    let dir = config_home.join("hasskit");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), contents).unwrap();
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = hasskit_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    hasskit_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Home Assistant")
            .and(predicate::str::contains("states"))
            .and(predicate::str::contains("services"))
            .and(predicate::str::contains("webhook")),
    );
}

#[test]
fn test_version_flag() {
    hasskit_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hasskit"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    hasskit_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    hasskit_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = hasskit_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_states_list_without_server() {
    hasskit_cmd()
        .args(["states", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No server configured"));
}

#[test]
fn test_unknown_profile_is_usage_error() {
    hasskit_cmd()
        .args(["--profile", "cabin", "status"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cabin"));
}

#[test]
fn test_invalid_output_format() {
    let output = hasskit_cmd()
        .args(["--output", "invalid", "states", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_invalid_server_url() {
    hasskit_cmd()
        .args(["--server", "ftp://ha.local", "--token", "x", "status"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("server"));
}

#[test]
fn test_webhook_without_id() {
    hasskit_cmd()
        .args(["--server", "http://127.0.0.1:9", "webhook", "zones"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("webhook"));
}

#[test]
fn test_service_without_domain() {
    hasskit_cmd()
        .args([
            "--server",
            "http://127.0.0.1:9",
            "--token",
            "x",
            "services",
            "call",
            "turn_on",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("domain.name"));
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_states_subcommands_exist() {
    hasskit_cmd()
        .args(["states", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("get"))
                .and(predicate::str::contains("set")),
        );
}

#[test]
fn test_auth_subcommands_exist() {
    hasskit_cmd()
        .args(["auth", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("url")
                .and(predicate::str::contains("exchange"))
                .and(predicate::str::contains("refresh"))
                .and(predicate::str::contains("revoke")),
        );
}

// ── Profiles ────────────────────────────────────────────────────────

#[test]
fn test_profile_show_without_config() {
    hasskit_cmd().args(["profile", "show"]).assert().success();
}

#[cfg(target_os = "linux")]
#[test]
fn test_profile_show_masks_token() {
    let home = tempfile::tempdir().unwrap();
    write_config(
        home.path(),
        r#"
default_profile = "home"

[profiles.home]
server = "http://ha.local:8123"
token = "plaintext-secret"
"#,
    );

    hasskit_in(home.path())
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[profiles.home]")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("plaintext-secret").not()),
        );
}

#[cfg(target_os = "linux")]
#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_config_is_reported_and_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/mobile_app/registrations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "webhook_id": "hook-1" })))
        .expect(0)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let contents = format!(
        "default_profile = \"home\"\n\n[defaults]\ntimeout = \"abc\"\n\n[profiles.home]\nserver = \"{}\"\ntoken = \"t\"\n",
        server.uri()
    );
    write_config(home.path(), &contents);

    hasskit_in(home.path())
        .args(["webhook", "register", "--device-name", "laptop", "--save"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config loading failed"));

    let on_disk = std::fs::read_to_string(home.path().join("hasskit/config.toml")).unwrap();
    assert_eq!(on_disk, contents);
}

// ── Against a server ────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_status_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "API running." })))
        .expect(1)
        .mount(&server)
        .await;

    hasskit_cmd()
        .args(["--server", &server.uri(), "--token", "test-token", "-o", "json", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"message\": \"API running.\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_token_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    hasskit_cmd()
        .args(["--server", &server.uri(), "--token", "bad", "status"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Authentication failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_missing_api_reports_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    hasskit_cmd()
        .args(["--server", &server.uri(), "--token", "x", "status"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("HTTP 404"));
}

#[cfg(target_os = "linux")]
#[tokio::test(flavor = "multi_thread")]
async fn test_profile_token_and_missing_entity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/states/light.garage"))
        .and(header("authorization", "Bearer profile-token"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    write_config(
        home.path(),
        &format!(
            "default_profile = \"home\"\n\n[profiles.home]\nserver = \"{}\"\ntoken = \"profile-token\"\n",
            server.uri()
        ),
    );

    hasskit_in(home.path())
        .args(["states", "get", "light.garage"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("light.garage"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_states_list_plain_filters_domain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "entity_id": "switch.pump", "state": "off", "last_changed": "2025-11-20T06:00:00+00:00" },
            { "entity_id": "light.kitchen", "state": "on", "last_changed": "2025-11-20T07:00:00+00:00" },
            { "entity_id": "light.hall", "state": "off", "last_changed": "2025-11-20T07:30:00+00:00" }
        ])))
        .mount(&server)
        .await;

    hasskit_cmd()
        .args([
            "--server",
            &server.uri(),
            "--token",
            "x",
            "-o",
            "plain",
            "states",
            "list",
            "--domain",
            "light",
        ])
        .assert()
        .success()
        .stdout("light.hall\nlight.kitchen\n");
}
