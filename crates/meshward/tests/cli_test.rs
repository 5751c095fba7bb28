//! Integration tests for the `meshward` CLI binary.
//!
//! Parsing, help and error paths run without a server. Commands that talk
//! to a management server run against a wiremock instance.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `meshward` binary with env isolation.
///
/// Clears all `MESHWARD_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn meshward_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("meshward");
    cmd.env("HOME", "/tmp/meshward-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/meshward-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("MESHWARD_PROFILE")
        .env_remove("MESHWARD_API_URL")
        .env_remove("MESHWARD_TOKEN")
        .env_remove("MESHWARD_OUTPUT")
        .env_remove("MESHWARD_INSECURE")
        .env_remove("MESHWARD_TIMEOUT");
    cmd
}

/// Same as [`meshward_cmd`], pointed at `server` with a token.
fn server_cmd(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = meshward_cmd();
    cmd.args(["--api-url", &server.uri(), "--token", "nbp_test"]);
    cmd
}

/// [`meshward_cmd`] reading its config from `<dir>/meshward/config.toml`.
fn config_dir_cmd(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = meshward_cmd();
    cmd.env("HOME", dir.path()).env("XDG_CONFIG_HOME", dir.path());
    cmd
}

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let config_dir = dir.path().join("meshward");
    std::fs::create_dir_all(&config_dir).unwrap();
    let path = config_dir.join("config.toml");
    std::fs::write(&path, body).unwrap();
    path
}

/// Answers `GET /api/groups` only when sent `token`.
async fn mount_groups_for_token(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .and(header("Authorization", format!("Token {token}").as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": "g0", "name": "All" }])),
        )
        .mount(server)
        .await;
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mount_get(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Groups All/Eng/Ops, peer `bastion` in All and Eng, one SSH policy
/// towards Eng.
async fn mount_mesh(server: &MockServer) {
    mount_get(
        server,
        "/api/groups",
        json!([
            { "id": "g0", "name": "All", "peers": ["p1", "p2"] },
            { "id": "g1", "name": "Eng", "peers": ["p1"] },
            { "id": "g2", "name": "Ops", "peers": ["p2"] }
        ]),
    )
    .await;
    mount_get(
        server,
        "/api/peers",
        json!([
            {
                "id": "p1",
                "name": "bastion",
                "ip": "100.64.0.1",
                "connected": true,
                "ssh_enabled": true,
                "groups": [{ "id": "g0", "name": "All" }, { "id": "g1", "name": "Eng" }]
            },
            {
                "id": "p2",
                "name": "laptop",
                "ip": "100.64.0.2",
                "connected": false,
                "ssh_enabled": false,
                "groups": [{ "id": "g0", "name": "All" }, { "id": "g2", "name": "Ops" }]
            }
        ]),
    )
    .await;
    mount_get(
        server,
        "/api/policies",
        json!([{
            "id": "pol1",
            "name": "ssh-to-eng",
            "enabled": true,
            "rules": [{
                "protocol": "tcp",
                "ports": ["22"],
                "sources": ["g0"],
                "destinations": [{ "id": "g1", "name": "Eng" }]
            }]
        }]),
    )
    .await;
    mount_get(server, "/api/networks", json!([])).await;
    mount_get(server, "/api/posture-checks", json!([])).await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = meshward_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    meshward_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("groups")
            .and(predicate::str::contains("peers"))
            .and(predicate::str::contains("policies"))
            .and(predicate::str::contains("posture-checks")),
    );
}

#[test]
fn test_version_flag() {
    meshward_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("meshward"));
}

#[test]
fn test_invalid_subcommand() {
    meshward_cmd()
        .arg("frobnicate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_completions_bash() {
    meshward_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("meshward"));
}

#[test]
fn test_policies_assigned_requires_target() {
    meshward_cmd()
        .args(["policies", "assigned"])
        .assert()
        .code(2);
}

#[test]
fn test_resource_target_requires_network() {
    meshward_cmd()
        .args(["policies", "assigned", "--resource", "db"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--network"));
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_no_config_reports_missing_server() {
    let output = meshward_cmd().args(["groups", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(
        text.contains("No management server configured"),
        "Expected missing-config error:\n{text}"
    );
}

#[test]
fn test_missing_token_is_auth_error() {
    meshward_cmd()
        .args(["--api-url", "https://mgmt.example.com", "groups", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No token configured"));
}

#[test]
fn test_config_path_prints_location() {
    meshward_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// ── Profiles ────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_default_profile_supplies_server_and_token() {
    let server = MockServer::start().await;
    mount_groups_for_token(&server, "nbp_profile").await;
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        &format!(
            r#"
default_profile = "cli-test-work"

[profiles.cli-test-work]
api_url = "{}"
token = "nbp_profile"
timeout = 5
"#,
            server.uri()
        ),
    );

    config_dir_cmd(&dir)
        .args(["groups", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::diff("g0\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_flags_override_selected_profile() {
    let server = MockServer::start().await;
    mount_groups_for_token(&server, "nbp_flag").await;
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        r#"
default_profile = "cli-test-work"

[profiles.cli-test-work]
api_url = "http://127.0.0.1:9"
token = "nbp_profile"

[profiles.cli-test-lab]
api_url = "http://127.0.0.1:9"
token = "nbp_lab"
insecure = true
"#,
    );

    config_dir_cmd(&dir)
        .args(["--profile", "cli-test-lab", "--api-url", &server.uri()])
        .args(["--token", "nbp_flag", "groups", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::diff("g0\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_profile_token_env_is_read() {
    let server = MockServer::start().await;
    mount_groups_for_token(&server, "nbp_from_env").await;
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        &format!(
            r#"
default_profile = "cli-test-ci"

[profiles.cli-test-ci]
api_url = "{}"
token_env = "MESHWARD_CLI_TEST_TOKEN"
"#,
            server.uri()
        ),
    );

    config_dir_cmd(&dir)
        .env("MESHWARD_CLI_TEST_TOKEN", "nbp_from_env")
        .args(["groups", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::diff("g0\n"));
}

#[test]
fn test_profile_without_any_token_is_auth_error() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        r#"
default_profile = "cli-test-empty"

[profiles.cli-test-empty]
api_url = "https://mgmt.example.com"
token_env = "MESHWARD_CLI_TEST_TOKEN_NEVER_SET"
"#,
    );

    config_dir_cmd(&dir)
        .args(["groups", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("cli-test-empty"));
}

#[test]
fn test_config_show_masks_tokens() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        r#"
default_profile = "cli-test-work"

[profiles.cli-test-work]
api_url = "https://mgmt.example.com"
token = "nbp_very_secret"
"#,
    );

    config_dir_cmd(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("****")
                .and(predicate::str::contains("https://mgmt.example.com"))
                .and(predicate::str::contains("nbp_very_secret").not()),
        );

    let output = config_dir_cmd(&dir)
        .args(["config", "show", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["profiles"]["cli-test-work"]["token"], "****");
    assert!(!String::from_utf8_lossy(&output.stdout).contains("nbp_very_secret"));
}

#[test]
fn test_config_use_switches_default_profile() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
default_profile = "cli-test-work"

[profiles.cli-test-work]
api_url = "https://mgmt.example.com"

[profiles.cli-test-lab]
api_url = "https://lab.example.com"
"#,
    );

    config_dir_cmd(&dir)
        .args(["config", "use", "cli-test-lab"])
        .assert()
        .success();
    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.contains(r#"default_profile = "cli-test-lab""#), "{saved}");

    config_dir_cmd(&dir)
        .args(["config", "use", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
    let unchanged = std::fs::read_to_string(&path).unwrap();
    assert_eq!(saved, unchanged);
}

// ── Server-backed commands ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_groups_list_json() {
    let server = MockServer::start().await;
    mount_mesh(&server).await;

    let output = server_cmd(&server)
        .args(["groups", "list", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let groups: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = groups
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["All", "Eng", "Ops"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_peers_ssh_reachable_by_name() {
    let server = MockServer::start().await;
    mount_mesh(&server).await;

    server_cmd(&server)
        .args(["peers", "ssh", "bastion", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::diff("true\n"));

    server_cmd(&server)
        .args(["peers", "ssh", "laptop", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::diff("false\n"));

    server_cmd(&server)
        .args(["peers", "ssh", "bastion", "--port", "443", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::diff("false\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_peer_exits_not_found() {
    let server = MockServer::start().await;
    mount_mesh(&server).await;

    server_cmd(&server)
        .args(["peers", "ssh", "nope"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("peer 'nope' not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_policies_assigned_to_groups() {
    let server = MockServer::start().await;
    mount_mesh(&server).await;

    server_cmd(&server)
        .args(["policies", "assigned", "--groups", "Eng,Ops", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::diff("pol1\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_groups_dry_run_writes_nothing() {
    let server = MockServer::start().await;
    mount_mesh(&server).await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let output = server_cmd(&server)
        .args(["peers", "set-groups", "bastion", "Ops", "--dry-run", "-o", "plain"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("remove Eng planned"), "{stdout}");
    assert!(stdout.contains("add Ops planned"), "{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_groups_up_to_date_is_noop() {
    let server = MockServer::start().await;
    mount_mesh(&server).await;

    server_cmd(&server)
        .args(["peers", "set-groups", "p1", "Eng"])
        .assert()
        .success()
        .stderr(predicate::str::contains("already up to date"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_groups_applies_creates_and_updates() {
    let server = MockServer::start().await;
    mount_mesh(&server).await;
    Mock::given(method("PUT"))
        .and(path("/api/groups/g2"))
        .and(body_json(json!({ "name": "Ops", "peers": ["p2", "p1"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "g2", "name": "Ops", "peers": ["p2", "p1"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/groups"))
        .and(body_json(json!({ "name": "New", "peers": ["p1"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "g9", "name": "New", "peers": ["p1"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    server_cmd(&server)
        .args(["peers", "set-groups", "bastion", "Eng", "Ops", "New", "-o", "plain"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("add Ops applied")
                .and(predicate::str::contains("create New applied")),
        )
        .stderr(predicate::str::contains("2 group update(s) applied"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_groups_partial_failure_exit_code() {
    let server = MockServer::start().await;
    mount_mesh(&server).await;
    Mock::given(method("PUT"))
        .and(path("/api/groups/g2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "g2", "name": "Ops", "peers": ["p2", "p1"]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/groups"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "group New already exists", "code": 409
        })))
        .mount(&server)
        .await;

    let output = server_cmd(&server)
        .args(["peers", "set-groups", "bastion", "Eng", "Ops", "New", "-o", "plain"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(9), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("add Ops applied"), "{stdout}");
    assert!(stdout.contains("create New failed"), "{stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1 group update(s) failed: New"), "{stderr}");
    assert!(stderr.contains("Fix the cause"), "{stderr}");
}
