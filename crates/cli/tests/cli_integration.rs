use std::path::Path;
use std::process::{Command, Output};

use serde_json::json;
use wiremock::matchers::{basic_auth, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Run the binary with an isolated home directory and no inherited
/// ticketbridge settings.
fn ticketbridge(home: &Path, args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_ticketbridge"));
    command
        .args(args)
        .env("HOME", home)
        .env_remove("TICKETBRIDGE_SOURCE")
        .env_remove("TICKETBRIDGE_USER")
        .env_remove("TICKETBRIDGE_ENVIRONMENT")
        .env_remove("TICKETBRIDGE_PASSWORD")
        .env_remove("TICKETBRIDGE_PASSWORD_A")
        .env_remove("TICKETBRIDGE_PASSWORD_B")
        .env_remove("RUST_LOG");
    for (key, value) in envs {
        command.env(key, value);
    }
    command.output().expect("Failed to execute ticketbridge")
}

fn write_settings(dir: &Path, url: &str) -> String {
    let path = dir.join("config.yaml");
    let yaml = format!(
        r#"
sources:
  a:
    url: "{url}"
    username: svc-bot
    project:
      field: product_id
    issue_type:
      id: 10001
    exclude: [id]
"#
    );
    std::fs::write(&path, yaml).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_cli_version() {
    let home = tempfile::tempdir().unwrap();
    let output = ticketbridge(home.path(), &["--version"], &[]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ticketbridge"));
    assert!(stdout.contains("0.1."));
}

#[test]
fn test_cli_help() {
    let home = tempfile::tempdir().unwrap();
    let output = ticketbridge(home.path(), &["--help"], &[]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("create"));
    assert!(stdout.contains("sprint"));
    assert!(stdout.contains("--source"));
}

#[test]
fn test_all_commands_at_top_level() {
    let home = tempfile::tempdir().unwrap();
    let output = ticketbridge(home.path(), &["--help"], &[]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in [
        "create",
        "comment",
        "transition",
        "search",
        "sprint",
        "board",
        "auth",
        "config",
    ] {
        assert!(stdout.contains(command), "missing {command} in help");
    }

    let path = ticketbridge(home.path(), &["config", "path"], &[]);
    assert!(path.status.success());
    assert!(String::from_utf8_lossy(&path.stdout).contains("config.yaml"));
}

#[test]
fn test_invalid_command() {
    let home = tempfile::tempdir().unwrap();
    let output = ticketbridge(home.path(), &["nonexistent"], &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized subcommand") || stderr.contains("error:"));
}

#[test]
fn test_unknown_source_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let output = ticketbridge(
        home.path(),
        &["--source", "c", "create", "-f", "name=Widget"],
        &[],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized source 'c'"));
}

#[test]
fn test_create_requires_source() {
    let home = tempfile::tempdir().unwrap();
    let output = ticketbridge(home.path(), &["create", "-f", "name=Widget"], &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No source selected"));
}

#[test]
fn test_unconfigured_source_fails_before_any_request() {
    let home = tempfile::tempdir().unwrap();
    let config = write_settings(home.path(), "http://127.0.0.1:9");
    let output = ticketbridge(
        home.path(),
        &["--config", &config, "--source", "b", "--user", "jdoe", "create"],
        &[],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No Jira instance configured for source 'b'"));
}

#[test]
fn test_missing_password_names_env_var() {
    let home = tempfile::tempdir().unwrap();
    let config = write_settings(home.path(), "http://127.0.0.1:9");
    let output = ticketbridge(
        home.path(),
        &["--config", &config, "--source", "a", "--user", "jdoe", "create"],
        &[],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TICKETBRIDGE_PASSWORD_A"));
}

#[test]
fn test_config_init_and_show() {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("settings").join("config.yaml");
    let config = config.to_string_lossy();

    let output = ticketbridge(home.path(), &["--config", &config, "config", "init"], &[]);
    assert!(output.status.success());

    let again = ticketbridge(home.path(), &["--config", &config, "config", "init"], &[]);
    assert!(!again.status.success());
    assert!(String::from_utf8_lossy(&again.stderr).contains("--force"));

    let shown = ticketbridge(
        home.path(),
        &["--config", &config, "--output", "json", "config", "show"],
        &[],
    );
    assert!(shown.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&shown.stdout).unwrap();
    assert_eq!(rows[0]["source"], "a");
    assert_eq!(rows[0]["project"], "from field product_id");
    assert_eq!(rows[1]["source"], "b");
    assert_eq!(rows[1]["password_in_file"], false);
}

#[test]
fn test_auth_login_then_logout() {
    let home = tempfile::tempdir().unwrap();

    let login = ticketbridge(
        home.path(),
        &["--source", "b", "auth", "login", "--password", "hunter2"],
        &[],
    );
    assert!(login.status.success());

    let stored = std::fs::read_to_string(home.path().join(".ticketbridge").join("credentials"))
        .unwrap();
    assert!(stored.contains("hunter2"));

    let logout = ticketbridge(home.path(), &["--source", "b", "auth", "logout"], &[]);
    assert!(logout.status.success());

    let stored = std::fs::read_to_string(home.path().join(".ticketbridge").join("credentials"))
        .unwrap();
    assert!(!stored.contains("hunter2"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue"))
        .and(basic_auth("svc-bot", "s3cret"))
        .and(header("contextUser", "jdoe"))
        .and(body_json(json!({
            "fields": {
                "project": {"id": "3"},
                "issuetype": {"id": "10001"},
                "summary": "Widget"
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "10042",
            "key": "PROJ-42"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let config = write_settings(home.path(), &mock_server.uri());
    let home_path = home.path().to_path_buf();

    let output = tokio::task::spawn_blocking(move || {
        ticketbridge(
            &home_path,
            &[
                "--config", &config, "--source", "a", "--output", "quiet", "create", "-f", "id=7",
                "-f", "product_id=3", "-f", "name=Widget",
            ],
            &[
                ("TICKETBRIDGE_USER", "jdoe"),
                ("TICKETBRIDGE_PASSWORD_A", "s3cret"),
            ],
        )
    })
    .await
    .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout), "PROJ-42\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_failure_exits_non_zero() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let config = write_settings(home.path(), &mock_server.uri());
    let home_path = home.path().to_path_buf();

    let output = tokio::task::spawn_blocking(move || {
        ticketbridge(
            &home_path,
            &[
                "--config", &config, "--source", "a", "--user", "jdoe", "create", "-f",
                "product_id=3", "-f", "name=Widget",
            ],
            &[("TICKETBRIDGE_PASSWORD", "s3cret")],
        )
    })
    .await
    .unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to create ticket in source 'a'"));
}
