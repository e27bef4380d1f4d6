#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CLI smoke tests for the courses-server binary

use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::timeout;

use courses_sdk::{CoursesClientV1, CoursesGrpcClient};

/// Run the binary to completion with a clean `COURSES_*` environment.
fn run_courses_server(args: &[&str], envs: &[(&str, &str)]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_courses-server"))
        .args(args)
        .env_remove("COURSES_CONFIG")
        .env_remove("RUST_LOG")
        .envs(envs.iter().copied())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute courses-server")
}

#[test]
fn test_cli_help_command() {
    let output = run_courses_server(&["--help"], &[]);
    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
    assert!(stdout.contains("--listen"), "Should mention listen option");
}

#[test]
fn test_print_config_applies_layers() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "listen_addr: 0.0.0.0:6100\nseed: false").unwrap();
    let path = file.path().to_string_lossy().to_string();

    let output = run_courses_server(
        &["--config", &path, "--listen", "127.0.0.1:6200", "--print-config"],
        &[("COURSES__LOGGING__FORMAT", "json")],
    );
    assert!(output.status.success(), "print-config should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let cfg: courses::CoursesConfig =
        serde_saphyr::from_str(&stdout).expect("print-config output should be valid YAML");
    assert_eq!(cfg.listen_addr, "127.0.0.1:6200");
    assert!(!cfg.seed);
    assert_eq!(cfg.logging.format, courses::config::LogFormat::Json);
}

#[test]
fn test_check_accepts_defaults() {
    let output = run_courses_server(&["check"], &[]);
    assert!(output.status.success(), "check should accept the defaults");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration is valid"));
}

#[test]
fn test_check_rejects_bad_listen_addr() {
    let output = run_courses_server(&["--listen", "nowhere", "check"], &[]);
    assert!(!output.status.success(), "check should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nowhere"), "error should name the address");
}

#[test]
fn test_missing_config_file_fails() {
    let output = run_courses_server(&["--config", "/nonexistent/courses.yaml", "check"], &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"));
}

#[tokio::test]
async fn test_run_prints_handshake_and_serves() {
    let mut child = tokio::process::Command::new(env!("CARGO_BIN_EXE_courses-server"))
        .args(["--listen", "127.0.0.1:0", "run"])
        .env_remove("COURSES_CONFIG")
        .env("COURSES__PLUGIN__HANDSHAKE", "true")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .unwrap();

    let stdout = child.stdout.take().unwrap();
    let mut lines = BufReader::new(stdout).lines();
    let line = timeout(Duration::from_secs(10), lines.next_line())
        .await
        .expect("handshake line should arrive")
        .unwrap()
        .expect("stdout should not close before the handshake");

    let parts: Vec<&str> = line.split('|').collect();
    assert_eq!(parts.len(), 5, "unexpected handshake line: {line}");
    assert_eq!(&parts[..3], &["1", "1", "tcp"]);
    assert_eq!(parts[4], "grpc");

    let client = CoursesGrpcClient::connect(&format!("http://{}", parts[3]))
        .await
        .unwrap();
    assert_eq!(client.list_courses().await.unwrap().len(), 4);

    child.kill().await.unwrap();
}
