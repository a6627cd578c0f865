//! End-to-end CLI tests for the librova binary.

#![allow(clippy::unwrap_used)]

mod support;

use std::process::Output;

use assert_cmd::Command;
use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use support::{TocStyle, build_epub, start_mock_server_or_skip};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

/// Binary isolated from the user's config directory.
fn librova(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("librova").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

/// Runs `cmd` off the async runtime so the mock server keeps serving.
async fn run(mut cmd: Command) -> Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

#[test]
fn test_binary_help_displays_usage() {
    let home = TempDir::new().unwrap();
    librova(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Read and download ebooks"));
}

#[test]
fn test_binary_version_displays_version() {
    let home = TempDir::new().unwrap();
    librova(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("librova"));
}

#[test]
fn test_binary_without_subcommand_fails() {
    let home = TempDir::new().unwrap();
    librova(&home).assert().failure();
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let home = TempDir::new().unwrap();
    librova(&home)
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_read_rejects_out_of_range_font_size() {
    let home = TempDir::new().unwrap();
    librova(&home)
        .args(["read", "42", "--font-size", "20"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("font-size"));
}

#[test]
fn test_token_store_and_clear() {
    let home = TempDir::new().unwrap();
    let store = home.path().join("store.json");

    librova(&home)
        .arg("--store")
        .arg(&store)
        .args(["token", "abc123"])
        .assert()
        .success();
    let saved = std::fs::read_to_string(&store).unwrap();
    assert!(saved.contains("\"sessionToken\""), "got: {saved}");
    assert!(saved.contains("abc123"), "got: {saved}");

    librova(&home)
        .arg("--store")
        .arg(&store)
        .args(["token", "--clear"])
        .assert()
        .success();
    let saved = std::fs::read_to_string(&store).unwrap();
    assert!(!saved.contains("abc123"), "got: {saved}");
}

#[test]
fn test_token_value_is_absent_from_debug_logs() {
    let home = TempDir::new().unwrap();

    librova(&home)
        .arg("--store")
        .arg(home.path().join("store.json"))
        .args(["-vv", "token", "s3cr3t-value"])
        .assert()
        .success()
        .stderr(predicate::str::contains("CLI arguments parsed"))
        .stderr(predicate::str::contains("s3cr3t-value").not());
}

#[test]
fn test_token_requires_value_or_clear() {
    let home = TempDir::new().unwrap();
    librova(&home).arg("token").assert().failure();
}

#[test]
fn test_invalid_config_file_is_reported() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join("librova");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "font_size = 9000\n").unwrap();

    librova(&home)
        .args(["token", "--clear"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("font_size"));
}

#[test]
fn test_read_against_unreachable_backend_shows_user_message() {
    let home = TempDir::new().unwrap();
    librova(&home)
        .arg("--store")
        .arg(home.path().join("store.json"))
        .args(["--api-base", "http://127.0.0.1:9/api", "-q", "read", "42"])
        .write_stdin("q\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not load this book"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_read_pages_through_a_served_book() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let epub = build_epub(
        &[
            ("Arrival", &["The train pulled in late."][..]),
            ("The Storm", &["Rain fell on the harbor."][..]),
        ],
        TocStyle::Nav,
    );
    Mock::given(method("GET"))
        .and(path("/api/ebook/getebookfile/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/epub+zip")
                .set_body_bytes(epub),
        )
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    let store = home.path().join("store.json");

    let mut cmd = librova(&home);
    cmd.arg("--store")
        .arg(&store)
        .arg("--api-base")
        .arg(format!("{}/api", server.uri()))
        .args(["-q", "read", "42"])
        .write_stdin("go 2\nq\n");
    let output = run(cmd).await;

    output
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Arrival"))
        .stdout(predicate::str::contains("The train pulled in late."))
        .stdout(predicate::str::contains("Rain fell on the harbor."))
        .stdout(predicate::str::contains("[closed]"));
    let saved = std::fs::read_to_string(&store).unwrap();
    assert!(saved.contains("book-42-location"), "got: {saved}");
    assert!(saved.contains("ch2.xhtml#page=1"), "got: {saved}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_read_closes_the_session_when_stdin_is_not_utf8() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let epub = build_epub(
        &[
            ("Arrival", &["The train pulled in late."][..]),
            ("The Storm", &["Rain fell on the harbor."][..]),
        ],
        TocStyle::Nav,
    );
    Mock::given(method("GET"))
        .and(path("/api/ebook/getebookfile/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/epub+zip")
                .set_body_bytes(epub),
        )
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    let store = home.path().join("store.json");

    let mut cmd = librova(&home);
    cmd.arg("--store")
        .arg(&store)
        .arg("--api-base")
        .arg(format!("{}/api", server.uri()))
        .args(["-q", "read", "42"])
        .write_stdin(b"go 2\n\xff\xfe\n".to_vec());
    let output = run(cmd).await;

    output
        .assert()
        .failure()
        .stdout(predicate::str::contains("Rain fell on the harbor."))
        .stdout(predicate::str::contains("[closed]"));
    let saved = std::fs::read_to_string(&store).unwrap();
    assert!(saved.contains("ch2.xhtml#page=1"), "got: {saved}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_download_writes_epub_to_output_dir() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let epub = build_epub(&[("Only", &["Text."][..])], TocStyle::None);
    Mock::given(method("GET"))
        .and(path("/api/ebook/getebookfile/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/epub+zip")
                .set_body_bytes(epub.clone()),
        )
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let mut cmd = librova(&home);
    cmd.arg("--store")
        .arg(home.path().join("store.json"))
        .arg("--api-base")
        .arg(format!("{}/api", server.uri()))
        .args(["-q", "download", "42", "-o"])
        .arg(out.path());
    let output = run(cmd).await;

    output.assert().success();
    assert_eq!(std::fs::read(out.path().join("42.epub")).unwrap(), epub);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_download_of_non_epub_blames_publisher() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/api/ebook/getebookfile/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/pdf")
                .set_body_bytes(b"%PDF-1.7".to_vec()),
        )
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let mut cmd = librova(&home);
    cmd.arg("--store")
        .arg(home.path().join("store.json"))
        .arg("--api-base")
        .arg(format!("{}/api", server.uri()))
        .args(["-q", "download", "42", "-o"])
        .arg(out.path());
    let output = run(cmd).await;

    output
        .assert()
        .failure()
        .stderr(predicate::str::contains("publisher"));
    assert!(!out.path().join("42.epub").exists());
}
