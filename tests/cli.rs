//! lvlog バイナリの結合テスト
//!
//! fatal による終了ステータスはプロセス内では確認できないため、
//! ビルド済みバイナリを起動して確かめる。

use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn lvlog(temp_dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lvlog"))
        .arg("--config")
        .arg(temp_dir.path().join("config.toml"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to spawn lvlog")
}

fn stderr_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_fatal_exits_with_status_one() {
    let temp_dir = TempDir::new().unwrap();
    let output = lvlog(&temp_dir, &["fatal", "boom %d", "7"]);

    assert_eq!(output.status.code(), Some(1));
    let lines = stderr_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines.iter().filter(|l| l.contains("FATAL:")).count(), 1);
    assert!(lines[0].ends_with("FATAL: boom 7"));
}

#[test]
fn test_fatal_exits_even_with_high_threshold() {
    let temp_dir = TempDir::new().unwrap();
    let output = lvlog(&temp_dir, &["--level", "fatal", "fatal", "bye"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_lines(&output)[0].ends_with("FATAL: bye"));
}

#[test]
fn test_log_at_fatal_level_also_exits() {
    let temp_dir = TempDir::new().unwrap();
    let output = lvlog(&temp_dir, &["log", "FATAL", "via log"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_lines(&output)[0].ends_with("FATAL: via log"));
}

#[test]
fn test_threshold_filters_output() {
    let temp_dir = TempDir::new().unwrap();

    let output = lvlog(&temp_dir, &["--level", "warn", "log", "info", "hidden"]);
    assert!(output.status.success());
    assert!(stderr_lines(&output).is_empty());

    let output = lvlog(&temp_dir, &["--level", "warn", "log", "error", "x=%d", "5"]);
    assert!(output.status.success());
    let lines = stderr_lines(&output);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("ERROR: x=5"));
}

#[test]
fn test_threshold_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("config.toml"), r#"level = "error""#).unwrap();

    let output = lvlog(&temp_dir, &["log", "warn", "hidden"]);
    assert!(output.status.success());
    assert!(stderr_lines(&output).is_empty());

    // CLIが設定ファイルより優先
    let output = lvlog(&temp_dir, &["--level", "trace", "log", "warn", "shown"]);
    assert!(stderr_lines(&output)[0].ends_with("WARN: shown"));
}

#[test]
fn test_level_command_prints_rank() {
    let temp_dir = TempDir::new().unwrap();

    for name in ["WARN", "warn", "Warn"] {
        let output = lvlog(&temp_dir, &["level", name]);
        assert_eq!(String::from_utf8_lossy(&output.stdout), "3\n");
    }

    let output = lvlog(&temp_dir, &["level", "bogus"]);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "2\n");
}

#[test]
fn test_json_command_pretty_prints() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("payload.json");
    fs::write(&path, r#"{"a":1}"#).unwrap();

    let output = lvlog(
        &temp_dir,
        &["json", "info", "payload", "--file", path.to_str().unwrap()],
    );

    assert!(output.status.success());
    let lines = stderr_lines(&output);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("INFO: payload {"));
    assert_eq!(lines[1], r#"    "a": 1"#);
    assert_eq!(lines[2], "}");
}
