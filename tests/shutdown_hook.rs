//! fatal 時のシャットダウンフックの結合テスト
//!
//! フック実行後にプロセスが終了するため、テストバイナリ自身を
//! 子プロセスとして起動し直して確かめる。

use lvlog::{args, Logger, Severity};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// 子プロセスの動作モード（"write" または "panic"）
const CHILD_MODE: &str = "LVLOG_SHUTDOWN_CHILD";
/// フックが書き込むファイル
const MARKER_PATH: &str = "LVLOG_SHUTDOWN_MARKER";

/// 子プロセスとして起動された場合はfatalで終了する
fn run_child_if_requested() {
    let Ok(mode) = env::var(CHILD_MODE) else {
        return;
    };
    let marker = PathBuf::from(env::var(MARKER_PATH).unwrap());

    let logger = Logger::new(Severity::Info).with_shutdown_hook(move || {
        fs::write(&marker, "hook ran").unwrap();
        if mode == "panic" {
            panic!("シャットダウン処理に失敗");
        }
    });
    logger.fatal("shutting down %s", &args!["now"]);
}

fn spawn_child(test_name: &str, mode: &str, marker: &Path) -> Output {
    Command::new(env::current_exe().unwrap())
        .args([test_name, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_MODE, mode)
        .env(MARKER_PATH, marker)
        .output()
        .expect("failed to spawn child test process")
}

fn fatal_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .filter(|l| l.contains("FATAL:"))
        .map(str::to_string)
        .collect()
}

#[test]
fn test_shutdown_hook_runs_before_exit() {
    run_child_if_requested();

    let temp_dir = TempDir::new().unwrap();
    let marker = temp_dir.path().join("hook_ran");
    let output = spawn_child("test_shutdown_hook_runs_before_exit", "write", &marker);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(fs::read_to_string(&marker).unwrap(), "hook ran");
    let lines = fatal_lines(&output);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("FATAL: shutting down now"));
}

#[test]
fn test_panicking_shutdown_hook_still_exits() {
    run_child_if_requested();

    let temp_dir = TempDir::new().unwrap();
    let marker = temp_dir.path().join("hook_ran");
    let output = spawn_child("test_panicking_shutdown_hook_still_exits", "panic", &marker);

    assert_eq!(output.status.code(), Some(1));
    assert!(marker.exists());
    assert_eq!(fatal_lines(&output).len(), 1);
}
