//! プロセス全体で共有するロガー
//!
//! ライブラリ利用側が `Logger` を持ち回らずに済むようにするための薄い層。
//! `init` は起動時に一度だけ呼ぶ想定。呼ばれないまま使われた場合は
//! info しきい値・標準エラー出力の既定ロガーになる。

use crate::error::{InitError, LoggedError};
use crate::format::Arg;
use crate::logger::Logger;
use crate::severity::Severity;
use serde::Serialize;
use std::sync::OnceLock;

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// グローバルロガーを設定する（一度だけ）
pub fn init(logger: Logger) -> Result<(), InitError> {
    GLOBAL
        .set(logger)
        .map_err(|_| InitError::AlreadyInitialized)
}

/// グローバルロガーを取得
pub fn logger() -> &'static Logger {
    GLOBAL.get_or_init(Logger::default)
}

pub fn set_threshold(threshold: Severity) {
    logger().set_threshold(threshold);
}

pub fn trace(format: &str, args: &[Arg]) -> LoggedError {
    logger().trace(format, args)
}

pub fn debug(format: &str, args: &[Arg]) -> LoggedError {
    logger().debug(format, args)
}

pub fn info(format: &str, args: &[Arg]) -> LoggedError {
    logger().info(format, args)
}

pub fn warn(format: &str, args: &[Arg]) -> LoggedError {
    logger().warn(format, args)
}

pub fn error(format: &str, args: &[Arg]) -> LoggedError {
    logger().error(format, args)
}

pub fn fatal(format: &str, args: &[Arg]) -> ! {
    logger().fatal(format, args)
}

pub fn trace_json<T: Serialize + ?Sized>(value: &T, prefix: &str) {
    logger().trace_json(value, prefix);
}

pub fn debug_json<T: Serialize + ?Sized>(value: &T, prefix: &str) {
    logger().debug_json(value, prefix);
}

pub fn info_json<T: Serialize + ?Sized>(value: &T, prefix: &str) {
    logger().info_json(value, prefix);
}

pub fn warn_json<T: Serialize + ?Sized>(value: &T, prefix: &str) {
    logger().warn_json(value, prefix);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::logger::tests::{body, Capture};
    use serde_json::json;

    // グローバル状態は1回しか初期化できないため、1つのテストにまとめる
    #[test]
    fn test_global_logger_lifecycle() {
        let capture = Capture::default();
        init(Logger::with_writer(Severity::Info, capture.clone())).unwrap();

        assert!(matches!(
            init(Logger::default()),
            Err(InitError::AlreadyInitialized)
        ));
        assert!(std::ptr::eq(logger(), logger()));

        debug("見えない", &[]);
        let err = warn("x=%d", &args![5]);
        assert_eq!(err.to_string(), "x=5");

        set_threshold(Severity::Trace);
        trace("t", &[]);
        info("i", &[]);
        error("e", &[]);
        info_json(&json!({"k": "v"}), "obj");

        set_threshold(Severity::Error);
        warn_json(&json!(1), "hidden");
        debug_json(&json!(1), "hidden");
        trace_json(&json!(1), "hidden");

        let lines = capture.lines();
        let bodies: Vec<&str> = lines.iter().map(|l| body(l)).collect();
        assert_eq!(
            bodies[..5],
            ["WARN: x=5", "TRACE: t", "INFO: i", "ERROR: e", "INFO: obj {"]
        );
        assert_eq!(lines[5], r#"    "k": "v""#);
        assert_eq!(lines[6], "}");
        assert_eq!(lines.len(), 7);
    }
}
