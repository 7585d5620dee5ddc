//! ロガーモジュール
//!
//! しきい値フィルタと1本の出力ストリームへの書き込みを担う。
//! 出力形式は `YYYY/MM/DD HH:MM:SS TAG: message` の1行。

use crate::error::LoggedError;
use crate::format::{sprintf, Arg};
use crate::severity::Severity;

use chrono::Local;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fmt;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::process;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, PoisonError};

/// タイムスタンプ形式
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// JSON出力のインデント（スペース4つ）
const JSON_INDENT: &[u8] = b"    ";

/// fatal時の終了ステータス
const FATAL_EXIT_CODE: i32 = 1;

type ShutdownHook = Box<dyn Fn() + Send + Sync>;

/// レベル別ロガー
///
/// しきい値は構築時に注入する。実行中の変更もアトミックに行えるが、
/// 起動時に一度だけ設定する使い方を想定している。
pub struct Logger {
    threshold: AtomicU8,
    out: Mutex<Box<dyn Write + Send>>,
    shutdown_hook: Option<ShutdownHook>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(Severity::default())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("threshold", &self.threshold.load(Ordering::Relaxed))
            .field("shutdown_hook", &self.shutdown_hook.is_some())
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// 標準エラー出力に書き込むLoggerを作成
    pub fn new(threshold: Severity) -> Self {
        Self::with_writer(threshold, io::stderr())
    }

    /// 任意の出力先に書き込むLoggerを作成
    pub fn with_writer<W>(threshold: Severity, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            threshold: AtomicU8::new(threshold.rank()),
            out: Mutex::new(Box::new(writer)),
            shutdown_hook: None,
        }
    }

    /// fatal時、プロセス終了の直前に実行する処理を登録
    ///
    /// フックが返った後（パニックした場合も）、終了ステータス1で終了する。
    pub fn with_shutdown_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shutdown_hook = Some(Box::new(hook));
        self
    }

    /// 現在のしきい値ランク
    pub fn threshold_rank(&self) -> u8 {
        self.threshold.load(Ordering::Relaxed)
    }

    /// 現在のしきい値（範囲外のランクならNone）
    pub fn threshold(&self) -> Option<Severity> {
        Severity::from_rank(self.threshold_rank())
    }

    pub fn set_threshold(&self, threshold: Severity) {
        self.set_threshold_rank(threshold.rank());
    }

    pub fn set_threshold_rank(&self, rank: u8) {
        self.threshold.store(rank, Ordering::Relaxed);
    }

    /// レベル名からしきい値を設定（未知の名前は info）
    pub fn set_threshold_from_str(&self, name: &str) {
        self.set_threshold(Severity::parse_lenient(name));
    }

    /// 指定の重要度が出力対象かどうか
    pub fn enabled(&self, severity: Severity) -> bool {
        severity.rank() >= self.threshold_rank()
    }

    /// 整形済みメッセージを出力する
    ///
    /// しきい値未満なら何もしない。`Fatal` は書き込み後にプロセスを終了する。
    pub fn emit(&self, severity: Severity, message: &str) {
        self.emit_rank(severity.rank(), message);
    }

    /// ランク指定でメッセージを出力する
    ///
    /// 既知のランク以外はタグを付けずにそのまま書き込む。
    pub fn emit_rank(&self, rank: u8, message: &str) {
        if rank < self.threshold_rank() {
            return;
        }

        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        let line = match Severity::from_rank(rank) {
            Some(severity) => format!("{} {}: {}\n", timestamp, severity.tag(), message),
            None => format!("{} {}\n", timestamp, message),
        };
        self.write_line(&line);

        if rank == Severity::Fatal.rank() {
            self.terminate();
        }
    }

    /// メッセージを整形して出力し、同じ内容をエラー値として返す
    pub fn log(&self, severity: Severity, format: &str, args: &[Arg]) -> LoggedError {
        let message = sprintf(format, args);
        self.emit(severity, &message);
        LoggedError::new(severity, message)
    }

    pub fn trace(&self, format: &str, args: &[Arg]) -> LoggedError {
        self.log(Severity::Trace, format, args)
    }

    pub fn debug(&self, format: &str, args: &[Arg]) -> LoggedError {
        self.log(Severity::Debug, format, args)
    }

    pub fn info(&self, format: &str, args: &[Arg]) -> LoggedError {
        self.log(Severity::Info, format, args)
    }

    pub fn warn(&self, format: &str, args: &[Arg]) -> LoggedError {
        self.log(Severity::Warn, format, args)
    }

    pub fn error(&self, format: &str, args: &[Arg]) -> LoggedError {
        self.log(Severity::Error, format, args)
    }

    /// fatalメッセージを整形・出力してプロセスを終了する
    pub fn fatal(&self, format: &str, args: &[Arg]) -> ! {
        self.fatal_and_exit(&sprintf(format, args))
    }

    /// fatalメッセージを出力してプロセスを終了する
    ///
    /// 書き込みに失敗しても、しきい値で抑制されても終了する。
    pub fn fatal_and_exit(&self, message: &str) -> ! {
        self.emit_rank(Severity::Fatal.rank(), message);
        self.terminate()
    }

    /// 値をJSONに変換し、接頭辞付きで出力する
    ///
    /// 変換に失敗した場合は元のレコードは出力せず、失敗内容を
    /// error レベルで出力する。fatal 用のJSON出力はない。
    fn json<T>(&self, severity: Severity, value: &T, prefix: &str)
    where
        T: Serialize + ?Sized,
    {
        debug_assert!(severity < Severity::Fatal);
        match to_pretty_json(value) {
            Ok(text) => self.emit(severity, &format!("{} {}", prefix, text)),
            Err(e) => self.emit(Severity::Error, &e.to_string()),
        }
    }

    pub fn trace_json<T: Serialize + ?Sized>(&self, value: &T, prefix: &str) {
        self.json(Severity::Trace, value, prefix);
    }

    pub fn debug_json<T: Serialize + ?Sized>(&self, value: &T, prefix: &str) {
        self.json(Severity::Debug, value, prefix);
    }

    pub fn info_json<T: Serialize + ?Sized>(&self, value: &T, prefix: &str) {
        self.json(Severity::Info, value, prefix);
    }

    pub fn warn_json<T: Serialize + ?Sized>(&self, value: &T, prefix: &str) {
        self.json(Severity::Warn, value, prefix);
    }

    /// 出力ストリームに1行書き込む（失敗は無視）
    fn write_line(&self, line: &str) {
        // 他スレッドのパニックで汚染されていても書き込みは続ける
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = out.write_all(line.as_bytes());
        let _ = out.flush();
    }

    fn terminate(&self) -> ! {
        if let Some(hook) = &self.shutdown_hook {
            let _ = panic::catch_unwind(AssertUnwindSafe(|| hook()));
        }
        process::exit(FATAL_EXIT_CODE)
    }
}

/// 値をインデント4のJSON文字列に変換
///
/// キーの並び順は値自身の順序に従う（並べ替えない）。
pub fn to_pretty_json<T>(value: &T) -> Result<String, serde_json::Error>
where
    T: Serialize + ?Sized,
{
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(JSON_INDENT));
    value.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
