//! エラー型定義モジュール

use crate::severity::Severity;
use std::io;
use thiserror::Error;

/// ログ出力済みのメッセージを表すエラー
///
/// レベル関数が返す値。表示文字列は出力したメッセージと同一なので、
/// 呼び出し側はそのままアプリケーションエラーとして伝播できる。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct LoggedError {
    severity: Severity,
    message: String,
}

impl LoggedError {
    /// 新しいLoggedErrorを作成
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    /// 出力時の重要度
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// 整形済みメッセージ
    pub fn message(&self) -> &str {
        &self.message
    }

    /// メッセージを取り出す
    pub fn into_message(self) -> String {
        self.message
    }
}

/// レベル名の厳密な解析エラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("不明なログレベル: {0}")]
pub struct ParseSeverityError(pub String);

/// 設定エラー
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IOエラー: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML解析エラー: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// グローバルロガー初期化エラー
#[derive(Error, Debug)]
pub enum InitError {
    #[error("グローバルロガーは既に初期化されています")]
    AlreadyInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logged_error_display_is_message() {
        let err = LoggedError::new(Severity::Warn, "x=5");
        assert_eq!(err.to_string(), "x=5");
        assert_eq!(err.severity(), Severity::Warn);
        assert_eq!(err.message(), "x=5");
    }

    #[test]
    fn test_logged_error_into_anyhow() {
        fn fails() -> anyhow::Result<()> {
            Err(LoggedError::new(Severity::Error, "接続失敗"))?;
            Ok(())
        }
        let err = fails().unwrap_err();
        assert_eq!(err.to_string(), "接続失敗");
        assert!(err.downcast_ref::<LoggedError>().is_some());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::IoError(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "permission denied",
        ));
        assert!(err.to_string().contains("IOエラー"));
    }

    #[test]
    fn test_init_error_display() {
        let err = InitError::AlreadyInitialized;
        assert!(err.to_string().contains("既に初期化"));
    }
}
