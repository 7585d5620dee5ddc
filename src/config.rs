//! 設定モジュール
//!
//! ロガー本体は設定ファイルを読まない。このモジュールは組み込み側
//! （`lvlog` バイナリ）がしきい値を決めるために使う。

use crate::error::ConfigError;
use crate::severity::Severity;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// アプリケーション設定
#[derive(Debug, Clone)]
pub struct Config {
    /// 出力しきい値
    pub level: Severity,
    /// 設定ファイルパス
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: Severity::default(),
            config_path: default_config_path(),
        }
    }
}

/// TOML設定ファイル用構造体
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    level: Option<Severity>,
}

/// CLI引数
#[derive(Debug, Default)]
pub struct CliArgs {
    pub level: Option<String>,
    pub config: Option<PathBuf>,
}

/// 既定の設定ファイルパス（~/.lvlog/config.toml）
pub fn default_config_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".lvlog").join("config.toml")
}

impl Config {
    /// 設定を読み込む
    ///
    /// 優先順位: CLI引数 > 設定ファイル > デフォルト値
    pub fn load(cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        if let Some(ref path) = cli_args.config {
            config.config_path = path.clone();
        }

        // 設定ファイルがなければデフォルトのまま
        if let Some(file_config) = read_file_config(&config.config_path)? {
            config.merge_file_config(&file_config);
        }

        config.merge_cli_args(cli_args);

        debug!("ログレベル: {}", config.level);
        Ok(config)
    }

    /// ファイル設定をマージ
    fn merge_file_config(&mut self, file_config: &FileConfig) {
        if let Some(level) = file_config.level {
            self.level = level;
        }
    }

    /// CLI引数をマージ
    fn merge_cli_args(&mut self, cli_args: &CliArgs) {
        if let Some(ref level) = cli_args.level {
            self.level = Severity::parse_lenient(level);
        }
    }
}

fn read_file_config(path: &Path) -> Result<Option<FileConfig>, ConfigError> {
    if !path.exists() {
        debug!("設定ファイルなし: {}", path.display());
        return Ok(None);
    }

    debug!("設定ファイルを読み込みます: {}", path.display());
    let content = fs::read_to_string(path)?;
    let file_config: FileConfig = toml::from_str(&content)?;
    Ok(Some(file_config))
}
