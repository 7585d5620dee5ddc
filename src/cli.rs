//! CLIモジュール

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lvlog::config::{CliArgs, Config};
use lvlog::{get_log_level, global, Arg, Logger, Severity};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::debug;

/// lvlog - レベル別ロガー
#[derive(Parser, Debug)]
#[command(name = "lvlog")]
#[command(about = "しきい値フィルタ付きのレベル別ロガー", long_about = None)]
pub struct Cli {
    /// 出力しきい値（trace/debug/info/warn/error/fatal）
    #[arg(short, long, global = true)]
    pub level: Option<String>,

    /// 設定ファイルパス
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// サブコマンド
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// メッセージを整形して出力
    Log {
        /// レベル名（未知の名前は info）
        #[arg(id = "log_level", value_name = "LEVEL")]
        level: String,

        /// printf形式の書式文字列
        format: String,

        /// 書式に埋め込む引数
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// JSONを整形して出力
    Json {
        /// レベル
        #[arg(id = "json_level", value_name = "LEVEL", ignore_case = true)]
        level: JsonLevel,

        /// JSONの前に付ける接頭辞
        prefix: String,

        /// JSONファイル（省略時は標準入力）
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// fatalメッセージを出力して終了（終了ステータス1）
    Fatal {
        /// printf形式の書式文字列
        format: String,

        /// 書式に埋め込む引数
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// レベル名に対応するランクを表示
    Level {
        /// レベル名
        name: String,
    },
}

/// JSON出力に使えるレベル
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum JsonLevel {
    Trace,
    Debug,
    Info,
    Warn,
}

/// CLIエントリポイント
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&CliArgs {
        level: cli.level.clone(),
        config: cli.config.clone(),
    })?;
    global::init(Logger::new(config.level))?;

    execute(cli.command, global::logger(), &mut io::stdout())
}

/// サブコマンドを実行
pub fn execute(command: Commands, logger: &Logger, stdout: &mut impl Write) -> Result<()> {
    match command {
        Commands::Log {
            level,
            format,
            args,
        } => {
            let severity = Severity::parse_lenient(&level);
            debug!("{} レベルで出力します", severity);
            logger.log(severity, &format, &infer_args(&args));
        }
        Commands::Json {
            level,
            prefix,
            file,
        } => {
            let text = match file {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("JSONファイルを読めません: {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    io::stdin()
                        .read_to_string(&mut buf)
                        .context("標準入力を読めません")?;
                    buf
                }
            };
            let value: serde_json::Value =
                serde_json::from_str(&text).context("入力がJSONとして不正です")?;
            match level {
                JsonLevel::Trace => logger.trace_json(&value, &prefix),
                JsonLevel::Debug => logger.debug_json(&value, &prefix),
                JsonLevel::Info => logger.info_json(&value, &prefix),
                JsonLevel::Warn => logger.warn_json(&value, &prefix),
            }
        }
        Commands::Fatal { format, args } => {
            logger.fatal(&format, &infer_args(&args));
        }
        Commands::Level { name } => {
            writeln!(stdout, "{}", get_log_level(&name))?;
        }
    }

    Ok(())
}

fn infer_args(raw: &[String]) -> Vec<Arg> {
    raw.iter().map(|a| Arg::infer(a)).collect()
}
