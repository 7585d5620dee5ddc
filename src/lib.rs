//! lvlog - しきい値フィルタ付きのシンプルなレベル別ロガー
//!
//! メッセージをprintf形式で整形し、しきい値以上の重要度なら
//! `YYYY/MM/DD HH:MM:SS TAG: message` の1行として出力する。
//!
//! ```
//! use lvlog::{args, Logger, Severity};
//!
//! let logger = Logger::with_writer(Severity::Warn, Vec::new());
//! let err = logger.warn("x=%d", &args![5]);
//! assert_eq!(err.to_string(), "x=5");
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod global;
pub mod logger;
pub mod logging;
pub mod severity;

pub use error::LoggedError;
pub use format::{sprintf, Arg};
pub use logger::Logger;
pub use severity::{get_log_level, Severity};
