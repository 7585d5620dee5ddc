//! 内部診断ログ初期化モジュール
//!
//! `lvlog` バイナリ自身の診断（設定読み込みなど）を tracing で出す。
//! ロガーが書き込むレコードとは別物で、既定では warn 以上しか出さない。

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// RUST_LOG 未設定時のフィルタ
const DEFAULT_FILTER: &str = "warn";

/// 診断ログを初期化
///
/// RUST_LOG環境変数でレベルを設定可能（例: `RUST_LOG=lvlog=debug`）。
/// 二重に呼ばれても失敗しない。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        init();
        init();
        tracing::debug!("診断ログ");
    }
}
