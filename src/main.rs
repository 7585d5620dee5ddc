//! lvlog - レベル別ロガーのコマンドラインフロントエンド

mod cli;

use anyhow::Result;

fn main() -> Result<()> {
    lvlog::logging::init();
    cli::run()
}
