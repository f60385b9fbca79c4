//! ロギング初期化ユーティリティ
//!
//! `ANNOUNCE_LOG_LEVEL`（旧: `RUST_LOG`）でフィルタを指定する。
//! `ANNOUNCE_LOG_DIR` が設定されていれば日次ローテーションのファイルにも出力する。

use crate::config::{get_env_with_fallback, get_env_with_fallback_or};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログファイル名のプレフィックス
pub const LOG_FILE_PREFIX: &str = "announce.log";

/// tracingサブスクライバーを初期化する
pub fn init() -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(log_level())?;

    let file_layer = log_dir().map(|dir| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()?;

    Ok(())
}

/// ログレベル（EnvFilter構文）
pub fn log_level() -> String {
    get_env_with_fallback_or("ANNOUNCE_LOG_LEVEL", "RUST_LOG", "info")
}

/// ログ出力ディレクトリ
pub fn log_dir() -> Option<PathBuf> {
    get_env_with_fallback("ANNOUNCE_LOG_DIR", "LOG_DIR").map(PathBuf::from)
}
