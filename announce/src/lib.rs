//! Ephemeral announce registry
//!
//! 参加者が自分のアドレスを短時間だけ公開する、自動失効型のレジストリサーバー

#![warn(missing_docs)]

/// 共通型定義（エラー、IP、エントリ）
pub mod common;

/// HTTP APIハンドラー
pub mod api;

/// 時刻ソース
pub mod clock;

/// 一覧のワイヤフォーマット（テキスト／バイナリ）
pub mod codec;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// データベースアクセス
pub mod db;

/// 自動失効レジストリ
pub mod registry;

/// 登録キーの解決
pub mod resolver;

/// ロギング初期化ユーティリティ
pub mod logging;

/// axumサーバー起動
pub mod server;

/// 協調的シャットダウン
pub mod shutdown;

/// CLIインターフェース
pub mod cli;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// データベース接続プール
    pub db_pool: sqlx::SqlitePool,
    /// 現在時刻の取得元
    pub clock: clock::SharedClock,
    /// レジストリ設定
    pub registry_config: config::RegistryConfig,
}
