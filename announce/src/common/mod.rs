//! 共通型定義

/// エラー型
pub mod error;

/// IPアドレスユーティリティ
pub mod ip;

/// 登録エントリ
pub mod types;
