//! データベースアクセス層
//!
//! SQLiteベースのデータ永続化

/// 登録エントリのテーブル操作
pub mod announcements;

/// データベースマイグレーション
pub mod migrations;

/// Repository traitパターン（テスタビリティ向上）
pub mod traits;
