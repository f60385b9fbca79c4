//! テスト共通ユーティリティ

pub mod http;

use std::net::SocketAddr;
use std::sync::Arc;

use announce::clock::ManualClock;
use announce::config::RegistryConfig;
use announce::{api, AppState};
use axum::extract::connect_info::MockConnectInfo;
use axum::Router;
use sqlx::SqlitePool;

/// テスト用の接続元アドレス
pub const TEST_PEER: &str = "10.0.0.1:50000";

/// テスト用のSQLiteデータベースプールを作成する
pub async fn create_test_db_pool() -> SqlitePool {
    let pool = create_empty_db_pool().await;

    // マイグレーションを実行
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// テーブルが存在しないSQLiteデータベースプールを作成する
#[allow(dead_code)]
pub async fn create_empty_db_pool() -> SqlitePool {
    SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory SQLite pool")
}

/// 手動時計を使うアプリケーション状態を作成する
pub fn create_test_state(db_pool: SqlitePool, clock: &ManualClock, config: RegistryConfig) -> AppState {
    AppState {
        db_pool,
        clock: Arc::new(clock.clone()),
        registry_config: config,
    }
}

/// テスト用のルーターを作成する（.oneshot()スタイルのテスト用）
///
/// 接続元アドレスは `TEST_PEER` に固定される。
#[allow(dead_code)]
pub fn create_test_app(state: AppState) -> Router {
    let peer: SocketAddr = TEST_PEER.parse().expect("valid test peer");
    api::create_app(state).layer(MockConnectInfo(peer))
}
