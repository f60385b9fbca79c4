//! HTTP APIハンドラー

pub mod announce;
pub mod error;

use crate::AppState;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// APIルーターを作成
///
/// 旧クライアント互換のため `/announce.php` も同じハンドラーに向ける。
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/announce", get(announce::announce))
        .route("/announce.php", get(announce::announce))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
