//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use crate::common::error::AnnounceError;
use axum::{
    http::header,
    response::{IntoResponse, Response},
};

/// Axum用のエラーレスポンス型
///
/// 本文は `Error: <message>\n` のプレーンテキスト。
#[derive(Debug)]
pub struct AppError(pub AnnounceError);

impl From<AnnounceError> for AppError {
    fn from(err: AnnounceError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self.0, "Request failed");

        (
            self.0.status_code(),
            [
                (header::CONTENT_TYPE, "text/plain"),
                (header::CONNECTION, "close"),
            ],
            format!("Error: {}\n", self.0),
        )
            .into_response()
    }
}
