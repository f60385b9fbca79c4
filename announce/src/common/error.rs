//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! ワイヤ上では全エラーが同じ `400 Bad Request` になり、
//! 区別はメッセージ本文のみで行う。

use axum::http::StatusCode;
use thiserror::Error;

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IP address parse error
    #[error("IP address parse error: {0}")]
    IpAddrParse(#[from] std::net::AddrParseError),

    /// Validation error
    #[error("{0}")]
    Validation(String),
}

/// announce error type
#[derive(Debug, Error)]
pub enum AnnounceError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Http(String),
}

impl AnnounceError {
    /// 検証エラーを生成する
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Common(CommonError::Validation(message.into()))
    }

    /// 検証エラーかどうか
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Common(CommonError::Validation(_)))
    }

    /// Returns the HTTP status code for this error.
    ///
    /// 検証エラーもストレージエラーも同じクライアントエラーとして返す。
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

/// Result type alias (Common)
pub type CommonResult<T> = Result<T, CommonError>;

/// Result type alias (announce)
pub type AnnounceResult<T> = Result<T, AnnounceError>;
