//! Configuration management via environment variables
//!
//! Provides helper functions for reading environment variables with fallback
//! to deprecated variable names with warning logs, and the registry settings
//! built on top of them.

use crate::common::error::CommonError;
use std::fmt;
use std::str::FromStr;

/// Default time-to-live of an entry, in seconds.
pub const DEFAULT_TTL_SECS: i64 = 60;

/// Default upper bound for `info` in the validated protocol.
pub const DEFAULT_MAX_INFO_LEN: usize = 255;

/// Default database location.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:data/announce.db";

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use announce::config::get_env_with_fallback;
///
/// let url = get_env_with_fallback("ANNOUNCE_DATABASE_URL", "DATABASE_URL");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Falls back to `default` if neither is set or parsing fails.
pub fn get_env_with_fallback_parse<T: FromStr>(new_name: &str, old_name: &str, default: T) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// データベースURLを取得
///
/// 環境変数 `ANNOUNCE_DATABASE_URL`（旧: `DATABASE_URL`）から取得し、
/// 未設定の場合は `sqlite:data/announce.db` を返す。
pub fn get_database_url() -> String {
    get_env_with_fallback_or("ANNOUNCE_DATABASE_URL", "DATABASE_URL", DEFAULT_DATABASE_URL)
}

/// プロトコルバージョン
///
/// 検証の厳しさ・登録キーの決め方・テキストリストの形が版ごとに異なる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ProtocolVersion {
    /// 旧プロトコル: `port` 引数と検出IPからキーを作り、`port`/`info` を検証する。
    /// リスト行は `address|time|`。
    V1,
    /// 現行プロトコル: `address` 引数をそのままキーにする。`info` は無検証。
    /// リスト行は `address|time[|info]`。
    #[default]
    V2,
}

impl ProtocolVersion {
    /// 文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolVersion {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(Self::V1),
            "v2" | "2" => Ok(Self::V2),
            other => Err(CommonError::Config(format!(
                "unknown protocol version: {}",
                other
            ))),
        }
    }
}

/// 申告アドレスの信頼モード（V2のみ有効）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TrustMode {
    /// クライアントが申告した `address` をそのまま受け入れる
    #[default]
    Declared,
    /// 申告アドレスのホスト部が検出IPと一致する場合のみ受け入れる
    Verified,
}

impl TrustMode {
    /// 文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Declared => "declared",
            Self::Verified => "verified",
        }
    }
}

impl fmt::Display for TrustMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrustMode {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "declared" => Ok(Self::Declared),
            "verified" => Ok(Self::Verified),
            other => Err(CommonError::Config(format!("unknown trust mode: {}", other))),
        }
    }
}

/// レジストリ設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// エントリの有効期間（秒）
    pub ttl_secs: i64,
    /// プロトコルバージョン
    pub protocol: ProtocolVersion,
    /// 申告アドレスの信頼モード
    pub trust_mode: TrustMode,
    /// V1で許可する `info` の最大長
    pub max_info_len: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
            protocol: ProtocolVersion::default(),
            trust_mode: TrustMode::default(),
            max_info_len: DEFAULT_MAX_INFO_LEN,
        }
    }
}

impl RegistryConfig {
    /// Load registry configuration from environment variables.
    ///
    /// 解釈できない値は警告を出してデフォルトに戻す。
    pub fn from_env() -> Self {
        let ttl_secs = get_env_with_fallback_parse("ANNOUNCE_TTL_SECS", "TTL_SECS", DEFAULT_TTL_SECS);
        let max_info_len = get_env_with_fallback_parse(
            "ANNOUNCE_MAX_INFO_LEN",
            "MAX_INFO_LEN",
            DEFAULT_MAX_INFO_LEN,
        );
        let protocol = parse_or_default(get_env_with_fallback("ANNOUNCE_PROTOCOL", "PROTOCOL"));
        let trust_mode =
            parse_or_default(get_env_with_fallback("ANNOUNCE_TRUST_MODE", "TRUST_MODE"));

        Self {
            ttl_secs: if ttl_secs > 0 {
                ttl_secs
            } else {
                DEFAULT_TTL_SECS
            },
            protocol,
            trust_mode,
            max_info_len,
        }
    }
}

fn parse_or_default<T>(value: Option<String>) -> T
where
    T: FromStr<Err = CommonError> + Default,
{
    match value.map(|v| v.parse::<T>()) {
        Some(Ok(parsed)) => parsed,
        Some(Err(err)) => {
            tracing::warn!("{}; using default", err);
            T::default()
        }
        None => T::default(),
    }
}
