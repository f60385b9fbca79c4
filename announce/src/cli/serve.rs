//! serve サブコマンド
//!
//! レジストリサーバーを起動します。

use crate::clock::SystemClock;
use crate::config::{
    get_database_url, get_env_with_fallback_or, get_env_with_fallback_parse, ProtocolVersion,
    RegistryConfig, TrustMode,
};
use crate::db::migrations::initialize_database;
use crate::shutdown::ShutdownController;
use crate::{server, AppState};
use clap::Args;
use std::sync::Arc;
use tracing::info;

/// デフォルトの待ち受けポート
pub const DEFAULT_PORT: u16 = 8080;

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "ANNOUNCE_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "ANNOUNCE_HOST")]
    pub host: String,

    /// Database URL
    #[arg(long, env = "ANNOUNCE_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Protocol version (overrides ANNOUNCE_PROTOCOL)
    #[arg(long, value_enum)]
    pub protocol: Option<ProtocolVersion>,

    /// Declared address trust mode (overrides ANNOUNCE_TRUST_MODE)
    #[arg(long, value_enum)]
    pub trust_mode: Option<TrustMode>,

    /// Entry lifetime in seconds (overrides ANNOUNCE_TTL_SECS)
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
    pub ttl_secs: Option<i64>,
}

impl ServeArgs {
    /// サブコマンド無しで起動された場合の引数（環境変数のみ）
    pub fn from_env() -> Self {
        Self {
            port: get_env_with_fallback_parse("ANNOUNCE_PORT", "PORT", DEFAULT_PORT),
            host: get_env_with_fallback_or("ANNOUNCE_HOST", "HOST", "0.0.0.0"),
            database_url: None,
            protocol: None,
            trust_mode: None,
            ttl_secs: None,
        }
    }

    /// バインドアドレス
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 環境変数の設定にコマンドライン引数を上書きする
    pub fn registry_config(&self, base: RegistryConfig) -> RegistryConfig {
        RegistryConfig {
            ttl_secs: self.ttl_secs.unwrap_or(base.ttl_secs),
            protocol: self.protocol.unwrap_or(base.protocol),
            trust_mode: self.trust_mode.unwrap_or(base.trust_mode),
            ..base
        }
    }
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs) -> Result<(), anyhow::Error> {
    let database_url = args.database_url.clone().unwrap_or_else(get_database_url);
    let registry_config = args.registry_config(RegistryConfig::from_env());

    info!(
        database_url = %database_url,
        protocol = %registry_config.protocol,
        trust_mode = %registry_config.trust_mode,
        ttl_secs = registry_config.ttl_secs,
        "Starting announce registry"
    );

    let db_pool = initialize_database(&database_url).await?;
    let state = AppState {
        db_pool,
        clock: Arc::new(SystemClock),
        registry_config,
    };

    server::run(state, &args.bind_addr(), ShutdownController::default()).await?;
    Ok(())
}
