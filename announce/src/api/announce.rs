//! 登録APIハンドラー
//!
//! `GET /announce?action=<name>&...` の1エンドポイントで全操作を受け付ける。
//!
//! | action   | 応答 |
//! |----------|------|
//! | `getip`  | `state=ip\nip=<検出IP>\nremoteip=<接続元IP>` |
//! | `list`   | `state=list\n<addr>\|<time>[\|<info>]\n`... |
//! | `blist`  | 6バイトレコードの連結（ヘッダー無し） |
//! | `add`    | `state=added` |
//! | `remove` | `state=deleted` |
//! | `clear`  | `state=ok` |

use crate::api::error::AppError;
use crate::codec::{encode_binary_list, encode_text_list, state_line};
use crate::common::error::{AnnounceError, AnnounceResult};
use crate::registry::Registry;
use crate::resolver::{detected_identity, observed_identity, AddressResolver};
use crate::AppState;
use axum::{
    extract::{ConnectInfo, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use tracing::debug;

/// 操作種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// 検出IPと接続元IPを返す
    GetIp,
    /// 生存中エントリをテキストで返す
    List,
    /// 生存中エントリをバイナリで返す
    BinaryList,
    /// エントリを登録・更新する
    Add,
    /// エントリを削除する
    Remove,
    /// テーブルを作り直す
    Clear,
}

impl Action {
    /// ワイヤ上の名前
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetIp => "getip",
            Self::List => "list",
            Self::BinaryList => "blist",
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Clear => "clear",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AnnounceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "getip" => Ok(Self::GetIp),
            "list" => Ok(Self::List),
            "blist" => Ok(Self::BinaryList),
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            "clear" => Ok(Self::Clear),
            _ => Err(AnnounceError::validation("invalid action")),
        }
    }
}

/// トランスポートから切り離したリクエスト
#[derive(Debug, Clone)]
pub struct ActionRequest {
    /// クエリ引数（`action` を含む）
    pub params: HashMap<String, String>,
    /// 転送ヘッダー考慮後のクライアントIP
    pub detected: IpAddr,
    /// 接続元IP
    pub observed: IpAddr,
}

/// 成功応答
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `text/plain`
    Text(String),
    /// `application/octet-stream`
    Binary(Vec<u8>),
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Text(body) => (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/plain"),
                    (header::CONNECTION, "close"),
                ],
                body,
            )
                .into_response(),
            Reply::Binary(body) => (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/octet-stream"),
                    (header::CONNECTION, "close"),
                ],
                body,
            )
                .into_response(),
        }
    }
}

/// GET /announce - 全操作の入口
pub async fn announce(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Reply, AppError> {
    let request = ActionRequest {
        detected: detected_identity(&headers, &peer),
        observed: observed_identity(&peer),
        params,
    };
    Ok(dispatch(&state, &request).await?)
}

/// 操作を実行する
///
/// エントリを読み書きする操作は、必ず先に期限切れエントリを削除する。
/// 引数の検証はストレージに触れる前に行う。
pub async fn dispatch(state: &AppState, request: &ActionRequest) -> AnnounceResult<Reply> {
    let action: Action = request
        .params
        .get("action")
        .map(String::as_str)
        .unwrap_or_default()
        .parse()?;
    debug!(%action, detected = %request.detected, observed = %request.observed, "Handling action");

    let config = &state.registry_config;
    let resolver = AddressResolver::new(config);
    let registry = Registry::new(&state.db_pool, state.clock.as_ref(), config.ttl_secs);

    match action {
        Action::GetIp => Ok(Reply::Text(format!(
            "{}\nip={}\nremoteip={}",
            state_line("ip"),
            request.detected,
            request.observed
        ))),
        Action::List => {
            registry.evict_expired(registry.now()).await?;
            let entries = registry.list().await?;
            Ok(Reply::Text(encode_text_list(&entries, config.protocol)))
        }
        Action::BinaryList => {
            registry.evict_expired(registry.now()).await?;
            let entries = registry.list().await?;
            Ok(Reply::Binary(encode_binary_list(&entries)))
        }
        Action::Add => {
            let address = resolver.resolve_address(&request.params, request.detected)?;
            let info = resolver.resolve_info(&request.params)?;
            let now = registry.now();
            registry.evict_expired(now).await?;
            registry.upsert(&address, info, now).await?;
            Ok(Reply::Text(state_line("added")))
        }
        Action::Remove => {
            let address = resolver.resolve_address(&request.params, request.detected)?;
            registry.evict_expired(registry.now()).await?;
            registry.remove(&address).await?;
            Ok(Reply::Text(state_line("deleted")))
        }
        Action::Clear => {
            registry.clear().await?;
            Ok(Reply::Text(state_line("ok")))
        }
    }
}
