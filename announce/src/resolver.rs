//! アドレス解決
//!
//! 登録キーとなるアドレス文字列を、接続情報とクライアントの申告から決める。
//!
//! - 検出アイデンティティ: 転送ヘッダーがあればそれ、無ければ接続元IP
//! - 申告アイデンティティ: V2でクライアントが `address` 引数で渡す文字列
//!
//! V2の申告アドレスはデフォルトでは接続元と照合しない（`TrustMode::Declared`）。

use crate::common::error::{AnnounceError, AnnounceResult};
use crate::common::ip::{client_ip_from_forwarded_headers, host_ip_of, normalize_socket_ip};
use crate::config::{ProtocolVersion, RegistryConfig, TrustMode};
use axum::http::HeaderMap;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

/// クライアントの検出アイデンティティ
///
/// 転送ヘッダー（`X-Forwarded-For` / `Forwarded`）を優先し、無ければ接続元IP。
pub fn detected_identity(headers: &HeaderMap, peer: &SocketAddr) -> IpAddr {
    client_ip_from_forwarded_headers(headers).unwrap_or_else(|| observed_identity(peer))
}

/// トランスポート層で観測された接続元IP
pub fn observed_identity(peer: &SocketAddr) -> IpAddr {
    normalize_socket_ip(peer)
}

/// アドレス解決器
#[derive(Debug, Clone, Copy)]
pub struct AddressResolver {
    protocol: ProtocolVersion,
    trust_mode: TrustMode,
    max_info_len: usize,
}

impl AddressResolver {
    /// 設定から作成
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            protocol: config.protocol,
            trust_mode: config.trust_mode,
            max_info_len: config.max_info_len,
        }
    }

    /// 登録キーを決める
    ///
    /// V1は `port` 引数と検出IPから、V2は `address` 引数から。
    /// 失敗時はストレージに触れる前に検証エラーを返す。
    pub fn resolve_address(
        &self,
        params: &HashMap<String, String>,
        detected: IpAddr,
    ) -> AnnounceResult<String> {
        match self.protocol {
            ProtocolVersion::V1 => {
                let port = parse_port(params.get("port").map(String::as_str))?;
                Ok(SocketAddr::new(detected, port).to_string())
            }
            ProtocolVersion::V2 => {
                let address = params
                    .get("address")
                    .map(String::as_str)
                    .filter(|a| !a.is_empty())
                    .ok_or_else(|| AnnounceError::validation("address argument missing"))?;
                if has_line_break(address) {
                    return Err(AnnounceError::validation("address argument invalid"));
                }
                if self.trust_mode == TrustMode::Verified && host_ip_of(address)? != detected {
                    return Err(AnnounceError::validation("address does not match client"));
                }
                Ok(address.to_string())
            }
        }
    }

    /// `info` 引数を検証する
    ///
    /// V1は印字可能ASCIIかつ上限長以内のみ許可。V2は改行を含まなければ何でも通す。
    pub fn resolve_info<'p>(
        &self,
        params: &'p HashMap<String, String>,
    ) -> AnnounceResult<Option<&'p str>> {
        let info = params.get("info").map(String::as_str);
        if let Some(info) = info {
            let valid = match self.protocol {
                ProtocolVersion::V1 => {
                    info.bytes().all(|b| (0x20..=0x7e).contains(&b))
                        && info.len() <= self.max_info_len
                }
                ProtocolVersion::V2 => !has_line_break(info),
            };
            if !valid {
                return Err(AnnounceError::validation("info argument invalid"));
            }
        }
        Ok(info)
    }
}

// テキスト一覧は行区切りなので、CR/LFを含む値は1エントリとして表現できない
fn has_line_break(value: &str) -> bool {
    value.contains(['\r', '\n'])
}

// 整数として解釈でき、かつ 1..=65535 のポートのみ受け付ける
fn parse_port(value: Option<&str>) -> AnnounceResult<u16> {
    value
        .and_then(|v| v.trim().parse::<u16>().ok())
        .filter(|port| *port != 0)
        .ok_or_else(|| AnnounceError::validation("port argument invalid"))
}
