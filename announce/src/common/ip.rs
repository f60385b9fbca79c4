//! IPアドレスユーティリティ
//!
//! IPv4-mapped IPv6アドレスの正規化と、プロキシ転送ヘッダーからの
//! クライアントIP抽出を行う。

use super::error::{CommonError, CommonResult};
use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// IPアドレスを正規化する
///
/// IPv4-mapped IPv6（::ffff:x.x.x.x）をIPv4に変換。
/// それ以外はそのまま返す。
pub fn normalize_ip(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                IpAddr::V4(v4)
            } else {
                IpAddr::V6(v6)
            }
        }
        v4 => v4,
    }
}

/// SocketAddrからIPアドレスを抽出し正規化する
pub fn normalize_socket_ip(addr: &SocketAddr) -> IpAddr {
    normalize_ip(addr.ip())
}

/// 転送ヘッダーからクライアントIPを取得する
///
/// `X-Forwarded-For` の先頭から最初に解釈できたIPを優先し、
/// 無ければ `Forwarded` ヘッダーの `for=` を参照する。
pub fn client_ip_from_forwarded_headers(headers: &HeaderMap) -> Option<IpAddr> {
    x_forwarded_for(headers).or_else(|| forwarded_for(headers))
}

fn x_forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    let value = headers.get("x-forwarded-for")?.to_str().ok()?;
    value
        .split(',')
        .map(str::trim)
        .find_map(parse_forwarded_ip_candidate)
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    let value = headers.get("forwarded")?.to_str().ok()?;
    value.split(',').find_map(|entry| {
        entry
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .find_map(|(key, value)| {
                if key.trim().eq_ignore_ascii_case("for") {
                    parse_forwarded_ip_candidate(value.trim())
                } else {
                    None
                }
            })
    })
}

/// 転送ヘッダーの1要素をIPとして解釈する
///
/// `"[2001:db8::1]:443"` や `203.0.113.5:8080` のようなポート付き表記も受け付ける。
/// `unknown` や難読化識別子（`_hidden`）は無視する。
pub fn parse_forwarded_ip_candidate(value: &str) -> Option<IpAddr> {
    let trimmed = value.trim().trim_matches('"');
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unknown") || trimmed.starts_with('_') {
        return None;
    }

    let host = if let Some(stripped) = trimmed.strip_prefix('[') {
        stripped.split(']').next().unwrap_or_default().trim()
    } else {
        trimmed
    };

    if let Ok(ip) = host.parse::<IpAddr>() {
        return Some(normalize_ip(ip));
    }

    if let Some((ip_candidate, _port)) = host.rsplit_once(':') {
        if !ip_candidate.contains(':') {
            if let Ok(ip) = ip_candidate.parse::<IpAddr>() {
                return Some(normalize_ip(ip));
            }
        }
    }

    None
}

/// `<host>:<port>` 形式のアドレスからホスト部のIPを取り出す
///
/// IPv6は `[addr]:port` 表記のみ受け付ける。
pub fn host_ip_of(address: &str) -> CommonResult<IpAddr> {
    let host = if let Some(stripped) = address.strip_prefix('[') {
        stripped
            .split_once(']')
            .map(|(host, _)| host)
            .ok_or_else(|| CommonError::Validation("address argument invalid".to_string()))?
    } else {
        address
            .rsplit_once(':')
            .map(|(host, _)| host)
            .ok_or_else(|| CommonError::Validation("address argument invalid".to_string()))?
    };
    Ok(normalize_ip(host.parse::<IpAddr>()?))
}
