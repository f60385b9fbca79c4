//! ワイヤフォーマット
//!
//! 生存中エントリをテキスト形式またはバイナリ形式に変換する。
//!
//! # テキスト形式
//!
//! ```text
//! state=list
//! 1.2.3.4:9000|1700000000|hello
//! ```
//!
//! V1では行末に `|` が付き、`info` は出力しない（旧クライアント互換）。
//!
//! # バイナリ形式
//!
//! IPv4（リトルエンディアンu32）+ ポート（リトルエンディアンu16）の6バイトを
//! エントリ数ぶん連結したもの。ヘッダー・件数・区切りは無い。

use crate::common::error::{AnnounceError, AnnounceResult};
use crate::common::types::Entry;
use crate::config::ProtocolVersion;
use std::net::{Ipv4Addr, SocketAddrV4};

/// バイナリレコード1件のバイト数
pub const BINARY_RECORD_LEN: usize = 6;

/// テキストのフィールド区切り
pub const FIELD_SEPARATOR: char = '|';

/// 応答種別を表す `state=<name>` 行を作る
pub fn state_line(name: &str) -> String {
    format!("state={}", name)
}

/// エントリ一覧をテキスト形式にする
pub fn encode_text_list(entries: &[Entry], protocol: ProtocolVersion) -> String {
    let mut body = state_line("list");
    body.push('\n');
    for entry in entries {
        body.push_str(&encode_text_line(entry, protocol));
        body.push('\n');
    }
    body
}

/// エントリ1件をテキスト1行にする（改行なし）
pub fn encode_text_line(entry: &Entry, protocol: ProtocolVersion) -> String {
    match protocol {
        ProtocolVersion::V1 => format!(
            "{}{sep}{}{sep}",
            entry.address,
            entry.last_seen,
            sep = FIELD_SEPARATOR
        ),
        ProtocolVersion::V2 => match &entry.info {
            Some(info) => format!(
                "{}{sep}{}{sep}{}",
                entry.address,
                entry.last_seen,
                info,
                sep = FIELD_SEPARATOR
            ),
            None => format!("{}{}{}", entry.address, FIELD_SEPARATOR, entry.last_seen),
        },
    }
}

/// エントリ一覧をバイナリ形式にする
///
/// IPv4:ポートに分解できないエントリは出力しない。
pub fn encode_binary_list(entries: &[Entry]) -> Vec<u8> {
    let mut out = Vec::with_capacity(entries.len() * BINARY_RECORD_LEN);
    for endpoint in entries.iter().filter_map(Entry::ipv4_endpoint) {
        out.extend_from_slice(&u32::from(*endpoint.ip()).to_le_bytes());
        out.extend_from_slice(&endpoint.port().to_le_bytes());
    }
    out
}

/// バイナリ形式を読み戻す
pub fn decode_binary_list(bytes: &[u8]) -> AnnounceResult<Vec<SocketAddrV4>> {
    if bytes.len() % BINARY_RECORD_LEN != 0 {
        return Err(AnnounceError::validation(format!(
            "binary list length {} is not a multiple of {}",
            bytes.len(),
            BINARY_RECORD_LEN
        )));
    }
    Ok(bytes
        .chunks_exact(BINARY_RECORD_LEN)
        .map(|record| {
            let ip = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
            let port = u16::from_le_bytes([record[4], record[5]]);
            SocketAddrV4::new(Ipv4Addr::from(ip), port)
        })
        .collect())
}

/// テキスト形式を読み戻す
///
/// 先頭の `state=list` 行を要求する。V1の末尾 `|` とV2の `info` の両方を受け付ける。
/// `info` に `|` が含まれていても3番目以降をまとめて `info` とみなす。
/// 解釈できない行（`address` に `|` を含むV2エントリなど）は警告を出して読み飛ばす。
pub fn parse_text_list(body: &str) -> AnnounceResult<Vec<Entry>> {
    let mut lines = body.lines();
    match lines.next() {
        Some(line) if line == state_line("list") => {}
        other => {
            return Err(AnnounceError::validation(format!(
                "unexpected list header: {:?}",
                other.unwrap_or_default()
            )))
        }
    }

    Ok(lines
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let entry = parse_text_line(line);
            if entry.is_none() {
                tracing::warn!(line, "Skipping malformed list line");
            }
            entry
        })
        .collect())
}

fn parse_text_line(line: &str) -> Option<Entry> {
    let mut fields = line.splitn(3, FIELD_SEPARATOR);
    let address = fields.next()?;
    let last_seen = fields.next()?.parse::<i64>().ok()?;
    let info = fields
        .next()
        .filter(|info| !info.is_empty())
        .map(str::to_string);
    Some(Entry::new(address, last_seen, info))
}
