//! 登録エントリの型定義

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddrV4};

/// 登録エントリ
///
/// `address` が主キー。`add` のたびにレコード全体が置き換わる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Entry {
    /// 登録アドレス（通常は `<ip>:<port>`、V2では任意の文字列）
    pub address: String,
    /// 最終登録時刻（UNIX秒）
    pub last_seen: i64,
    /// 任意のメタデータ
    pub info: Option<String>,
}

impl Entry {
    /// 新しいエントリを作成
    pub fn new(address: impl Into<String>, last_seen: i64, info: Option<String>) -> Self {
        Self {
            address: address.into(),
            last_seen,
            info,
        }
    }

    /// `now` 時点でTTL内に収まっているか
    pub fn is_live(&self, now: i64, ttl_secs: i64) -> bool {
        now - self.last_seen < ttl_secs
    }

    /// アドレスをIPv4ドット表記とポートに分解する
    ///
    /// バイナリリストに載せられるのはこれが `Some` を返すエントリのみ。
    pub fn ipv4_endpoint(&self) -> Option<SocketAddrV4> {
        let (host, port) = self.address.rsplit_once(':')?;
        let ip = host.parse::<Ipv4Addr>().ok()?;
        let port = port.parse::<u16>().ok()?;
        Some(SocketAddrV4::new(ip, port))
    }
}
