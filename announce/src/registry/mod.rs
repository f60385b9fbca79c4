//! 登録レジストリ
//!
//! TTL付きエントリの追加・削除・一覧を提供する。
//!
//! 1リクエストごとにストレージハンドルと時刻ソースを受け取って構築し、
//! リクエスト終了とともに破棄する。状態はすべてバッキングストア側にある。

use crate::clock::Clock;
use crate::common::error::AnnounceResult;
use crate::common::types::Entry;
use crate::db::traits::AnnouncementRepository;
use tracing::debug;

/// 登録レジストリ
pub struct Registry<'a> {
    store: &'a dyn AnnouncementRepository,
    clock: &'a dyn Clock,
    ttl_secs: i64,
}

impl<'a> Registry<'a> {
    /// 新しいレジストリを作成
    pub fn new(store: &'a dyn AnnouncementRepository, clock: &'a dyn Clock, ttl_secs: i64) -> Self {
        Self {
            store,
            clock,
            ttl_secs,
        }
    }

    /// 現在時刻（注入された時刻ソース）
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// TTL（秒）
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// `last_seen < now - TTL` のエントリを削除する
    ///
    /// 何度呼んでも結果は同じ。削除件数を返す。
    pub async fn evict_expired(&self, now: i64) -> AnnounceResult<u64> {
        let evicted = self.store.delete_older_than(now - self.ttl_secs).await?;
        if evicted > 0 {
            debug!(evicted, now, "Evicted expired entries");
        }
        Ok(evicted)
    }

    /// エントリを登録または更新する
    ///
    /// 既存エントリは `info` と `last_seen = now` を持つ新しいレコードで丸ごと置き換わる。
    pub async fn upsert(&self, address: &str, info: Option<&str>, now: i64) -> AnnounceResult<()> {
        let entry = Entry::new(address, now, info.map(str::to_string));
        self.store.replace(&entry).await?;
        debug!(address, now, "Entry upserted");
        Ok(())
    }

    /// エントリを削除する（存在しなくても成功）
    pub async fn remove(&self, address: &str) -> AnnounceResult<()> {
        let removed = self.store.delete(address).await?;
        debug!(address, removed, "Entry remove requested");
        Ok(())
    }

    /// 期限内のエントリ一覧
    ///
    /// 順序は保証しない。`now - last_seen < TTL` のものだけを返す。
    pub async fn list(&self) -> AnnounceResult<Vec<Entry>> {
        let now = self.clock.now();
        let mut entries = self.store.list().await?;
        entries.retain(|entry| entry.is_live(now, self.ttl_secs));
        Ok(entries)
    }

    /// 全エントリを破棄してストレージを作り直す
    ///
    /// ストレージ未作成の状態からでも成功する。
    pub async fn clear(&self) -> AnnounceResult<()> {
        self.store.recreate().await?;
        debug!("Registry cleared");
        Ok(())
    }
}
