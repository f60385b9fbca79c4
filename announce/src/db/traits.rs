//! Repository traitパターン定義
//!
//! レジストリが使うバッキングストアを抽象化する。
//! 本番実装は `SqlitePool`、テストではモックに差し替えられる。

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::common::error::AnnounceResult;
use crate::common::types::Entry;

use super::announcements;

/// 登録エントリ操作のRepository trait
#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    /// `oldest` より古いエントリを削除し、削除件数を返す
    async fn delete_older_than(&self, oldest: i64) -> AnnounceResult<u64>;
    /// エントリを原子的に置き換える
    async fn replace(&self, entry: &Entry) -> AnnounceResult<()>;
    /// エントリを削除（存在した場合 `true`）
    async fn delete(&self, address: &str) -> AnnounceResult<bool>;
    /// 全エントリを取得
    async fn list(&self) -> AnnounceResult<Vec<Entry>>;
    /// ストレージを破棄して空の状態で作り直す
    async fn recreate(&self) -> AnnounceResult<()>;
}

#[async_trait]
impl AnnouncementRepository for SqlitePool {
    async fn delete_older_than(&self, oldest: i64) -> AnnounceResult<u64> {
        announcements::delete_older_than(self, oldest).await
    }

    async fn replace(&self, entry: &Entry) -> AnnounceResult<()> {
        announcements::replace(self, entry).await
    }

    async fn delete(&self, address: &str) -> AnnounceResult<bool> {
        announcements::delete(self, address).await
    }

    async fn list(&self) -> AnnounceResult<Vec<Entry>> {
        announcements::list(self).await
    }

    async fn recreate(&self) -> AnnounceResult<()> {
        announcements::recreate(self).await
    }
}
