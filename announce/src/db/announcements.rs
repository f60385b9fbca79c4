//! 登録エントリのデータベース操作
//!
//! `announcements` テーブルに対する削除・置換・全件取得・再作成。

use crate::common::error::{AnnounceError, AnnounceResult};
use crate::common::types::Entry;
use sqlx::SqlitePool;

const DROP_TABLE_SQL: &str = "DROP TABLE announcements";

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE announcements (
        address   TEXT    NOT NULL PRIMARY KEY,
        last_seen INTEGER NOT NULL,
        info      TEXT
    )
"#;

const CREATE_INDEX_SQL: &str =
    "CREATE INDEX IF NOT EXISTS idx_announcements_last_seen ON announcements (last_seen)";

/// `oldest` より古いエントリを削除し、削除件数を返す
pub async fn delete_older_than(pool: &SqlitePool, oldest: i64) -> AnnounceResult<u64> {
    let result = sqlx::query("DELETE FROM announcements WHERE last_seen < ?")
        .bind(oldest)
        .execute(pool)
        .await
        .map_err(|e| AnnounceError::Database(format!("Failed to delete expired entries: {}", e)))?;

    Ok(result.rows_affected())
}

/// エントリを置き換える（DELETE → INSERT を1トランザクションで実行）
///
/// INSERTが失敗した場合はDELETEごとロールバックされ、既存エントリは残る。
pub async fn replace(pool: &SqlitePool, entry: &Entry) -> AnnounceResult<()> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AnnounceError::Database(format!("Failed to begin transaction: {}", e)))?;

    sqlx::query("DELETE FROM announcements WHERE address = ?")
        .bind(&entry.address)
        .execute(&mut *tx)
        .await
        .map_err(|e| AnnounceError::Database(format!("Failed to delete entry: {}", e)))?;

    let inserted = sqlx::query("INSERT INTO announcements (address, last_seen, info) VALUES (?, ?, ?)")
        .bind(&entry.address)
        .bind(entry.last_seen)
        .bind(&entry.info)
        .execute(&mut *tx)
        .await;

    if let Err(e) = inserted {
        if let Err(rollback_err) = tx.rollback().await {
            tracing::warn!("Failed to roll back entry replacement: {}", rollback_err);
        }
        return Err(AnnounceError::Database(format!(
            "Failed to insert entry: {}",
            e
        )));
    }

    tx.commit()
        .await
        .map_err(|e| AnnounceError::Database(format!("Failed to commit transaction: {}", e)))?;

    Ok(())
}

/// エントリを削除（存在しなくてもエラーにしない）
pub async fn delete(pool: &SqlitePool, address: &str) -> AnnounceResult<bool> {
    let result = sqlx::query("DELETE FROM announcements WHERE address = ?")
        .bind(address)
        .execute(pool)
        .await
        .map_err(|e| AnnounceError::Database(format!("Failed to delete entry: {}", e)))?;

    Ok(result.rows_affected() > 0)
}

/// 全エントリを取得
pub async fn list(pool: &SqlitePool) -> AnnounceResult<Vec<Entry>> {
    sqlx::query_as::<_, Entry>("SELECT address, last_seen, info FROM announcements")
        .fetch_all(pool)
        .await
        .map_err(|e| AnnounceError::Database(format!("Failed to list entries: {}", e)))
}

/// テーブルを破棄して作り直す
///
/// テーブルが存在しない場合のDROP失敗は想定内として無視する（初回作成を兼ねる）。
pub async fn recreate(pool: &SqlitePool) -> AnnounceResult<()> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AnnounceError::Database(format!("Failed to begin transaction: {}", e)))?;

    match sqlx::query(DROP_TABLE_SQL).execute(&mut *tx).await {
        Ok(_) => {}
        Err(e) if is_missing_table(&e) => {
            tracing::debug!("announcements table did not exist; creating it");
        }
        Err(e) => {
            return Err(AnnounceError::Database(format!(
                "Failed to drop table: {}",
                e
            )))
        }
    }

    sqlx::query(CREATE_TABLE_SQL)
        .execute(&mut *tx)
        .await
        .map_err(|e| AnnounceError::Database(format!("Failed to create table: {}", e)))?;
    sqlx::query(CREATE_INDEX_SQL)
        .execute(&mut *tx)
        .await
        .map_err(|e| AnnounceError::Database(format!("Failed to create index: {}", e)))?;

    tx.commit()
        .await
        .map_err(|e| AnnounceError::Database(format!("Failed to commit transaction: {}", e)))?;

    Ok(())
}

fn is_missing_table(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().contains("no such table"),
        _ => false,
    }
}
