//! 時刻ソース
//!
//! TTL判定に使う現在時刻（UNIX秒）を供給する。テストでは `ManualClock` で固定できる。

use chrono::Utc;
use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

/// 現在時刻を返すtrait
pub trait Clock: Send + Sync {
    /// 現在時刻（UNIX秒）
    fn now(&self) -> i64;
}

/// システム時刻
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// 手動で進める時刻（テスト用）
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    /// 指定時刻で開始する
    pub fn new(start: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start)),
        }
    }

    /// 時刻を設定する
    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// 時刻を進める
    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// 共有用の時刻ソース
pub type SharedClock = Arc<dyn Clock>;
