//! 協調的シャットダウン
//!
//! OSシグナルと並んで `server::serve` の停止条件になる。
//! 組み込み利用やテストからシグナル無しでサーバーを止めるのに使う。

use std::sync::Arc;
use tokio::sync::watch;

/// シャットダウン要求の共有ハンドル
///
/// 一度立てたフラグは戻らない。クローンはすべて同じ状態を見る。
#[derive(Clone, Debug)]
pub struct ShutdownController {
    requested: Arc<watch::Sender<bool>>,
}

impl Default for ShutdownController {
    fn default() -> Self {
        let (requested, _) = watch::channel(false);
        Self {
            requested: Arc::new(requested),
        }
    }
}

impl ShutdownController {
    /// 要求済みか
    pub fn is_shutdown_requested(&self) -> bool {
        *self.requested.borrow()
    }

    /// シャットダウンを要求し、待機中のタスクを起こす
    pub fn request_shutdown(&self) {
        self.requested.send_replace(true);
    }

    /// 要求されるまで待つ
    pub async fn wait(&self) {
        let mut receiver = self.requested.subscribe();
        // 送信側は self が保持しているので閉じない
        let _ = receiver.wait_for(|requested| *requested).await;
    }
}
