use std::{io, net::SocketAddr};

use announce::shutdown::ShutdownController;
use announce::AppState;
use tokio::{net::TcpListener, task::JoinHandle};

/// 実ポートで起動したテスト用レジストリサーバー
#[allow(dead_code)]
pub struct TestServer {
    addr: SocketAddr,
    shutdown: ShutdownController,
    handle: JoinHandle<Result<(), io::Error>>,
}

#[allow(dead_code)]
impl TestServer {
    /// サーバーがバインドしているアドレスを返す
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// クライアント用のベースURL
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// サーバーを停止し、バックグラウンドタスクの終了を待つ
    pub async fn stop(self) {
        self.shutdown.request_shutdown();
        let _ = self.handle.await;
    }
}

/// レジストリサーバーを実ポートにバインドして起動する
#[allow(dead_code)]
pub async fn spawn_registry(state: AppState) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = ShutdownController::default();
    let handle = tokio::spawn(announce::server::serve(state, listener, shutdown.clone()));

    TestServer {
        addr,
        shutdown,
        handle,
    }
}
