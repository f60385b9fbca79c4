//! Integration Test: clientサブコマンドと実サーバー
//!
//! 実ポートで起動したサーバーに `RegistryClient` から全アクションを発行する。

use crate::support::http::spawn_registry;
use crate::support::{create_test_db_pool, create_test_state};
use announce::cli::client::{AddArgs, RegistryClient, TargetArgs};
use announce::clock::ManualClock;
use announce::config::{ProtocolVersion, RegistryConfig};
use std::net::SocketAddrV4;

// ローカルサーバー宛てなのでプロキシ設定を無視する
fn local_client(base_url: &str) -> RegistryClient {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    RegistryClient::with_http(base_url, http)
}

fn address_target(address: &str) -> TargetArgs {
    TargetArgs {
        port: None,
        address: Some(address.to_string()),
    }
}

#[tokio::test]
async fn client_drives_every_action() {
    let clock = ManualClock::new(2_000);
    let state = create_test_state(create_test_db_pool().await, &clock, RegistryConfig::default());
    let server = spawn_registry(state).await;
    let client = local_client(&server.base_url());

    let report = client.getip().await.unwrap();
    assert_eq!(report.ip, "127.0.0.1");
    assert_eq!(report.remote_ip, "127.0.0.1");

    client
        .add(&AddArgs {
            target: address_target("1.2.3.4:9000"),
            info: Some("hello".to_string()),
        })
        .await
        .unwrap();
    client
        .add(&AddArgs {
            target: address_target("relay.example:7000"),
            info: None,
        })
        .await
        .unwrap();

    let mut entries = client.list().await.unwrap();
    entries.sort_by(|a, b| a.address.cmp(&b.address));
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].address, "1.2.3.4:9000");
    assert_eq!(entries[0].info.as_deref(), Some("hello"));
    assert_eq!(entries[1].address, "relay.example:7000");
    assert_eq!(entries[1].info, None);

    let endpoints = client.blist().await.unwrap();
    assert_eq!(endpoints, vec!["1.2.3.4:9000".parse::<SocketAddrV4>().unwrap()]);

    client.remove(&address_target("1.2.3.4:9000")).await.unwrap();
    let entries = client.list().await.unwrap();
    assert_eq!(entries.len(), 1);

    client.clear().await.unwrap();
    assert!(client.list().await.unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn client_surfaces_server_errors() {
    let clock = ManualClock::new(2_000);
    let config = RegistryConfig {
        protocol: ProtocolVersion::V1,
        ..Default::default()
    };
    let state = create_test_state(create_test_db_pool().await, &clock, config);
    let server = spawn_registry(state).await;
    let client = local_client(&server.base_url());

    let err = client.add(&AddArgs::default()).await.unwrap_err();
    assert!(err.to_string().contains("port argument invalid"));

    client
        .add(&AddArgs {
            target: TargetArgs {
                port: Some(9000),
                address: None,
            },
            info: None,
        })
        .await
        .unwrap();
    let entries = client.list().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].address, "127.0.0.1:9000");

    server.stop().await;
}

#[tokio::test]
async fn client_list_skips_entries_it_cannot_parse() {
    let clock = ManualClock::new(2_000);
    let state = create_test_state(create_test_db_pool().await, &clock, RegistryConfig::default());
    let server = spawn_registry(state).await;
    let client = local_client(&server.base_url());

    for address in ["1.2.3.4:9000", "srv|eu"] {
        client
            .add(&AddArgs {
                target: address_target(address),
                info: None,
            })
            .await
            .unwrap();
    }

    let entries = client.list().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].address, "1.2.3.4:9000");

    server.stop().await;
}
