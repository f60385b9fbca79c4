//! client subcommand
//!
//! Calls a running registry server and prints the decoded reply.

use crate::codec::{decode_binary_list, parse_text_list, state_line};
use crate::common::error::{AnnounceError, AnnounceResult};
use crate::common::types::Entry;
use clap::{Args, Subcommand};
use std::net::SocketAddrV4;
use std::time::Duration;

/// リクエストタイムアウト
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Arguments for the client subcommand
#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Server base URL
    #[arg(
        short,
        long,
        default_value = "http://127.0.0.1:8080",
        env = "ANNOUNCE_SERVER"
    )]
    pub server: String,

    /// Action to perform
    #[command(subcommand)]
    pub command: ClientCommand,
}

/// Client actions
#[derive(Subcommand, Debug, Clone)]
pub enum ClientCommand {
    /// Show the address the server sees for this client
    Getip,
    /// List live entries
    List {
        /// Print entries as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List live IPv4 entries via the binary format
    Blist,
    /// Announce (or refresh) an entry
    Add(AddArgs),
    /// Withdraw an entry
    Remove(TargetArgs),
    /// Drop every entry
    Clear,
}

/// Entry key arguments
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Port to announce on the detected IP (v1 servers)
    #[arg(long)]
    pub port: Option<u16>,

    /// Address to announce as-is (v2 servers)
    #[arg(long)]
    pub address: Option<String>,
}

/// Arguments for `add`
#[derive(Args, Debug, Clone, Default)]
pub struct AddArgs {
    /// Entry key
    #[command(flatten)]
    pub target: TargetArgs,

    /// Free-form description
    #[arg(long)]
    pub info: Option<String>,
}

/// `getip` の応答
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpReport {
    /// 転送ヘッダー考慮後のIP
    pub ip: String,
    /// 接続元IP
    pub remote_ip: String,
}

/// レジストリサーバーのHTTPクライアント
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RegistryClient {
    /// ベースURLから作成（`/announce` を付与する）
    pub fn new(server: &str) -> AnnounceResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AnnounceError::Http(format!("Failed to build client: {}", e)))?;
        Ok(Self::with_http(server, http))
    }

    /// 既存のHTTPクライアントを使って作成
    pub fn with_http(server: &str, http: reqwest::Client) -> Self {
        Self {
            http,
            endpoint: format!("{}/announce", server.trim_end_matches('/')),
        }
    }

    /// 検出IPと接続元IPを取得
    pub async fn getip(&self) -> AnnounceResult<IpReport> {
        let body = self.text(&[("action", "getip")]).await?;
        let mut lines = body.lines();
        expect_state(lines.next(), "ip")?;

        let mut ip = None;
        let mut remote_ip = None;
        for line in lines {
            if let Some(value) = line.strip_prefix("ip=") {
                ip = Some(value.to_string());
            } else if let Some(value) = line.strip_prefix("remoteip=") {
                remote_ip = Some(value.to_string());
            }
        }
        match (ip, remote_ip) {
            (Some(ip), Some(remote_ip)) => Ok(IpReport { ip, remote_ip }),
            _ => Err(AnnounceError::Http(format!(
                "Malformed getip reply: {:?}",
                body
            ))),
        }
    }

    /// 生存中エントリ（テキスト形式）
    pub async fn list(&self) -> AnnounceResult<Vec<Entry>> {
        let body = self.text(&[("action", "list")]).await?;
        parse_text_list(&body)
    }

    /// 生存中のIPv4エントリ（バイナリ形式）
    pub async fn blist(&self) -> AnnounceResult<Vec<SocketAddrV4>> {
        let response = self.send(&[("action", "blist")]).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AnnounceError::Http(format!("Failed to read body: {}", e)))?;
        decode_binary_list(&bytes)
    }

    /// エントリを登録・更新
    pub async fn add(&self, args: &AddArgs) -> AnnounceResult<()> {
        let mut params = target_params(&args.target);
        if let Some(info) = &args.info {
            params.push(("info", info.clone()));
        }
        self.command("add", params, "added").await
    }

    /// エントリを削除
    pub async fn remove(&self, target: &TargetArgs) -> AnnounceResult<()> {
        self.command("remove", target_params(target), "deleted")
            .await
    }

    /// 全エントリを削除
    pub async fn clear(&self) -> AnnounceResult<()> {
        self.command("clear", Vec::new(), "ok").await
    }

    async fn command(
        &self,
        action: &'static str,
        mut params: Vec<(&'static str, String)>,
        expected: &str,
    ) -> AnnounceResult<()> {
        params.insert(0, ("action", action.to_string()));
        let body = self.text(&params).await?;
        expect_state(body.lines().next(), expected)
    }

    async fn text<V: serde::Serialize + ?Sized>(&self, params: &V) -> AnnounceResult<String> {
        self.send(params)
            .await?
            .text()
            .await
            .map_err(|e| AnnounceError::Http(format!("Failed to read body: {}", e)))
    }

    async fn send<V: serde::Serialize + ?Sized>(
        &self,
        params: &V,
    ) -> AnnounceResult<reqwest::Response> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(params)
            .send()
            .await
            .map_err(|e| AnnounceError::Http(format!("Request to {} failed: {}", self.endpoint, e)))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = body
            .trim_end()
            .strip_prefix("Error: ")
            .unwrap_or(body.trim_end());
        Err(AnnounceError::Http(format!("{} ({})", message, status)))
    }
}

fn target_params(target: &TargetArgs) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(port) = target.port {
        params.push(("port", port.to_string()));
    }
    if let Some(address) = &target.address {
        params.push(("address", address.clone()));
    }
    params
}

fn expect_state(line: Option<&str>, name: &str) -> AnnounceResult<()> {
    match line {
        Some(line) if line == state_line(name) => Ok(()),
        other => Err(AnnounceError::Http(format!(
            "Unexpected reply: {:?}",
            other.unwrap_or_default()
        ))),
    }
}

/// Execute the client command
pub async fn execute(args: &ClientArgs) -> Result<(), anyhow::Error> {
    let client = RegistryClient::new(&args.server)?;

    match &args.command {
        ClientCommand::Getip => {
            let report = client.getip().await?;
            println!("ip\t{}", report.ip);
            println!("remoteip\t{}", report.remote_ip);
        }
        ClientCommand::List { json } => {
            let entries = client.list().await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No entries");
            } else {
                println!("ADDRESS\tLAST_SEEN\tINFO");
                for entry in entries {
                    println!(
                        "{}\t{}\t{}",
                        entry.address,
                        format_last_seen(entry.last_seen),
                        entry.info.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        ClientCommand::Blist => {
            for endpoint in client.blist().await? {
                println!("{}", endpoint);
            }
        }
        ClientCommand::Add(add) => {
            client.add(add).await?;
            println!("added");
        }
        ClientCommand::Remove(target) => {
            client.remove(target).await?;
            println!("deleted");
        }
        ClientCommand::Clear => {
            client.clear().await?;
            println!("cleared");
        }
    }
    Ok(())
}

fn format_last_seen(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| timestamp.to_string())
}
