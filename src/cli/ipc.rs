//! IPCクライアント
//!
//! Unix Domain Socketを使用してデーモンサーバーと通信するクライアント。

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::cli::commands::StartArgs;
use crate::types::{IpcRequest, IpcResponse, StartParams};

/// 接続タイムアウト（秒）
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// IPCクライアント
///
/// Unix Domain Socketを使用してデーモンサーバーと通信する。
#[derive(Debug, Clone)]
pub struct IpcClient {
    socket_path: PathBuf,
}

impl IpcClient {
    /// ソケットパスを指定してIPCクライアントを作成
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// リクエストを送信してレスポンスを受け取る
    pub async fn send_request(&self, request: IpcRequest) -> Result<IpcResponse> {
        debug!("リクエストを送信します: {:?}", request);
        let exchange = async {
            let mut stream = UnixStream::connect(&self.socket_path)
                .await
                .with_context(|| {
                    format!(
                        "デーモンに接続できません（`timetracker daemon` で起動してください）: {}",
                        self.socket_path.display()
                    )
                })?;

            let json = serde_json::to_vec(&request).context("Failed to serialize request")?;
            stream
                .write_all(&json)
                .await
                .context("Failed to write to socket")?;
            stream.flush().await.context("Failed to flush socket")?;

            let mut buffer = Vec::new();
            stream
                .read_to_end(&mut buffer)
                .await
                .context("Failed to read from socket")?;

            if buffer.is_empty() {
                anyhow::bail!("Connection closed by daemon");
            }

            let response: IpcResponse =
                serde_json::from_slice(&buffer).context("Failed to parse response JSON")?;
            Ok(response)
        };

        timeout(Duration::from_secs(CONNECTION_TIMEOUT_SECS), exchange)
            .await
            .context("Request timed out")?
    }

    pub async fn start(&self, args: StartArgs) -> Result<IpcResponse> {
        let params = StartParams {
            task_name: Some(args.task),
            mode: args.mode.map(Into::into),
            category: args.category,
            description: args.description,
            issue_id: args.issue,
        };
        self.send_request(IpcRequest::Start { params }).await
    }

    pub async fn pause(&self) -> Result<IpcResponse> {
        self.send_request(IpcRequest::Pause).await
    }

    pub async fn resume(&self) -> Result<IpcResponse> {
        self.send_request(IpcRequest::Resume).await
    }

    pub async fn stop(&self) -> Result<IpcResponse> {
        self.send_request(IpcRequest::Stop).await
    }

    pub async fn cancel(&self) -> Result<IpcResponse> {
        self.send_request(IpcRequest::Cancel).await
    }

    pub async fn status(&self) -> Result<IpcResponse> {
        self.send_request(IpcRequest::Status).await
    }

    pub async fn skip_break(&self) -> Result<IpcResponse> {
        self.send_request(IpcRequest::SkipBreak).await
    }
}

// ============================================================================
// Tests
// ============================================================================
