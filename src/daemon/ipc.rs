//! IPCサーバー
//!
//! Unix Domain Socketを使用したプロセス間通信サーバーを提供する。
//! CLIクライアントからのリクエストを受け付け、タイマーエンジンを操作する。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::daemon::TimerEngine;
use crate::types::{IpcRequest, IpcResponse, ResponseData, StartParams};

/// 接続タイムアウト（秒）
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// リクエストバッファサイズ
const REQUEST_BUFFER_SIZE: usize = 4096;

/// IPCサーバー
///
/// Unix Domain Socketでクライアントからのリクエストを受け付ける。
pub struct IpcServer {
    listener: UnixListener,
    socket_path: PathBuf,
}

impl IpcServer {
    /// 新しいIPCサーバーを作成
    ///
    /// 指定されたパスにUnix Domain Socketを作成し、リッスンを開始する。
    /// 既存のソケットファイルがある場合は削除する。
    ///
    /// # Arguments
    ///
    /// * `socket_path` - ソケットファイルのパス（親ディレクトリがなければ作成する）
    ///
    /// # Errors
    ///
    /// - ソケットディレクトリの作成に失敗した場合
    /// - ソケットファイルの削除に失敗した場合
    /// - ソケットのバインドに失敗した場合
    pub fn new(socket_path: &Path) -> Result<Self> {
        if let Some(parent) = socket_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).context("Failed to create socket directory")?;
            }
        }

        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("Failed to remove existing socket file")?;
        }

        let listener = UnixListener::bind(socket_path).context("Failed to bind Unix socket")?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// クライアント接続を受け付ける
    ///
    /// 次のクライアントが接続するまで待機する。
    ///
    /// # Returns
    ///
    /// 接続されたクライアントのUnixStream
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// リクエストを受信
    ///
    /// ストリームから1回の読み取りでJSONリクエストを受け取る。
    /// 読み取りは最大4096バイト、タイムアウトは5秒。
    ///
    /// # Arguments
    ///
    /// * `stream` - クライアントストリーム
    ///
    /// # Returns
    ///
    /// デシリアライズしたIpcRequest
    ///
    /// # Errors
    ///
    /// - 読み取りがタイムアウトした、またはクライアントが切断した場合
    /// - JSONとして解釈できない場合
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = vec![0u8; REQUEST_BUFFER_SIZE];

        let n = timeout(
            Duration::from_secs(CONNECTION_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await
        .context("Request read timed out")?
        .context("Failed to read from socket")?;

        if n == 0 {
            anyhow::bail!("Connection closed by client");
        }

        let request: IpcRequest =
            serde_json::from_slice(&buffer[..n]).context("Failed to parse request JSON")?;

        Ok(request)
    }

    /// レスポンスを送信
    ///
    /// IpcResponseをJSONにしてストリームへ書き込み、フラッシュする。
    ///
    /// # Arguments
    ///
    /// * `stream` - クライアントストリーム
    /// * `response` - 送信するレスポンス
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write to socket")?;

        stream.flush().await.context("Failed to flush socket")?;

        Ok(())
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        // サーバー終了時にソケットファイルを削除
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

/// 1接続分のリクエストを処理する
///
/// 不正なリクエストにはエラーレスポンスを返す。
pub async fn serve_connection(mut stream: UnixStream, engine: Arc<Mutex<TimerEngine>>) -> Result<()> {
    let response = match IpcServer::receive_request(&mut stream).await {
        Ok(request) => {
            debug!("リクエストを受信しました: {:?}", request);
            handle_request(request, engine).await
        }
        Err(e) => IpcResponse::error(format!("{:#}", e)),
    };
    IpcServer::send_response(&mut stream, &response).await
}

/// リクエストを処理
///
/// IpcRequestに応じてTimerEngineを操作し、レスポンスを返す。
pub async fn handle_request(request: IpcRequest, engine: Arc<Mutex<TimerEngine>>) -> IpcResponse {
    let mut engine = engine.lock().await;

    match request {
        IpcRequest::Start { params } => handle_start(&mut engine, params),
        IpcRequest::Pause => handle_pause(&mut engine),
        IpcRequest::Resume => handle_resume(&mut engine),
        IpcRequest::Stop => handle_stop(&mut engine),
        IpcRequest::Cancel => handle_cancel(&mut engine),
        IpcRequest::Status => handle_status(&engine),
        IpcRequest::SkipBreak => handle_skip_break(&mut engine),
    }
}

/// エンジンの状態からレスポンスデータを作成
pub fn status_data(engine: &TimerEngine) -> ResponseData {
    let snapshot = engine.snapshot();
    ResponseData {
        state: Some(snapshot.state.as_str().to_string()),
        mode: Some(snapshot.mode.as_str().to_string()),
        elapsed_seconds: Some(snapshot.elapsed_seconds),
        remaining_seconds: snapshot.remaining_seconds,
        work_seconds: Some(snapshot.work_seconds),
        breaks_taken: Some(snapshot.breaks_taken),
        task_name: snapshot.task_name,
        on_break: Some(snapshot.on_break),
        break_remaining_seconds: engine
            .break_remaining_seconds()
            .or(snapshot.break_duration_seconds),
        session: None,
    }
}

fn handle_start(engine: &mut TimerEngine, params: StartParams) -> IpcResponse {
    match engine.start(params) {
        Ok(()) => IpcResponse::success("タイマーを開始しました", Some(status_data(engine))),
        Err(e) => IpcResponse::error(e.to_string()),
    }
}

fn handle_pause(engine: &mut TimerEngine) -> IpcResponse {
    match engine.pause() {
        Ok(()) => IpcResponse::success("タイマーを一時停止しました", Some(status_data(engine))),
        Err(e) => IpcResponse::error(e.to_string()),
    }
}

fn handle_resume(engine: &mut TimerEngine) -> IpcResponse {
    match engine.resume() {
        Ok(()) => IpcResponse::success("タイマーを再開しました", Some(status_data(engine))),
        Err(e) => IpcResponse::error(e.to_string()),
    }
}

fn handle_stop(engine: &mut TimerEngine) -> IpcResponse {
    match engine.stop() {
        Ok(session) => {
            let data = ResponseData {
                session,
                ..status_data(engine)
            };
            IpcResponse::success("タイマーを停止しました", Some(data))
        }
        Err(e) => IpcResponse::error(e.to_string()),
    }
}

fn handle_cancel(engine: &mut TimerEngine) -> IpcResponse {
    match engine.cancel() {
        Ok(()) => IpcResponse::success("タイマーを取り消しました", Some(status_data(engine))),
        Err(e) => IpcResponse::error(e.to_string()),
    }
}

fn handle_status(engine: &TimerEngine) -> IpcResponse {
    IpcResponse::success("", Some(status_data(engine)))
}

fn handle_skip_break(engine: &mut TimerEngine) -> IpcResponse {
    match engine.skip_break() {
        Ok(()) => IpcResponse::success("休憩をスキップしました", None),
        Err(e) => IpcResponse::error(e.to_string()),
    }
}

// ============================================================================
// Tests
// ============================================================================
