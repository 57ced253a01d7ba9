//! Daemon-CLI間IPC統合テスト
//!
//! TC-I-001 to TC-I-006: IPCクライアントとサーバーを実ソケットで接続し、
//! コマンドがエンジンの状態に反映されることをテストする。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::{tempdir, TempDir};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use timetracker::cli::commands::{ModeArg, StartArgs};
use timetracker::cli::IpcClient;
use timetracker::daemon::{
    serve_connection, BreakOutcome, Collaborators, CountdownBreakPresenter, IntervalTickSource,
    IpcServer, Tick, TimerEngine, TimerEvent,
};
use timetracker::settings::MemorySettings;
use timetracker::store::{MemorySessionStore, SessionStore};
use timetracker::types::{IpcResponse, TimerState};

struct TestDaemon {
    _dir: TempDir,
    socket_path: PathBuf,
    engine: Arc<Mutex<TimerEngine>>,
    store: Arc<MemorySessionStore>,
    server: JoinHandle<()>,
    _receivers: Receivers,
}

/// デーモンループの代わりに保持するだけの受信側
struct Receivers {
    _events: mpsc::UnboundedReceiver<TimerEvent>,
    _ticks: mpsc::UnboundedReceiver<Tick>,
    _outcomes: mpsc::UnboundedReceiver<BreakOutcome>,
}

impl TestDaemon {
    /// 接続を受け付け続けるテスト用サーバーを起動
    fn spawn() -> Self {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let store = Arc::new(MemorySessionStore::new());
        let collaborators = Collaborators {
            store: store.clone(),
            settings: Arc::new(MemorySettings::default()),
            presenter: Arc::new(CountdownBreakPresenter::new(outcome_tx)),
            ticker: Arc::new(IntervalTickSource::new(tick_tx)),
        };
        let engine = Arc::new(Mutex::new(TimerEngine::new(collaborators, event_tx)));

        let server = IpcServer::new(&socket_path).unwrap();
        let server_engine = engine.clone();
        let server = tokio::spawn(async move {
            while let Ok(stream) = server.accept().await {
                let _ = serve_connection(stream, server_engine.clone()).await;
            }
        });

        Self {
            _dir: dir,
            socket_path,
            engine,
            store,
            server,
            _receivers: Receivers {
                _events: event_rx,
                _ticks: tick_rx,
                _outcomes: outcome_rx,
            },
        }
    }

    fn client(&self) -> IpcClient {
        IpcClient::new(&self.socket_path)
    }
}

impl Drop for TestDaemon {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn start_args(task: &str, mode: ModeArg) -> StartArgs {
    StartArgs {
        task: task.to_string(),
        mode: Some(mode),
        category: None,
        description: None,
        issue: None,
    }
}

async fn send_raw(socket_path: &Path, payload: &[u8]) -> IpcResponse {
    let mut stream = UnixStream::connect(socket_path).await.unwrap();
    stream.write_all(payload).await.unwrap();

    let mut buffer = Vec::new();
    stream.read_to_end(&mut buffer).await.unwrap();
    serde_json::from_slice(&buffer).unwrap()
}

// ============================================================================
// TC-I-001: タイマー開始（IPC経由）
// ============================================================================

#[tokio::test]
async fn test_ipc_start_timer() {
    let daemon = TestDaemon::spawn();
    let args = StartArgs {
        category: Some("開発".to_string()),
        issue: Some("PRJ-7".to_string()),
        ..start_args("API実装", ModeArg::Flow)
    };

    let response = daemon.client().start(args).await.unwrap();

    assert!(response.is_success());
    assert_eq!(response.message, "タイマーを開始しました");
    let data = response.data.unwrap();
    assert_eq!(data.state.as_deref(), Some("running"));
    assert_eq!(data.mode.as_deref(), Some("flow"));
    assert_eq!(data.task_name.as_deref(), Some("API実装"));

    let engine = daemon.engine.lock().await;
    assert_eq!(engine.snapshot().state, TimerState::Running);
}

// ============================================================================
// TC-I-002: 一時停止と再開（IPC経由）
// ============================================================================

#[tokio::test]
async fn test_ipc_pause_and_resume() {
    let daemon = TestDaemon::spawn();
    let client = daemon.client();
    client
        .start(start_args("レビュー", ModeArg::Traditional))
        .await
        .unwrap();

    let paused = client.pause().await.unwrap();
    assert!(paused.is_success());
    assert_eq!(paused.data.unwrap().state.as_deref(), Some("paused"));

    let again = client.pause().await.unwrap();
    assert!(!again.is_success());

    let resumed = client.resume().await.unwrap();
    assert!(resumed.is_success());
    let data = resumed.data.unwrap();
    assert_eq!(data.state.as_deref(), Some("running"));
    assert_eq!(data.remaining_seconds, Some(1500));
}

// ============================================================================
// TC-I-003: 停止でセッションを記録（IPC経由）
// ============================================================================

#[tokio::test]
async fn test_ipc_stop_records_session() {
    let daemon = TestDaemon::spawn();
    let client = daemon.client();
    client
        .start(start_args("ドキュメント", ModeArg::Traditional))
        .await
        .unwrap();

    let response = client.stop().await.unwrap();

    assert!(response.is_success());
    let data = response.data.unwrap();
    let session = data.session.unwrap();
    assert_eq!(session.task_name, "ドキュメント");
    assert_eq!(data.state.as_deref(), Some("idle"));
    assert_eq!(daemon.store.all().unwrap(), vec![session]);
}

// ============================================================================
// TC-I-004: 取り消し（IPC経由）
// ============================================================================

#[tokio::test]
async fn test_ipc_cancel_discards_session() {
    let daemon = TestDaemon::spawn();
    let client = daemon.client();
    client
        .start(start_args("捨てる作業", ModeArg::Flow))
        .await
        .unwrap();

    let response = client.cancel().await.unwrap();

    assert!(response.is_success());
    assert_eq!(response.message, "タイマーを取り消しました");
    assert!(daemon.store.is_empty());

    let status = client.status().await.unwrap();
    assert_eq!(status.data.unwrap().state.as_deref(), Some("idle"));
}

// ============================================================================
// TC-I-005: エラーレスポンス
// ============================================================================

#[tokio::test]
async fn test_ipc_errors_for_invalid_state() {
    let daemon = TestDaemon::spawn();
    let client = daemon.client();

    let response = client.stop().await.unwrap();
    assert!(!response.is_success());
    assert_eq!(response.message, "タイマーは実行されていません");

    let response = client.skip_break().await.unwrap();
    assert!(!response.is_success());
    assert_eq!(response.message, "休憩中ではありません");
}

#[tokio::test]
async fn test_ipc_malformed_request() {
    let daemon = TestDaemon::spawn();

    let response = send_raw(&daemon.socket_path, br#"{"command":"explode"}"#).await;

    assert!(!response.is_success());
    assert!(daemon.engine.lock().await.machine().is_idle());
}

#[tokio::test]
async fn test_ipc_blank_task_name_rejected() {
    let daemon = TestDaemon::spawn();

    let response = send_raw(&daemon.socket_path, br#"{"command":"start","taskName":"  "}"#).await;

    assert!(!response.is_success());
    assert_eq!(response.message, "タスク名を入力してから開始してください");
}

// ============================================================================
// TC-I-006: デーモン未起動
// ============================================================================

#[tokio::test]
async fn test_client_without_daemon() {
    let dir = tempdir().unwrap();
    let client = IpcClient::new(dir.path().join("missing.sock"));

    let err = client.status().await.unwrap_err();

    assert!(format!("{:#}", err).contains("デーモンに接続できません"));
}
