//! Daemonモジュール
//!
//! タイマーのバックグラウンドデーモン機能を提供する。
//! ティック、休憩結果、IPC接続を1つのイベントループで処理する。

pub mod break_mode;
pub mod engine;
pub mod ipc;
pub mod ticker;

pub use break_mode::{BreakOutcome, BreakPresenter, CountdownBreakPresenter};
pub use engine::{Collaborators, TimerEngine, TimerEvent};
pub use ipc::{handle_request, serve_connection, status_data, IpcServer};
pub use ticker::{IntervalTickSource, Tick, TickHandle, TickSource};

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::paths::AppPaths;
use crate::settings::FileSettings;
use crate::store::JsonSessionStore;

/// デーモンを起動し、Ctrl-Cを受けるまで動作する
pub async fn run(paths: &AppPaths) -> Result<()> {
    std::fs::create_dir_all(paths.data_dir()).with_context(|| {
        format!(
            "Failed to create data directory: {}",
            paths.data_dir().display()
        )
    })?;

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();

    let collaborators = Collaborators {
        store: Arc::new(JsonSessionStore::new(paths.sessions_path())),
        settings: Arc::new(FileSettings::new(paths.settings_path())),
        presenter: Arc::new(CountdownBreakPresenter::new(outcome_tx)),
        ticker: Arc::new(IntervalTickSource::new(tick_tx)),
    };
    let engine = Arc::new(Mutex::new(TimerEngine::new(collaborators, event_tx)));

    let server = IpcServer::new(&paths.socket_path())?;
    info!("デーモンを起動しました: {}", server.socket_path().display());

    tokio::spawn(log_events(event_rx));

    loop {
        tokio::select! {
            Some(tick) = tick_rx.recv() => {
                if let Err(e) = engine.lock().await.handle_tick(tick) {
                    error!("ティックの処理に失敗しました: {:#}", e);
                }
            }
            Some(outcome) = outcome_rx.recv() => {
                if let Err(e) = engine.lock().await.on_break_outcome(outcome) {
                    error!("休憩結果の処理に失敗しました: {:#}", e);
                }
            }
            accepted = server.accept() => {
                match accepted {
                    Ok(stream) => {
                        let engine = Arc::clone(&engine);
                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(stream, engine).await {
                                warn!("IPCリクエストの処理に失敗しました: {:#}", e);
                            }
                        });
                    }
                    Err(e) => warn!("{:#}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("終了シグナルを受信しました");
                break;
            }
        }
    }

    engine.lock().await.shutdown();
    info!("デーモンを終了しました");
    Ok(())
}

/// タイマーイベントをログに出力する
async fn log_events(mut event_rx: mpsc::UnboundedReceiver<TimerEvent>) {
    while let Some(event) = event_rx.recv().await {
        match event {
            TimerEvent::Tick { elapsed_seconds } => debug!("tick: {}秒", elapsed_seconds),
            TimerEvent::SessionAdded(session) => info!(
                "セッション追加: {} {}秒 (休憩{}回)",
                session.task_name, session.work_duration_seconds, session.breaks_taken
            ),
            TimerEvent::BreakStarted { duration_seconds } => {
                info!("休憩開始: {}秒", duration_seconds)
            }
            other => info!("{:?}", other),
        }
    }
}
