//! E2Eシナリオテスト
//!
//! TC-E-001 to TC-E-005: エンドツーエンドのユーザーフローをテストする。
//!
//! 注意: ティックは実時間で進むため、作業時間は数秒以内に収める。

use std::time::Duration;

use timetracker::cli::commands::{ModeArg, StartArgs};
use timetracker::settings::{FileSettings, SettingsProvider};
use timetracker::store::{JsonSessionStore, SessionStore};
use timetracker::timer::logic::{break_duration, FLOW_MIN_BREAK};
use timetracker::types::TimerMode;

use super::support::RunningDaemon;

fn start_args(task: &str, mode: ModeArg) -> StartArgs {
    StartArgs {
        task: task.to_string(),
        mode: Some(mode),
        category: Some("開発".to_string()),
        description: None,
        issue: None,
    }
}

// TC-E-001: Flowモードの作業から休憩スキップまで
#[tokio::test]
async fn test_e2e_flow_session_and_skip_break() {
    let daemon = RunningDaemon::start().await;
    let client = daemon.client();

    let started = client
        .start(start_args("Flow作業", ModeArg::Flow))
        .await
        .unwrap();
    assert!(started.is_success());

    // 少なくとも1ティック進める
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let running = daemon
        .wait_for_status(|data| data.elapsed_seconds.unwrap_or(0) >= 1)
        .await;
    assert_eq!(running.remaining_seconds, None);

    let stopped = client.stop().await.unwrap();
    assert!(stopped.is_success());
    let data = stopped.data.unwrap();
    let session = data.session.unwrap();
    assert!(session.work_duration_seconds >= 1);
    assert_eq!(session.mode, TimerMode::Flow);
    assert_eq!(session.details.category, "開発");
    assert_eq!(data.on_break, Some(true));
    assert_eq!(data.break_remaining_seconds, Some(FLOW_MIN_BREAK));

    // セッションはファイルに保存されている
    let store = JsonSessionStore::new(daemon.paths.sessions_path());
    assert_eq!(store.all().unwrap(), vec![session]);

    let skipped = client.skip_break().await.unwrap();
    assert!(skipped.is_success());
    let idle = daemon
        .wait_for_status(|data| data.on_break == Some(false))
        .await;
    assert_eq!(idle.state.as_deref(), Some("idle"));

    daemon.shutdown().await;
}

// TC-E-002: Traditionalモードの一時停止・再開・停止
#[tokio::test]
async fn test_e2e_traditional_pause_resume_stop() {
    let daemon = RunningDaemon::start().await;
    let client = daemon.client();

    client
        .start(start_args("Traditional作業", ModeArg::Traditional))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;

    let paused = client.pause().await.unwrap().data.unwrap();
    let elapsed_at_pause = paused.elapsed_seconds.unwrap();
    assert!(elapsed_at_pause >= 1);

    // 一時停止中は経過時間が進まない
    tokio::time::sleep(Duration::from_millis(1200)).await;
    let status = client.status().await.unwrap().data.unwrap();
    assert_eq!(status.state.as_deref(), Some("paused"));
    assert_eq!(status.elapsed_seconds, Some(elapsed_at_pause));

    let resumed = client.resume().await.unwrap().data.unwrap();
    assert_eq!(resumed.elapsed_seconds, Some(elapsed_at_pause));
    assert_eq!(resumed.remaining_seconds, Some(1500 - elapsed_at_pause));

    let stopped = client.stop().await.unwrap().data.unwrap();
    let session = stopped.session.unwrap();
    assert!(session.work_duration_seconds >= elapsed_at_pause);
    // Traditionalモードは停止で休憩に入らない
    assert_eq!(stopped.on_break, Some(false));
    assert_eq!(stopped.state.as_deref(), Some("idle"));

    daemon.shutdown().await;
}

// TC-E-003: 取り消しはセッションを残さない
#[tokio::test]
async fn test_e2e_cancel_leaves_no_session() {
    let daemon = RunningDaemon::start().await;
    let client = daemon.client();

    client
        .start(start_args("取り消す作業", ModeArg::Flow))
        .await
        .unwrap();
    let cancelled = client.cancel().await.unwrap();
    assert!(cancelled.is_success());

    let store = JsonSessionStore::new(daemon.paths.sessions_path());
    assert!(store.all().unwrap().is_empty());

    let status = client.status().await.unwrap().data.unwrap();
    assert_eq!(status.state.as_deref(), Some("idle"));
    assert!(status.task_name.is_none());

    daemon.shutdown().await;
}

// TC-E-004: 設定ファイルの休憩率が停止時に反映される
#[tokio::test]
async fn test_e2e_settings_change_applies_to_next_stop() {
    let daemon = RunningDaemon::start().await;
    let client = daemon.client();

    client
        .start(start_args("設定確認", ModeArg::Flow))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;

    // デーモン起動後にCLIから設定を変更した場合と同じ
    let settings = FileSettings::new(daemon.paths.settings_path());
    settings.set_flow_break_percent(50).unwrap();

    let stopped = client.stop().await.unwrap().data.unwrap();
    let work = stopped.session.unwrap().work_duration_seconds;
    assert_eq!(
        stopped.break_remaining_seconds,
        Some(break_duration(TimerMode::Flow, work, 50))
    );

    daemon.shutdown().await;
}

// TC-E-005: デーモン再起動後もセッションログが残る
#[tokio::test]
async fn test_e2e_sessions_survive_restart() {
    let daemon = RunningDaemon::start().await;
    let client = daemon.client();
    client
        .start(start_args("再起動前", ModeArg::Traditional))
        .await
        .unwrap();
    client.stop().await.unwrap();
    let dir = daemon.shutdown().await;

    let daemon = RunningDaemon::start_in(dir).await;
    let status = daemon.client().status().await.unwrap().data.unwrap();
    assert_eq!(status.state.as_deref(), Some("idle"));

    let store = JsonSessionStore::new(daemon.paths.sessions_path());
    let sessions = store.all().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].task_name, "再起動前");

    daemon.shutdown().await;
}
