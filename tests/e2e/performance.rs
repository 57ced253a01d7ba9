//! パフォーマンステスト
//!
//! TC-P-001 to TC-P-002: IPC応答とエンジン操作の遅延を確認する。

use std::sync::Arc;
use std::time::{Duration, Instant};

use timetracker::cli::commands::{ModeArg, StartArgs};
use timetracker::daemon::{
    Collaborators, CountdownBreakPresenter, IntervalTickSource, TimerEngine,
};
use timetracker::settings::MemorySettings;
use timetracker::store::MemorySessionStore;
use timetracker::types::StartParams;
use tokio::sync::mpsc;

use super::support::RunningDaemon;

// TC-P-001: IPC通信遅延（50ms以内）
#[tokio::test]
async fn test_performance_ipc_latency() {
    let daemon = RunningDaemon::start().await;
    let client = daemon.client();
    client
        .start(StartArgs {
            task: "計測".to_string(),
            mode: Some(ModeArg::Flow),
            category: None,
            description: None,
            issue: None,
        })
        .await
        .unwrap();

    let start = Instant::now();
    for _ in 0..10 {
        let response = client.status().await.unwrap();
        assert!(response.is_success());
    }
    let average = start.elapsed() / 10;

    assert!(
        average < Duration::from_millis(50),
        "IPC通信遅延が50msを超過: {:?}",
        average
    );

    daemon.shutdown().await;
}

// TC-P-002: 1000ティックの処理時間
#[tokio::test]
async fn test_performance_tick_processing() {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (tick_tx, _tick_rx) = mpsc::unbounded_channel();
    let (outcome_tx, _outcome_rx) = mpsc::unbounded_channel();
    let collaborators = Collaborators {
        store: Arc::new(MemorySessionStore::new()),
        settings: Arc::new(MemorySettings::default()),
        presenter: Arc::new(CountdownBreakPresenter::new(outcome_tx)),
        ticker: Arc::new(IntervalTickSource::new(tick_tx)),
    };
    let mut engine = TimerEngine::new(collaborators, event_tx);
    engine
        .start(StartParams {
            task_name: Some("計測".to_string()),
            ..Default::default()
        })
        .unwrap();

    let start = Instant::now();
    for second in 1..=1000 {
        engine.process_tick(second).unwrap();
    }
    let elapsed = start.elapsed();

    assert!(
        elapsed < Duration::from_millis(500),
        "ティック処理が500msを超過: {:?}",
        elapsed
    );
    assert_eq!(engine.snapshot().elapsed_seconds, 1000);

    let mut ticks = 0;
    while let Ok(event) = event_rx.try_recv() {
        if matches!(event, timetracker::daemon::TimerEvent::Tick { .. }) {
            ticks += 1;
        }
    }
    assert_eq!(ticks, 1000);

    engine.shutdown();
}
