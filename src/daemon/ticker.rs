//! ティックソース
//!
//! 作業セグメントの経過秒数を1秒ごとに配信する。
//! 各ティックには起動ごとの世代番号が付き、停止済みの配信から
//! 遅れて届いた値を受信側で捨てられる。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::debug;

/// 1回分のティック
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// 配信を開始したときの世代番号
    pub generation: u64,
    /// セグメント開始からの経過秒数
    pub seconds: u32,
}

/// 起動中のティックタスクのハンドル
///
/// ドロップまたは [`TickHandle::cancel`] でタスクを止める。
#[derive(Debug, Default)]
pub struct TickHandle {
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl TickHandle {
    /// タスクを持たないハンドル（テスト用のティックソース向け）
    pub fn noop() -> Self {
        Self::detached(0)
    }

    /// タスクを持たず、世代番号だけを持つハンドル
    pub fn detached(generation: u64) -> Self {
        Self {
            task: None,
            generation,
        }
    }

    pub fn from_task(task: JoinHandle<()>, generation: u64) -> Self {
        Self {
            task: Some(task),
            generation,
        }
    }

    /// このハンドルが配信するティックの世代番号
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// ティックの発生源
pub trait TickSource: Send + Sync {
    /// `initial_seconds` から数え始め、`initial_seconds + 1` 以降を配信する
    fn start(&self, initial_seconds: u32) -> TickHandle;

    /// 配信を止める
    fn stop(&self, mut handle: TickHandle) {
        handle.cancel();
    }
}

/// tokioのIntervalによるティックソース
#[derive(Debug, Clone)]
pub struct IntervalTickSource {
    tick_tx: mpsc::UnboundedSender<Tick>,
    last_generation: Arc<AtomicU64>,
}

impl IntervalTickSource {
    pub fn new(tick_tx: mpsc::UnboundedSender<Tick>) -> Self {
        Self {
            tick_tx,
            last_generation: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl TickSource for IntervalTickSource {
    fn start(&self, initial_seconds: u32) -> TickHandle {
        let generation = self.last_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let tick_tx = self.tick_tx.clone();
        let task = tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // 最初のtickは即座に完了する
            ticker.tick().await;

            let mut seconds = initial_seconds;
            loop {
                ticker.tick().await;
                seconds = seconds.saturating_add(1);
                if tick_tx.send(Tick { generation, seconds }).is_err() {
                    debug!("ティックの受信側が閉じられました");
                    break;
                }
            }
        });
        debug!("ティック配信を開始しました: 世代{} ({}秒から)", generation, initial_seconds);
        TickHandle::from_task(task, generation)
    }
}

// ============================================================================
// Tests
// ============================================================================
