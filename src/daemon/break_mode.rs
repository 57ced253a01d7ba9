//! 休憩モード
//!
//! 休憩のカウントダウンを行い、完了またはスキップを1回だけ通知する。

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

/// 休憩の終わり方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakOutcome {
    /// 休憩時間を満了した
    Completed,
    /// ユーザーがスキップした
    Skipped,
}

/// 休憩の提示先
pub trait BreakPresenter: Send + Sync {
    /// 休憩を開始する（休憩中の呼び出しは無視）
    fn activate(&self, duration_seconds: u32);

    /// 休憩をスキップする（休憩中でなければ `false`）
    fn skip(&self) -> bool;

    fn is_active(&self) -> bool;

    /// 休憩の残り秒数
    fn remaining_seconds(&self) -> Option<u32>;
}

#[derive(Debug, Default)]
struct CountdownState {
    active: bool,
    remaining_seconds: u32,
    /// 有効化ごとに増える番号。古いタスクからの完了通知を捨てる
    generation: u64,
    task: Option<JoinHandle<()>>,
}

/// tokioのタスクでカウントダウンする休憩プレゼンター
#[derive(Debug, Clone)]
pub struct CountdownBreakPresenter {
    state: Arc<Mutex<CountdownState>>,
    outcome_tx: mpsc::UnboundedSender<BreakOutcome>,
}

impl CountdownBreakPresenter {
    pub fn new(outcome_tx: mpsc::UnboundedSender<BreakOutcome>) -> Self {
        Self {
            state: Arc::new(Mutex::new(CountdownState::default())),
            outcome_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CountdownState> {
        lock_state(&self.state)
    }
}

fn lock_state(state: &Mutex<CountdownState>) -> MutexGuard<'_, CountdownState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn send_outcome(outcome_tx: &mpsc::UnboundedSender<BreakOutcome>, outcome: BreakOutcome) {
    if outcome_tx.send(outcome).is_err() {
        warn!("休憩結果の受信側が閉じられています: {:?}", outcome);
    }
}

impl BreakPresenter for CountdownBreakPresenter {
    fn activate(&self, duration_seconds: u32) {
        let mut state = self.lock();
        if state.active {
            debug!("休憩中のため休憩の開始要求を無視します");
            return;
        }

        state.active = true;
        state.remaining_seconds = duration_seconds;
        state.generation = state.generation.wrapping_add(1);
        let generation = state.generation;

        let shared = Arc::clone(&self.state);
        let outcome_tx = self.outcome_tx.clone();
        state.task = Some(tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;

            loop {
                {
                    let mut state = lock_state(&shared);
                    if !state.active || state.generation != generation {
                        return;
                    }
                    if state.remaining_seconds == 0 {
                        state.active = false;
                        state.task = None;
                        send_outcome(&outcome_tx, BreakOutcome::Completed);
                        return;
                    }
                }
                ticker.tick().await;
                let mut state = lock_state(&shared);
                if state.generation == generation {
                    state.remaining_seconds = state.remaining_seconds.saturating_sub(1);
                }
            }
        }));

        info!("休憩を開始しました: {}秒", duration_seconds);
    }

    fn skip(&self) -> bool {
        let mut state = self.lock();
        if !state.active {
            return false;
        }

        state.active = false;
        state.remaining_seconds = 0;
        if let Some(task) = state.task.take() {
            task.abort();
        }
        send_outcome(&self.outcome_tx, BreakOutcome::Skipped);
        info!("休憩をスキップしました");
        true
    }

    fn is_active(&self) -> bool {
        self.lock().active
    }

    fn remaining_seconds(&self) -> Option<u32> {
        let state = self.lock();
        state.active.then_some(state.remaining_seconds)
    }
}

// ============================================================================
// Tests
// ============================================================================
