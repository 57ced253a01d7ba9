//! タイマーエンジン
//!
//! 状態機械（[`TimerMachine`]）をティックソース、休憩プレゼンター、
//! セッションストア、設定と結び付ける。
//! 状態機械が返す副作用を順番に適用し、イベントを発火する。

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::daemon::break_mode::{BreakOutcome, BreakPresenter};
use crate::daemon::ticker::{Tick, TickHandle, TickSource};
use crate::settings::SettingsProvider;
use crate::store::SessionStore;
use crate::timer::{TimerEffect, TimerMachine, TimerSnapshot};
use crate::types::{Session, StartParams};

/// タイマーイベント
///
/// タイマーエンジンが発火するイベント。ログ出力や表示の更新に使用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// 作業開始
    WorkStarted { task_name: String },
    /// ティック（作業セグメントの経過秒数）
    Tick { elapsed_seconds: u32 },
    /// 一時停止
    Paused,
    /// 再開
    Resumed,
    /// セッションが確定した
    SessionAdded(Session),
    /// 休憩開始
    BreakStarted { duration_seconds: u32 },
    /// 休憩完了
    BreakCompleted,
    /// 休憩スキップ
    BreakSkipped,
    /// 取り消し
    Cancelled,
    /// 停止
    Stopped,
}

/// エンジンが使う外部コンポーネント
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn SessionStore>,
    pub settings: Arc<dyn SettingsProvider>,
    pub presenter: Arc<dyn BreakPresenter>,
    pub ticker: Arc<dyn TickSource>,
}

/// タイマーエンジン
///
/// # 使用方法
///
/// ```ignore
/// let (event_tx, mut event_rx) = mpsc::unbounded_channel();
/// let mut engine = TimerEngine::new(collaborators, event_tx);
///
/// // メインループ（Daemon側で実装）
/// loop {
///     tokio::select! {
///         Some(tick) = tick_rx.recv() => {
///             engine.handle_tick(tick)?;
///         }
///         Some(outcome) = outcome_rx.recv() => {
///             engine.on_break_outcome(outcome)?;
///         }
///     }
/// }
/// ```
pub struct TimerEngine {
    machine: TimerMachine,
    collaborators: Collaborators,
    tick_handle: Option<TickHandle>,
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerEngine {
    /// 新しいTimerEngineを作成
    pub fn new(collaborators: Collaborators, event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            machine: TimerMachine::default(),
            collaborators,
            tick_handle: None,
            event_tx,
        }
    }

    /// タイマーを開始
    pub fn start(&mut self, params: StartParams) -> Result<()> {
        if !self.machine.is_idle() {
            anyhow::bail!("タイマーは既に実行中です");
        }

        if let Some(mode) = params.mode {
            self.machine.set_mode(mode);
        }

        let task_name = params.task_name.as_deref().unwrap_or_default();
        let effects = self
            .machine
            .start(task_name, params.to_details(), Utc::now())?;
        self.apply(effects)?;

        info!(
            "作業を開始しました: {} ({})",
            self.machine.task_name().unwrap_or_default(),
            self.machine.mode().as_str()
        );
        self.emit(TimerEvent::WorkStarted {
            task_name: self.machine.task_name().unwrap_or_default().to_string(),
        })
    }

    /// タイマーを一時停止
    pub fn pause(&mut self) -> Result<()> {
        if self.machine.is_on_break() {
            anyhow::bail!("休憩中は一時停止できません");
        }
        if !self.machine.is_running() {
            anyhow::bail!("タイマーは実行されていません");
        }

        let effects = self.machine.pause();
        self.apply(effects)?;
        self.emit(TimerEvent::Paused)
    }

    /// タイマーを再開
    pub fn resume(&mut self) -> Result<()> {
        if !self.machine.is_paused() {
            anyhow::bail!("タイマーは一時停止していません");
        }

        let effects = self.machine.resume();
        self.apply(effects)?;
        self.emit(TimerEvent::Resumed)
    }

    /// タイマーを停止し、確定したセッションを返す
    pub fn stop(&mut self) -> Result<Option<Session>> {
        if self.machine.is_on_break() {
            anyhow::bail!("休憩中です");
        }
        if !self.machine.is_running() {
            anyhow::bail!("タイマーは実行されていません");
        }

        // 休憩率は停止の時点で読み出す
        let percent = self.collaborators.settings.flow_break_percent();
        let effects = self.machine.stop(Utc::now(), percent);
        let session = effects.iter().find_map(|effect| match effect {
            TimerEffect::SessionCreated(session) => Some(session.clone()),
            _ => None,
        });

        self.emit(TimerEvent::Stopped)?;
        self.apply(effects)?;
        Ok(session)
    }

    /// 作業を取り消す（セッションは保存しない）
    pub fn cancel(&mut self) -> Result<()> {
        if self.machine.is_on_break() {
            anyhow::bail!("休憩中は取り消せません");
        }
        if self.machine.is_idle() {
            anyhow::bail!("タイマーは実行されていません");
        }

        let effects = self.machine.cancel();
        self.apply(effects)?;
        info!("作業を取り消しました");
        self.emit(TimerEvent::Cancelled)
    }

    /// 休憩のスキップを要求する
    ///
    /// スキップの結果は休憩プレゼンターから [`BreakOutcome::Skipped`] として届く。
    pub fn skip_break(&mut self) -> Result<()> {
        if !self.machine.is_on_break() {
            anyhow::bail!("休憩中ではありません");
        }

        if !self.collaborators.presenter.skip() {
            // プレゼンターが休憩を保持していない場合は直接終了させる
            warn!("休憩プレゼンターが休憩中ではありません");
            self.on_break_outcome(BreakOutcome::Skipped)?;
        }
        Ok(())
    }

    /// ティックソースから届いたティックを処理
    ///
    /// 現在のティックハンドルと世代が一致しないティックは、停止済みの
    /// 配信から遅れて届いたものとして捨てる。
    ///
    /// # 戻り値
    ///
    /// - `Ok(true)`: ティックを反映した
    /// - `Ok(false)`: 世代が古い、作業中ではない、または古いティック
    /// - `Err(...)`: イベント送信に失敗
    pub fn handle_tick(&mut self, tick: Tick) -> Result<bool> {
        let current = self.tick_handle.as_ref().map(TickHandle::generation);
        if current != Some(tick.generation) {
            debug!(
                "世代の異なるティックを無視します: {:?} (現在: {:?})",
                tick, current
            );
            return Ok(false);
        }
        self.process_tick(tick.seconds)
    }

    /// 1ティックを処理
    ///
    /// # 戻り値
    ///
    /// - `Ok(true)`: ティックを反映した
    /// - `Ok(false)`: 作業中ではない、または古いティック
    /// - `Err(...)`: イベント送信に失敗
    pub fn process_tick(&mut self, elapsed_seconds: u32) -> Result<bool> {
        if !self.machine.is_running() || elapsed_seconds <= self.machine.elapsed_seconds() {
            return Ok(false);
        }

        let effects = self.machine.on_tick(elapsed_seconds);
        self.emit(TimerEvent::Tick { elapsed_seconds })?;
        self.apply(effects)?;
        Ok(true)
    }

    /// 休憩プレゼンターからの結果を処理
    pub fn on_break_outcome(&mut self, outcome: BreakOutcome) -> Result<()> {
        if !self.machine.is_on_break() {
            debug!("休憩中ではないため休憩結果を無視します: {:?}", outcome);
            return Ok(());
        }

        match outcome {
            BreakOutcome::Completed => {
                let effects = self.machine.complete_break();
                self.emit(TimerEvent::BreakCompleted)?;
                self.apply(effects)
            }
            BreakOutcome::Skipped => {
                let effects = self.machine.skip_break();
                self.emit(TimerEvent::BreakSkipped)?;
                self.apply(effects)
            }
        }
    }

    /// ティックソースを止める（デーモン終了時）
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.tick_handle.take() {
            self.collaborators.ticker.stop(handle);
        }
    }

    /// 現在の状態を取得
    pub fn snapshot(&self) -> TimerSnapshot {
        self.machine.snapshot()
    }

    /// 休憩の残り秒数
    pub fn break_remaining_seconds(&self) -> Option<u32> {
        if self.machine.is_on_break() {
            self.collaborators.presenter.remaining_seconds()
        } else {
            None
        }
    }

    pub fn machine(&self) -> &TimerMachine {
        &self.machine
    }

    /// 副作用を順番に適用
    fn apply(&mut self, effects: Vec<TimerEffect>) -> Result<()> {
        for effect in effects {
            match effect {
                TimerEffect::TickerStarted { from_seconds } => {
                    if let Some(handle) = self.tick_handle.take() {
                        self.collaborators.ticker.stop(handle);
                    }
                    self.tick_handle = Some(self.collaborators.ticker.start(from_seconds));
                }
                TimerEffect::TickerStopped => {
                    if let Some(handle) = self.tick_handle.take() {
                        self.collaborators.ticker.stop(handle);
                    }
                }
                TimerEffect::SessionCreated(session) => {
                    match self.collaborators.store.append(session.clone()) {
                        Ok(saved) => info!(
                            "セッションを記録しました: {} ({}秒)",
                            saved.task_name, saved.work_duration_seconds
                        ),
                        Err(e) => warn!("セッションの保存に失敗しました: {}", e),
                    }
                    self.emit(TimerEvent::SessionAdded(session))?;
                }
                TimerEffect::BreakRequested { duration_seconds } => {
                    self.collaborators.presenter.activate(duration_seconds);
                    self.emit(TimerEvent::BreakStarted { duration_seconds })?;
                }
            }
        }
        Ok(())
    }

    fn emit(&self, event: TimerEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .context("Failed to send timer event")
    }
}

// ============================================================================
// Tests
// ============================================================================
