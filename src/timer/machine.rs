//! タイマー状態機械
//!
//! タイマーモード、実行状態、経過時間の累積、休憩の発火判定を担当する。
//! I/Oは一切行わず、各遷移は副作用の記述（[`TimerEffect`]）のリストを返す。
//! 副作用の適用は呼び出し側（[`crate::daemon::TimerEngine`]）の責務。
//!
//! # 使用方法
//!
//! ```
//! use chrono::Utc;
//! use timetracker::timer::{TimerEffect, TimerMachine};
//! use timetracker::types::{SessionDetails, TimerMode, TimerState};
//!
//! let mut machine = TimerMachine::new(TimerMode::Flow);
//! machine.start("設計", SessionDetails::default(), Utc::now()).unwrap();
//! for second in 1..=100 {
//!     machine.on_tick(second);
//! }
//! let effects = machine.stop(Utc::now(), 20);
//! assert!(matches!(effects[1], TimerEffect::SessionCreated(_)));
//! assert_eq!(machine.state(), TimerState::Running);
//! assert!(machine.is_on_break());
//! ```

use std::mem;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::timer::logic::{
    break_duration, is_traditional_work_complete, traditional_remaining,
    DEFAULT_FLOW_BREAK_PERCENT,
};
use crate::types::{Session, SessionDetails, TimerMode, TimerState};

/// 状態機械の入力検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// タスク名が空（または空白のみ）
    #[error("タスク名を入力してから開始してください")]
    EmptyTaskName,
}

/// 遷移によって発生する副作用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEffect {
    /// ティックソースを `from_seconds` から開始する
    TickerStarted { from_seconds: u32 },
    /// ティックソースを停止する
    TickerStopped,
    /// セッションが確定した（保存と通知を行う）
    SessionCreated(Session),
    /// 休憩プレゼンターを起動する
    BreakRequested { duration_seconds: u32 },
}

/// 休憩の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKind {
    /// Traditionalモードのサイクル休憩（完了後に作業を再開）
    Cycle,
    /// Flowモードの停止後休憩（完了後は待機に戻る）
    Final,
}

/// 進行中の作業の累積値
#[derive(Debug, Clone)]
struct WorkInProgress {
    task_name: String,
    details: SessionDetails,
    started_at: DateTime<Utc>,
    elapsed_seconds: u32,
    accumulated_work_seconds: u32,
    breaks_taken: u32,
}

impl WorkInProgress {
    fn new(task_name: String, details: SessionDetails, started_at: DateTime<Utc>) -> Self {
        Self {
            task_name,
            details,
            started_at,
            elapsed_seconds: 0,
            accumulated_work_seconds: 0,
            breaks_taken: 0,
        }
    }

    fn total_work_seconds(&self) -> u32 {
        self.accumulated_work_seconds
            .saturating_add(self.elapsed_seconds)
    }

    /// 現在のセグメントの経過時間を累積に畳み込む
    fn fold_segment(&mut self) {
        self.accumulated_work_seconds = self.total_work_seconds();
        self.elapsed_seconds = 0;
    }

    fn to_session(&self, mode: TimerMode, ended_at: DateTime<Utc>) -> Session {
        Session::new(
            self.task_name.clone(),
            mode,
            self.total_work_seconds(),
            self.breaks_taken,
            self.details.clone(),
            self.started_at,
            ended_at,
        )
    }
}

#[derive(Debug, Clone)]
enum Phase {
    Idle,
    Running(WorkInProgress),
    Paused(WorkInProgress),
    OnBreak {
        work: WorkInProgress,
        kind: BreakKind,
        duration_seconds: u32,
    },
}

/// 状態のスナップショット（表示・IPC用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub mode: TimerMode,
    pub elapsed_seconds: u32,
    /// Traditionalモードの作業中のみ
    pub remaining_seconds: Option<u32>,
    pub work_seconds: u32,
    pub breaks_taken: u32,
    pub task_name: Option<String>,
    pub on_break: bool,
    pub break_duration_seconds: Option<u32>,
}

/// タイマー状態機械
///
/// 1インスタンスにつき進行中のセッションは高々1つ。
/// 不正な状態からの操作は何もせず空の副作用リストを返す。
#[derive(Debug, Clone)]
pub struct TimerMachine {
    mode: TimerMode,
    phase: Phase,
}

impl Default for TimerMachine {
    fn default() -> Self {
        Self::new(TimerMode::default())
    }
}

impl TimerMachine {
    /// 待機状態の状態機械を作成
    pub fn new(mode: TimerMode) -> Self {
        Self {
            mode,
            phase: Phase::Idle,
        }
    }

    /// モードを切り替える（待機中のみ）
    ///
    /// 切り替えた場合は `true` を返す。
    pub fn set_mode(&mut self, mode: TimerMode) -> bool {
        if !matches!(self.phase, Phase::Idle) {
            return false;
        }
        self.mode = mode;
        true
    }

    /// 作業を開始
    ///
    /// タスク名が空の場合は [`TimerError::EmptyTaskName`] を返し、状態は変えない。
    pub fn start(
        &mut self,
        task_name: &str,
        details: SessionDetails,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimerEffect>, TimerError> {
        let task_name = task_name.trim();
        if task_name.is_empty() {
            return Err(TimerError::EmptyTaskName);
        }
        if !matches!(self.phase, Phase::Idle) {
            return Ok(Vec::new());
        }

        self.phase = Phase::Running(WorkInProgress::new(task_name.to_string(), details, now));
        Ok(vec![TimerEffect::TickerStarted { from_seconds: 0 }])
    }

    /// ティックを処理
    ///
    /// `seconds` は現在のセグメント開始からの経過秒数。
    /// 現在値以下のティック（重複・遅延分）は無視する。
    pub fn on_tick(&mut self, seconds: u32) -> Vec<TimerEffect> {
        let segment_complete = match &mut self.phase {
            Phase::Running(work) if seconds > work.elapsed_seconds => {
                work.elapsed_seconds = seconds;
                self.mode == TimerMode::Traditional
                    && is_traditional_work_complete(work.elapsed_seconds)
            }
            _ => return Vec::new(),
        };

        if segment_complete {
            self.begin_cycle_break()
        } else {
            Vec::new()
        }
    }

    /// 一時停止
    pub fn pause(&mut self) -> Vec<TimerEffect> {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Running(work) => {
                self.phase = Phase::Paused(work);
                vec![TimerEffect::TickerStopped]
            }
            other => {
                self.phase = other;
                Vec::new()
            }
        }
    }

    /// 再開（一時停止時の経過時間から継続）
    pub fn resume(&mut self) -> Vec<TimerEffect> {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Paused(work) => {
                let from_seconds = work.elapsed_seconds;
                self.phase = Phase::Running(work);
                vec![TimerEffect::TickerStarted { from_seconds }]
            }
            other => {
                self.phase = other;
                Vec::new()
            }
        }
    }

    /// 停止してセッションを確定
    ///
    /// セッションの作業時間はそれまでの全セグメントと現在の経過時間の合計。
    /// Flowモードで経過時間がある場合は、セッション確定の後に休憩を要求する。
    /// `flow_break_percent` はこの時点の設定値を渡すこと。
    pub fn stop(&mut self, now: DateTime<Utc>, flow_break_percent: u8) -> Vec<TimerEffect> {
        let mut work = match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Running(work) => work,
            other => {
                self.phase = other;
                return Vec::new();
            }
        };

        let segment_seconds = work.elapsed_seconds;
        let session = work.to_session(self.mode, now);
        let mut effects = vec![
            TimerEffect::TickerStopped,
            TimerEffect::SessionCreated(session),
        ];

        if self.mode == TimerMode::Flow && segment_seconds > 0 {
            work.fold_segment();
            let duration_seconds =
                break_duration(self.mode, work.accumulated_work_seconds, flow_break_percent);
            self.phase = Phase::OnBreak {
                work,
                kind: BreakKind::Final,
                duration_seconds,
            };
            effects.push(TimerEffect::BreakRequested { duration_seconds });
        }

        effects
    }

    /// 取り消し（セッションを作成せずに待機へ戻る）
    pub fn cancel(&mut self) -> Vec<TimerEffect> {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Running(_) => vec![TimerEffect::TickerStopped],
            Phase::Paused(_) => Vec::new(),
            other => {
                self.phase = other;
                Vec::new()
            }
        }
    }

    /// 休憩完了
    pub fn complete_break(&mut self) -> Vec<TimerEffect> {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::OnBreak {
                mut work,
                kind: BreakKind::Cycle,
                ..
            } => {
                work.breaks_taken = work.breaks_taken.saturating_add(1);
                work.elapsed_seconds = 0;
                self.phase = Phase::Running(work);
                vec![TimerEffect::TickerStarted { from_seconds: 0 }]
            }
            Phase::OnBreak {
                kind: BreakKind::Final,
                ..
            } => Vec::new(),
            other => {
                self.phase = other;
                Vec::new()
            }
        }
    }

    /// 休憩スキップ
    ///
    /// どちらのモードでも待機に戻る。Traditionalモードでは
    /// それまでの累積作業時間はセッションとして保存されない。
    pub fn skip_break(&mut self) -> Vec<TimerEffect> {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::OnBreak { .. } => Vec::new(),
            other => {
                self.phase = other;
                Vec::new()
            }
        }
    }

    fn begin_cycle_break(&mut self) -> Vec<TimerEffect> {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Running(mut work) => {
                work.fold_segment();
                let duration_seconds = break_duration(
                    self.mode,
                    work.accumulated_work_seconds,
                    DEFAULT_FLOW_BREAK_PERCENT,
                );
                self.phase = Phase::OnBreak {
                    work,
                    kind: BreakKind::Cycle,
                    duration_seconds,
                };
                vec![
                    TimerEffect::TickerStopped,
                    TimerEffect::BreakRequested { duration_seconds },
                ]
            }
            other => {
                self.phase = other;
                Vec::new()
            }
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    /// 現在の状態
    ///
    /// 休憩中は `Running` を返す（[`Self::is_on_break`] で区別する）。
    pub fn state(&self) -> TimerState {
        match self.phase {
            Phase::Idle => TimerState::Idle,
            Phase::Running(_) | Phase::OnBreak { .. } => TimerState::Running,
            Phase::Paused(_) => TimerState::Paused,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// 作業を計測中かどうか（休憩中は含まない）
    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running(_))
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.phase, Phase::Paused(_))
    }

    pub fn is_on_break(&self) -> bool {
        matches!(self.phase, Phase::OnBreak { .. })
    }

    pub fn break_kind(&self) -> Option<BreakKind> {
        match &self.phase {
            Phase::OnBreak { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// 要求中の休憩時間（秒）
    pub fn pending_break_seconds(&self) -> Option<u32> {
        match &self.phase {
            Phase::OnBreak {
                duration_seconds, ..
            } => Some(*duration_seconds),
            _ => None,
        }
    }

    fn work(&self) -> Option<&WorkInProgress> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Running(work) | Phase::Paused(work) => Some(work),
            Phase::OnBreak { work, .. } => Some(work),
        }
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.work().map_or(0, |work| work.elapsed_seconds)
    }

    pub fn accumulated_work_seconds(&self) -> u32 {
        self.work().map_or(0, |work| work.accumulated_work_seconds)
    }

    /// 累積作業時間と現在の経過時間の合計
    pub fn total_work_seconds(&self) -> u32 {
        self.work().map_or(0, WorkInProgress::total_work_seconds)
    }

    pub fn breaks_taken(&self) -> u32 {
        self.work().map_or(0, |work| work.breaks_taken)
    }

    pub fn task_name(&self) -> Option<&str> {
        self.work().map(|work| work.task_name.as_str())
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.work().map(|work| work.started_at)
    }

    /// Traditionalモードの作業セグメントの残り時間（秒）
    pub fn remaining_seconds(&self) -> Option<u32> {
        match (&self.phase, self.mode) {
            (Phase::Running(work) | Phase::Paused(work), TimerMode::Traditional) => {
                Some(traditional_remaining(work.elapsed_seconds))
            }
            _ => None,
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state(),
            mode: self.mode,
            elapsed_seconds: self.elapsed_seconds(),
            remaining_seconds: self.remaining_seconds(),
            work_seconds: self.total_work_seconds(),
            breaks_taken: self.breaks_taken(),
            task_name: self.task_name().map(str::to_string),
            on_break: self.is_on_break(),
            break_duration_seconds: self.pending_break_seconds(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
