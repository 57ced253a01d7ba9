//! タイマー状態機械の統合テスト
//!
//! 時間計算と状態遷移の性質を公開APIから検証する。

use chrono::{Duration, TimeZone, Utc};
use timetracker::timer::logic::{
    break_duration, is_traditional_work_complete, traditional_remaining,
    TRADITIONAL_BREAK_DURATION,
};
use timetracker::timer::{TimerEffect, TimerError, TimerMachine};
use timetracker::types::{SessionDetails, TimerMode, TimerState};

fn start_machine(mode: TimerMode) -> TimerMachine {
    let mut machine = TimerMachine::new(mode);
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    machine
        .start("統合テスト", SessionDetails::default(), now)
        .unwrap();
    machine
}

fn tick_range(machine: &mut TimerMachine, from: u32, to: u32) -> Vec<TimerEffect> {
    let mut effects = Vec::new();
    for second in from..=to {
        effects.extend(machine.on_tick(second));
    }
    effects
}

// ============================================================================
// 時間計算
// ============================================================================

#[test]
fn test_traditional_remaining_is_saturating() {
    for elapsed in [0u32, 1, 600, 1499, 1500, 1501, 10_000] {
        assert_eq!(traditional_remaining(elapsed), 1500u32.saturating_sub(elapsed));
    }
}

#[test]
fn test_traditional_work_complete_boundary() {
    assert!(!is_traditional_work_complete(1499));
    assert!(is_traditional_work_complete(1500));
    assert!(is_traditional_work_complete(1800));
}

#[test]
fn test_flow_break_duration_clamped() {
    assert_eq!(break_duration(TimerMode::Flow, 1500, 20), 300);
    assert_eq!(break_duration(TimerMode::Flow, 60, 20), 300);
    assert_eq!(break_duration(TimerMode::Flow, 18_000, 20), 1200);
    assert_eq!(break_duration(TimerMode::Flow, 3000, 30), 900);
}

#[test]
fn test_traditional_break_is_fixed() {
    for (work, percent) in [(0, 20), (1500, 50), (18_000, 1)] {
        assert_eq!(
            break_duration(TimerMode::Traditional, work, percent),
            TRADITIONAL_BREAK_DURATION
        );
    }
}

// ============================================================================
// 状態遷移
// ============================================================================

#[test]
fn test_start_rejects_blank_task_name() {
    let mut machine = TimerMachine::new(TimerMode::Flow);

    for name in ["", "   ", "\t\n"] {
        let result = machine.start(name, SessionDetails::default(), Utc::now());
        assert_eq!(result, Err(TimerError::EmptyTaskName));
        assert_eq!(machine.state(), TimerState::Idle);
    }
}

#[test]
fn test_traditional_cycle_break_and_resume() {
    let mut machine = start_machine(TimerMode::Traditional);

    let effects = tick_range(&mut machine, 1, 1500);

    assert!(effects.contains(&TimerEffect::BreakRequested {
        duration_seconds: 300
    }));
    assert!(machine.is_on_break());
    assert_eq!(machine.state(), TimerState::Running);

    let effects = machine.complete_break();

    assert_eq!(effects, vec![TimerEffect::TickerStarted { from_seconds: 0 }]);
    assert_eq!(machine.state(), TimerState::Running);
    assert!(!machine.is_on_break());
    assert_eq!(machine.elapsed_seconds(), 0);
    assert_eq!(machine.breaks_taken(), 1);
}

#[test]
fn test_flow_stop_creates_session_then_break() {
    let mut machine = start_machine(TimerMode::Flow);
    tick_range(&mut machine, 1, 100);

    let effects = machine.stop(Utc::now(), 20);

    let sessions: Vec<_> = effects
        .iter()
        .filter_map(|effect| match effect {
            TimerEffect::SessionCreated(session) => Some(session),
            _ => None,
        })
        .collect();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].work_duration_seconds, 100);
    assert_eq!(sessions[0].mode, TimerMode::Flow);
    assert_eq!(
        effects.last(),
        Some(&TimerEffect::BreakRequested {
            duration_seconds: break_duration(TimerMode::Flow, 100, 20)
        })
    );

    machine.skip_break();
    assert_eq!(machine.state(), TimerState::Idle);
}

#[test]
fn test_pause_resume_preserves_elapsed() {
    let mut machine = start_machine(TimerMode::Traditional);
    tick_range(&mut machine, 1, 321);

    machine.pause();
    // 一時停止中のティックは無視される
    machine.on_tick(400);
    assert_eq!(machine.elapsed_seconds(), 321);

    let effects = machine.resume();

    assert_eq!(effects, vec![TimerEffect::TickerStarted { from_seconds: 321 }]);
    assert_eq!(machine.elapsed_seconds(), 321);
    assert_eq!(machine.remaining_seconds(), Some(1500 - 321));
}

#[test]
fn test_cancel_from_paused_discards_everything() {
    let mut machine = start_machine(TimerMode::Flow);
    tick_range(&mut machine, 1, 50);
    machine.pause();

    let effects = machine.cancel();

    assert!(effects
        .iter()
        .all(|effect| !matches!(effect, TimerEffect::SessionCreated(_))));
    assert_eq!(machine.state(), TimerState::Idle);
    assert_eq!(machine.elapsed_seconds(), 0);
    assert_eq!(machine.accumulated_work_seconds(), 0);
    assert_eq!(machine.breaks_taken(), 0);
    assert!(machine.task_name().is_none());
}

#[test]
fn test_multi_segment_traditional_session() {
    let mut machine = start_machine(TimerMode::Traditional);
    let started = machine.started_at().unwrap();
    tick_range(&mut machine, 1, 1500);
    machine.complete_break();
    tick_range(&mut machine, 1, 200);

    let ended = started + Duration::seconds(2000);
    let effects = machine.stop(ended, 20);

    let session = effects
        .iter()
        .find_map(|effect| match effect {
            TimerEffect::SessionCreated(session) => Some(session.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(session.work_duration_seconds, 1700);
    assert_eq!(session.breaks_taken, 1);
    assert_eq!(session.start_time, started);
    assert_eq!(session.end_time, ended);
    assert_eq!(machine.state(), TimerState::Idle);
}

#[test]
fn test_traditional_skip_break_discards_unsaved_work() {
    let mut machine = start_machine(TimerMode::Traditional);
    tick_range(&mut machine, 1, 1500);

    let effects = machine.skip_break();

    assert!(effects.is_empty());
    assert_eq!(machine.state(), TimerState::Idle);
    assert_eq!(machine.total_work_seconds(), 0);
}

#[test]
fn test_invalid_transitions_are_noops() {
    let mut machine = TimerMachine::new(TimerMode::Flow);
    assert!(machine.pause().is_empty());
    assert!(machine.resume().is_empty());
    assert!(machine.stop(Utc::now(), 20).is_empty());
    assert!(machine.cancel().is_empty());
    assert!(machine.complete_break().is_empty());
    assert!(machine.skip_break().is_empty());
    assert!(machine.on_tick(10).is_empty());
    assert_eq!(machine.state(), TimerState::Idle);
}
