//! タイマー計算ロジック
//!
//! Traditional / Flow 両モードの残り時間と休憩時間の計算を提供する。
//! すべて純粋関数で、状態を持たない。

use crate::types::TimerMode;

/// Traditionalモードの作業時間（秒）
pub const TRADITIONAL_WORK_DURATION: u32 = 25 * 60;
/// Traditionalモードの休憩時間（秒）
pub const TRADITIONAL_BREAK_DURATION: u32 = 5 * 60;

/// Flowモードの作業:休憩比率（5:1）
pub const FLOW_BREAK_RATIO: u32 = 5;
/// Flowモードの最短休憩（秒）
pub const FLOW_MIN_BREAK: u32 = 5 * 60;
/// Flowモードの最長休憩（秒）
pub const FLOW_MAX_BREAK: u32 = 20 * 60;

/// Flowモード休憩率のデフォルト（%）
pub const DEFAULT_FLOW_BREAK_PERCENT: u8 = 20;
/// Flowモード休憩率の下限（%）
pub const MIN_FLOW_BREAK_PERCENT: u8 = 1;
/// Flowモード休憩率の上限（%）
pub const MAX_FLOW_BREAK_PERCENT: u8 = 50;

/// Traditionalモードの残り時間（秒）
pub fn traditional_remaining(elapsed: u32) -> u32 {
    TRADITIONAL_WORK_DURATION.saturating_sub(elapsed)
}

/// Traditionalモードの作業セグメントが完了したかどうか
pub fn is_traditional_work_complete(elapsed: u32) -> bool {
    elapsed >= TRADITIONAL_WORK_DURATION
}

/// 休憩が完了したかどうか
pub fn is_break_complete(elapsed: u32, break_duration: u32) -> bool {
    elapsed >= break_duration
}

/// 休憩率を 1-50% の範囲に丸める
pub fn clamp_break_percent(percent: u8) -> u8 {
    percent.clamp(MIN_FLOW_BREAK_PERCENT, MAX_FLOW_BREAK_PERCENT)
}

/// モードに応じた休憩時間（秒）を計算
///
/// Traditionalモードは休憩率に関係なく常に5分。
/// Flowモードは `floor(work_seconds * percent / 100)` を 5-20分 に収める。
pub fn break_duration(mode: TimerMode, work_seconds: u32, flow_break_percent: u8) -> u32 {
    match mode {
        TimerMode::Traditional => TRADITIONAL_BREAK_DURATION,
        TimerMode::Flow => {
            let raw = u64::from(work_seconds) * u64::from(flow_break_percent) / 100;
            clamp_flow_break(raw)
        }
    }
}

/// 固定比率（5:1）でFlowモードの休憩時間を計算
pub fn flow_break_by_ratio(work_seconds: u32) -> u32 {
    clamp_flow_break(u64::from(work_seconds / FLOW_BREAK_RATIO))
}

fn clamp_flow_break(seconds: u64) -> u32 {
    seconds.clamp(u64::from(FLOW_MIN_BREAK), u64::from(FLOW_MAX_BREAK)) as u32
}
