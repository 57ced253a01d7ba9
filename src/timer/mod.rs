//! タイマーモジュール
//!
//! 計算ロジックと状態機械を提供する。どちらもI/Oを行わない。

pub mod logic;
pub mod machine;

pub use machine::{BreakKind, TimerEffect, TimerError, TimerMachine, TimerSnapshot};
