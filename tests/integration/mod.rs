//! コンポーネント間統合テスト
//!
//! 各コンポーネント間の連携をテストする。
//!
//! ## テスト対象
//! - タイマー状態機械
//! - エンジンと外部コンポーネント（ストア・休憩・ティック）
//! - Daemon-CLI IPC通信

pub mod daemon_cli;
pub mod timer_machine;
