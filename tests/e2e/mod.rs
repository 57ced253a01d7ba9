//! エンドツーエンドテスト
//!
//! 一時ディレクトリでデーモンを起動し、IPCクライアントから操作する。

pub mod performance;
pub mod scenarios;
pub mod support;
