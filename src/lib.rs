//! 作業時間トラッカーライブラリ
//!
//! TraditionalモードとFlowモードを持つ作業タイマーのコア機能と、
//! デーモン・CLIの実装を提供する。

pub mod categories;
pub mod cli;
pub mod daemon;
pub mod paths;
pub mod settings;
pub mod store;
pub mod timer;
pub mod types;
