//! セッションストアのエラー型定義

use std::io;

use thiserror::Error;
use uuid::Uuid;

/// セッションストアのエラー型
#[derive(Debug, Error)]
pub enum StoreError {
    /// セッションが存在しない
    #[error("Session not found: {0}")]
    NotFound(Uuid),

    /// ファイルの読み書きに失敗
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSONの解析・生成に失敗
    #[error("Invalid session log: {0}")]
    Json(#[from] serde_json::Error),
}

/// セッションストア操作の結果型
pub type Result<T> = std::result::Result<T, StoreError>;
