//! カテゴリカタログのエラー型定義

use std::io;

use thiserror::Error;

/// カテゴリカタログのエラー型
#[derive(Debug, Error)]
pub enum CategoryError {
    /// 名前が空
    #[error("カテゴリ名を入力してください")]
    EmptyName,

    /// 同名のカテゴリが既にある（大文字小文字を区別しない）
    #[error("カテゴリは既に存在します: {0}")]
    Duplicate(String),

    /// デフォルトのカテゴリは削除できない
    #[error("デフォルトのカテゴリは削除できません: {0}")]
    ProtectedDefault(String),

    /// カテゴリが存在しない
    #[error("カテゴリが見つかりません: {0}")]
    NotFound(String),

    /// ファイルの読み書きに失敗
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSONの解析・生成に失敗
    #[error("Invalid category catalog: {0}")]
    Json(#[from] serde_json::Error),
}

/// カテゴリカタログ操作の結果型
pub type Result<T> = std::result::Result<T, CategoryError>;
