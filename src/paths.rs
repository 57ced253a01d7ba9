//! データディレクトリのパス解決
//!
//! ソケット、セッションログ、設定ファイル、カテゴリカタログはすべて同じディレクトリに置く。
//! デフォルトは `~/.timetracker`。

use std::path::{Path, PathBuf};

use thiserror::Error;

/// データディレクトリ名
pub const DATA_DIR_NAME: &str = ".timetracker";
/// ソケットファイル名
pub const SOCKET_FILE_NAME: &str = "timetracker.sock";
/// セッションログファイル名
pub const SESSIONS_FILE_NAME: &str = "sessions.json";
/// 設定ファイル名
pub const SETTINGS_FILE_NAME: &str = "settings.json";
/// カテゴリカタログのファイル名
pub const CATEGORIES_FILE_NAME: &str = "categories.json";

/// パス解決のエラー型
#[derive(Debug, Error)]
pub enum PathError {
    /// ホームディレクトリの取得に失敗
    #[error("Failed to get home directory")]
    HomeDirectoryNotFound,
}

/// アプリケーションが使用するファイルパス一式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    /// データディレクトリを指定して作成
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// パスを解決
    ///
    /// `override_dir` があればそれを使い、なければ `~/.timetracker` を使う。
    pub fn resolve(override_dir: Option<&Path>) -> Result<Self, PathError> {
        if let Some(dir) = override_dir {
            return Ok(Self::new(dir));
        }
        let home_dir = dirs::home_dir().ok_or(PathError::HomeDirectoryNotFound)?;
        Ok(Self::new(home_dir.join(DATA_DIR_NAME)))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn socket_path(&self) -> PathBuf {
        self.data_dir.join(SOCKET_FILE_NAME)
    }

    pub fn sessions_path(&self) -> PathBuf {
        self.data_dir.join(SESSIONS_FILE_NAME)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE_NAME)
    }

    pub fn categories_path(&self) -> PathBuf {
        self.data_dir.join(CATEGORIES_FILE_NAME)
    }
}
