use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;
use uuid::Uuid;

use super::lock::FileLock;
use super::{Result, SessionStore, StoreError};
use crate::types::{Session, SessionUpdate};

/// JSONファイルに保存するセッションストア
///
/// ファイル全体を配列として読み書きする。書き込みは一時ファイルからの
/// リネームで行い、途中で失敗しても既存のログを壊さない。
///
/// 変更はログの横に置いたロックファイル（`sessions.json.lock`）の排他ロックを
/// 取ってから行う。デーモンとCLIが同じログを同時に変更しても更新が失われない。
#[derive(Debug)]
pub struct JsonSessionStore {
    path: PathBuf,
    /// 同一プロセス内の読み込み→書き込みを直列化する
    write_lock: Mutex<()>,
}

impl JsonSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<Session>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&data)?)
    }

    fn write(&self, sessions: &[Session]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(sessions)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("json.lock")
    }

    /// プロセス間の排他ロックを取得する（解放されるまで待つ）
    fn lock_file(&self) -> Result<FileLock> {
        Ok(FileLock::acquire(&self.lock_path())?)
    }

    /// 読み込み→変更→書き込みを排他的に行う
    fn modify<T>(&self, f: impl FnOnce(&mut Vec<Session>) -> Result<T>) -> Result<T> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _file_lock = self.lock_file()?;
        let mut sessions = self.read()?;
        let value = f(&mut sessions)?;
        self.write(&sessions)?;
        Ok(value)
    }
}

impl SessionStore for JsonSessionStore {
    fn append(&self, session: Session) -> Result<Session> {
        self.modify(|sessions| {
            sessions.insert(0, session.clone());
            Ok(())
        })?;
        debug!("セッションを保存しました: {} ({})", session.task_name, session.id);
        Ok(session)
    }

    fn all(&self) -> Result<Vec<Session>> {
        self.read()
    }

    fn update(&self, id: Uuid, update: &SessionUpdate) -> Result<Session> {
        self.modify(|sessions| {
            let session = sessions
                .iter_mut()
                .find(|session| session.id == id)
                .ok_or(StoreError::NotFound(id))?;
            update.apply_to(session);
            Ok(session.clone())
        })
    }

    fn delete(&self, id: Uuid) -> Result<bool> {
        self.modify(|sessions| {
            let before = sessions.len();
            sessions.retain(|session| session.id != id);
            Ok(sessions.len() != before)
        })
    }

    fn clear(&self) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _file_lock = self.lock_file()?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
