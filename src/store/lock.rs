//! ファイルの排他ロック
//!
//! デーモンとCLIは別プロセスから同じJSONファイルを書き換えるため、
//! 読み込み→書き込みの間はロックファイルに排他ロックを掛ける。

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

use fs2::FileExt;
use tracing::debug;

/// ロックファイルの排他ロック
///
/// ドロップでロックが外れる。ロックファイル自体は削除しない。
#[derive(Debug)]
pub(crate) struct FileLock {
    file: File,
}

impl FileLock {
    /// 排他ロックを取得する（他のプロセスが解放するまで待つ）
    pub(crate) fn acquire(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.lock_exclusive()?;
        debug!("ロックを取得しました: {:?}", path);
        Ok(Self { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
