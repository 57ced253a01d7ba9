//! E2Eテスト用のデーモン起動ヘルパー

use std::time::Duration;

use tempfile::{tempdir, TempDir};
use tokio::task::JoinHandle;

use timetracker::cli::IpcClient;
use timetracker::daemon;
use timetracker::paths::AppPaths;
use timetracker::types::ResponseData;

/// 一時ディレクトリで動作するデーモン
pub struct RunningDaemon {
    pub dir: TempDir,
    pub paths: AppPaths,
    task: JoinHandle<()>,
}

impl RunningDaemon {
    /// デーモンを起動し、ソケットが作成されるまで待つ
    pub async fn start() -> Self {
        let dir = tempdir().unwrap();
        Self::start_in(dir).await
    }

    /// 既存のデータディレクトリでデーモンを起動
    pub async fn start_in(dir: TempDir) -> Self {
        let paths = AppPaths::new(dir.path());
        let daemon_paths = paths.clone();
        let task = tokio::spawn(async move {
            daemon::run(&daemon_paths).await.unwrap();
        });

        let socket_path = paths.socket_path();
        for _ in 0..100 {
            if socket_path.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(socket_path.exists(), "デーモンのソケットが作成されませんでした");

        Self { dir, paths, task }
    }

    pub fn client(&self) -> IpcClient {
        IpcClient::new(self.paths.socket_path())
    }

    /// 条件を満たすステータスになるまでポーリングする
    pub async fn wait_for_status<F>(&self, condition: F) -> ResponseData
    where
        F: Fn(&ResponseData) -> bool,
    {
        let client = self.client();
        for _ in 0..50 {
            let data = client.status().await.unwrap().data.unwrap();
            if condition(&data) {
                return data;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("期待したステータスになりませんでした");
    }

    /// デーモンを止めてデータディレクトリを返す
    pub async fn shutdown(self) -> TempDir {
        self.task.abort();
        let _ = self.task.await;
        self.dir
    }
}
