//! セッションストア
//!
//! 完了したセッションの記録を保持する。新しいものが先頭。
//! 状態機械からは追加（fire-and-forget）のみ使われ、
//! 一覧・日付絞り込み・集計・更新・削除はCLIのセッションログコマンドから使われる。

mod error;
mod json;
mod lock;
mod memory;

pub use error::{Result, StoreError};
pub use json::JsonSessionStore;
pub use memory::MemorySessionStore;

pub(crate) use lock::FileLock;

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use uuid::Uuid;

use crate::types::{Session, SessionUpdate};

/// 週次集計の対象期間（日）
pub const WEEK_DAYS: i64 = 7;

/// カテゴリが空のセッションの集計名
pub const UNCATEGORIZED: &str = "未分類";

/// セッションの保存先
pub trait SessionStore: Send + Sync {
    /// セッションを先頭に追加し、追加したセッションを返す
    fn append(&self, session: Session) -> Result<Session>;

    /// 全セッション（新しい順）
    fn all(&self) -> Result<Vec<Session>>;

    /// セッションを部分更新
    fn update(&self, id: Uuid, update: &SessionUpdate) -> Result<Session>;

    /// セッションを削除（存在しなければ `false`）
    fn delete(&self, id: Uuid) -> Result<bool>;

    /// 全セッションを削除
    fn clear(&self) -> Result<()>;

    /// IDで取得
    fn get(&self, id: Uuid) -> Result<Option<Session>> {
        Ok(self.all()?.into_iter().find(|session| session.id == id))
    }

    /// 開始時刻のローカル日付が `date` のセッション
    fn by_date(&self, date: NaiveDate) -> Result<Vec<Session>> {
        Ok(filter_by_date(self.all()?, date))
    }

    /// 今日のセッション
    fn today(&self) -> Result<Vec<Session>> {
        self.by_date(Local::now().date_naive())
    }

    /// `now` から7日以内に開始したセッション
    fn week(&self, now: DateTime<Utc>) -> Result<Vec<Session>> {
        Ok(filter_since(self.all()?, now - Duration::days(WEEK_DAYS)))
    }
}

/// 開始時刻のローカル日付で絞り込む
pub fn filter_by_date(sessions: Vec<Session>, date: NaiveDate) -> Vec<Session> {
    sessions
        .into_iter()
        .filter(|session| session.start_time.with_timezone(&Local).date_naive() == date)
        .collect()
}

/// `since` 以降に開始したセッションに絞り込む
pub fn filter_since(sessions: Vec<Session>, since: DateTime<Utc>) -> Vec<Session> {
    sessions
        .into_iter()
        .filter(|session| session.start_time >= since)
        .collect()
}

/// セッション一覧の合計作業時間（秒）
pub fn total_work_seconds(sessions: &[Session]) -> u64 {
    sessions
        .iter()
        .map(|session| u64::from(session.work_duration_seconds))
        .sum()
}

/// カテゴリ別の作業時間
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub name: String,
    pub seconds: u64,
}

/// セッション一覧の集計
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Summary {
    /// 合計作業時間（秒）
    pub total_seconds: u64,
    /// セッション数
    pub session_count: usize,
    /// カテゴリ別の作業時間（長い順、同じ長さは名前順）
    pub by_category: Vec<CategoryTotal>,
}

/// セッション一覧を集計する
pub fn summarize(sessions: &[Session]) -> Summary {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for session in sessions {
        let name = match session.details.category.trim() {
            "" => UNCATEGORIZED,
            name => name,
        };
        *totals.entry(name).or_default() += u64::from(session.work_duration_seconds);
    }

    let mut by_category: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(name, seconds)| CategoryTotal {
            name: name.to_string(),
            seconds,
        })
        .collect();
    // BTreeMap順（名前順）を保ったまま安定ソート
    by_category.sort_by(|a, b| b.seconds.cmp(&a.seconds));

    Summary {
        total_seconds: total_work_seconds(sessions),
        session_count: sessions.len(),
        by_category,
    }
}
