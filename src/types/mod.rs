//! タイマーのデータ型定義
//!
//! タイマーの状態、セッション記録、IPC通信に使用するデータ型を提供する。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// セッションのデフォルトカテゴリ
pub const DEFAULT_CATEGORY: &str = "Work";

/// タイマーモード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    /// 25分作業 / 5分休憩の固定サイクル
    #[default]
    Traditional,
    /// 作業時間に比例した休憩を取る自由形式
    Flow,
}

impl TimerMode {
    /// モード名を取得
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Traditional => "traditional",
            TimerMode::Flow => "flow",
        }
    }
}

impl std::str::FromStr for TimerMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "traditional" => Ok(TimerMode::Traditional),
            "flow" => Ok(TimerMode::Flow),
            _ => Err(()),
        }
    }
}

/// タイマーの状態
///
/// 休憩中は状態ではなく、外部の休憩プレゼンターに委譲された活動として扱う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// 待機中
    Idle,
    /// 計測中
    Running,
    /// 一時停止中
    Paused,
}

impl TimerState {
    /// 状態名を取得
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
        }
    }
}

impl std::str::FromStr for TimerState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(TimerState::Idle),
            "running" => Ok(TimerState::Running),
            "paused" => Ok(TimerState::Paused),
            _ => Err(()),
        }
    }
}

/// 外部システム向けの任意フィールド（`{id, value}`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    pub id: String,
    pub value: String,
}

/// セッションに付随する説明情報
///
/// タイマーは中身を解釈せず、そのままセッションに引き継ぐ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetails {
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<String>,
    #[serde(default)]
    pub custom_fields: Vec<FieldValue>,
    #[serde(default)]
    pub work_item_attributes: Vec<FieldValue>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Default for SessionDetails {
    fn default() -> Self {
        Self {
            category: default_category(),
            description: String::new(),
            issue_id: None,
            custom_fields: Vec::new(),
            work_item_attributes: Vec::new(),
        }
    }
}

/// 完了した作業セッションの記録
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub task_name: String,
    pub mode: TimerMode,
    /// 休憩時間を除いた合計作業時間（秒）
    pub work_duration_seconds: u32,
    pub breaks_taken: u32,
    #[serde(flatten)]
    pub details: SessionDetails,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// 新しいセッションを作成
    ///
    /// `end_time` が `start_time` より前の場合は `start_time` に揃える。
    pub fn new(
        task_name: impl Into<String>,
        mode: TimerMode,
        work_duration_seconds: u32,
        breaks_taken: u32,
        details: SessionDetails,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_name: task_name.into(),
            mode,
            work_duration_seconds,
            breaks_taken,
            details,
            start_time,
            end_time: end_time.max(start_time),
            created_at: end_time.max(start_time),
        }
    }
}

/// セッション更新内容
///
/// 指定されたフィールドのみを更新する（Noneのフィールドは更新しない）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_duration_seconds: Option<u32>,
}

impl SessionUpdate {
    /// セッションに更新内容を適用
    pub fn apply_to(&self, session: &mut Session) {
        if let Some(task_name) = &self.task_name {
            session.task_name = task_name.clone();
        }
        if let Some(category) = &self.category {
            session.details.category = category.clone();
        }
        if let Some(description) = &self.description {
            session.details.description = description.clone();
        }
        if let Some(issue_id) = &self.issue_id {
            session.details.issue_id = Some(issue_id.clone());
        }
        if let Some(work_duration_seconds) = self.work_duration_seconds {
            session.work_duration_seconds = work_duration_seconds;
        }
    }
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPCリクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum IpcRequest {
    /// タイマー開始
    Start {
        #[serde(flatten)]
        params: StartParams,
    },
    /// タイマー一時停止
    Pause,
    /// タイマー再開
    Resume,
    /// タイマー停止（セッションを記録）
    Stop,
    /// タイマー取り消し（セッションを記録しない）
    Cancel,
    /// ステータス確認
    Status,
    /// 休憩をスキップ
    SkipBreak,
}

/// 開始パラメータ
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartParams {
    #[serde(rename = "taskName", skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<TimerMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "issueId", skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<String>,
}

impl StartParams {
    /// パラメータからセッション説明情報を作成
    pub fn to_details(&self) -> SessionDetails {
        let mut details = SessionDetails::default();
        if let Some(category) = &self.category {
            details.category = category.clone();
        }
        if let Some(description) = &self.description {
            details.description = description.clone();
        }
        details.issue_id = self.issue_id.clone();
        details
    }
}

/// IPCレスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// ステータス（success/error）
    pub status: String,
    /// メッセージ
    pub message: String,
    /// データ
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

/// レスポンスデータ
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breaks_taken: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_break: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub break_remaining_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
}

impl IpcResponse {
    /// 成功レスポンスを作成
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// エラーレスポンスを作成
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// 成功レスポンスかどうか
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// ============================================================================
// Tests
// ============================================================================
