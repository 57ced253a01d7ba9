use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::types::TimerMode;

/// Time tracker CLI
#[derive(Parser, Debug)]
#[command(
    name = "timetracker",
    version,
    about = "作業時間トラッカーCLI",
    long_about = "Traditional（25分作業/5分休憩）とFlow（作業時間に比例した休憩）の2つのモードを持つ作業タイマー。\n完了したセッションはローカルのセッションログに記録されます。",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// データディレクトリ（デフォルト: ~/.timetracker）
    #[arg(long, global = true, env = "TIMETRACKER_HOME", value_name = "DIR")]
    pub home: Option<PathBuf>,
}

/// Subcommand definitions
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// タイマーを開始
    Start(StartArgs),

    /// タイマーを一時停止
    Pause,

    /// タイマーを再開
    Resume,

    /// タイマーを停止してセッションを記録
    Stop,

    /// セッションを記録せずに取り消す
    Cancel,

    /// 現在のステータスを確認
    Status,

    /// 休憩をスキップ
    SkipBreak,

    /// デーモンモードで起動
    Daemon,

    /// タイマー設定を管理
    Config(ConfigArgs),

    /// セッションログを表示・編集
    Sessions(SessionsArgs),

    /// 1日の作業時間をカテゴリ別に集計
    Summary(SummaryArgs),

    /// カテゴリを管理
    Categories(CategoriesArgs),

    /// シェル補完スクリプトを生成
    Completions {
        /// シェルの種類
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// タイマーモード
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// 25分作業 / 5分休憩
    Traditional,
    /// 作業時間に比例した休憩
    Flow,
}

impl From<ModeArg> for TimerMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Traditional => TimerMode::Traditional,
            ModeArg::Flow => TimerMode::Flow,
        }
    }
}

/// start command arguments
#[derive(Args, Debug, Clone)]
pub struct StartArgs {
    /// タスク名
    #[arg(short, long, value_parser = validate_task_name)]
    pub task: String,

    /// タイマーモード
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// カテゴリ（未登録の名前はカテゴリ一覧に追加される）
    #[arg(short, long)]
    pub category: Option<String>,

    /// 説明
    #[arg(short, long)]
    pub description: Option<String>,

    /// 課題ID
    #[arg(short, long)]
    pub issue: Option<String>,
}

/// Config command arguments
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Flowモードの休憩率（%）
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=50))]
    pub flow_break_percent: Option<u8>,

    /// 設定をデフォルトに戻す
    #[arg(long, conflicts_with = "flow_break_percent")]
    pub reset: bool,
}

/// Sessions command arguments
#[derive(Args, Debug, Clone)]
pub struct SessionsArgs {
    #[command(subcommand)]
    pub action: Option<SessionsCommand>,

    /// 今日のセッションのみ
    #[arg(long, conflicts_with_all = ["week", "date"])]
    pub today: bool,

    /// 直近7日間のセッションのみ
    #[arg(long, conflicts_with = "date")]
    pub week: bool,

    /// 指定日のセッションのみ（YYYY-MM-DD）
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,
}

/// セッションログの操作
#[derive(Subcommand, Debug, Clone)]
pub enum SessionsCommand {
    /// セッションを編集
    Edit(EditArgs),

    /// セッションを削除
    Delete {
        /// セッションID
        id: Uuid,
    },

    /// すべてのセッションを削除
    Clear,
}

/// Summary command arguments
#[derive(Args, Debug, Clone)]
pub struct SummaryArgs {
    /// 集計する日（YYYY-MM-DD、デフォルト: 今日）
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,
}

/// Categories command arguments
#[derive(Args, Debug, Clone)]
pub struct CategoriesArgs {
    #[command(subcommand)]
    pub action: Option<CategoriesCommand>,
}

/// カテゴリの操作
#[derive(Subcommand, Debug, Clone)]
pub enum CategoriesCommand {
    /// カテゴリ一覧を表示
    List,

    /// カテゴリを追加
    Add {
        /// カテゴリ名
        #[arg(value_parser = validate_category_name)]
        name: String,

        /// 表示色（#RRGGBB）
        #[arg(long, value_parser = validate_color)]
        color: Option<String>,
    },

    /// カテゴリを削除（デフォルトのカテゴリは削除できない）
    Delete {
        /// カテゴリ名
        name: String,
    },
}

/// sessions edit arguments
#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    /// セッションID
    pub id: Uuid,

    /// タスク名
    #[arg(short, long, value_parser = validate_task_name)]
    pub task: Option<String>,

    /// カテゴリ
    #[arg(short, long)]
    pub category: Option<String>,

    /// 説明
    #[arg(short, long)]
    pub description: Option<String>,

    /// 課題ID
    #[arg(short, long)]
    pub issue: Option<String>,

    /// 作業時間（分）
    #[arg(short, long)]
    pub minutes: Option<u32>,
}

/// Task name validation
fn validate_task_name(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("タスク名は空にできません".to_string());
    }
    if trimmed.chars().count() > 100 {
        return Err("タスク名は100文字以内にしてください".to_string());
    }
    Ok(trimmed.to_string())
}

/// Category name validation
fn validate_category_name(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("カテゴリ名は空にできません".to_string());
    }
    if trimmed.chars().count() > 50 {
        return Err("カテゴリ名は50文字以内にしてください".to_string());
    }
    Ok(trimmed.to_string())
}

/// Color validation (#RRGGBB)
fn validate_color(s: &str) -> Result<String, String> {
    let hex = s.strip_prefix('#').unwrap_or_default();
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("色は #RRGGBB の形式で指定してください".to_string());
    }
    Ok(s.to_lowercase())
}
