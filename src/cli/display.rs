//! Display utilities for CLI output
//!
//! Provides colored and formatted output for CLI commands.

use std::str::FromStr;

use chrono::Local;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::categories::Category;
use crate::cli::time_format::{format_duration, format_timer_display, TimeDisplay};
use crate::settings::TimerSettings;
use crate::store::{total_work_seconds, Summary};
use crate::timer::logic::TRADITIONAL_WORK_DURATION;
use crate::types::{IpcResponse, ResponseData, Session, TimerMode, TimerState};

/// 表示上のタイマー状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Idle,
    Working,
    Paused,
    OnBreak,
}

impl StatusKind {
    /// レスポンスデータから表示状態を判定
    pub fn from_data(data: &ResponseData) -> Self {
        if data.on_break == Some(true) {
            return StatusKind::OnBreak;
        }
        match data
            .state
            .as_deref()
            .and_then(|s| TimerState::from_str(s).ok())
        {
            Some(TimerState::Running) => StatusKind::Working,
            Some(TimerState::Paused) => StatusKind::Paused,
            _ => StatusKind::Idle,
        }
    }

    fn style(self) -> (&'static str, &'static str, &'static str) {
        match self {
            StatusKind::Working => ("red", "●", "作業中"),
            StatusKind::OnBreak => ("green", "☕", "休憩中"),
            StatusKind::Paused => ("yellow", "⏸", "一時停止"),
            StatusKind::Idle => ("white", "⏹", "待機中"),
        }
    }
}

/// セッション一覧の1行表示
pub fn session_line(session: &Session) -> String {
    let start = session.start_time.with_timezone(&Local);
    let end = session.end_time.with_timezone(&Local);
    let mut line = format!(
        "{} {}-{}  {:>8}  {}  [{}]",
        start.format("%Y-%m-%d"),
        start.format("%H:%M"),
        end.format("%H:%M"),
        format_timer_display(u64::from(session.work_duration_seconds)),
        session.task_name,
        session.mode.as_str(),
    );
    if session.breaks_taken > 0 {
        line.push_str(&format!(" 休憩{}回", session.breaks_taken));
    }
    if let Some(issue) = &session.details.issue_id {
        line.push_str(&format!(" #{}", issue));
    }
    line
}

/// 進捗バーの右側に表示する文字列（経過/合計、残り時間、タスク名）
pub fn progress_message(total_seconds: u64, remaining_seconds: u64, task_name: Option<&str>) -> String {
    let elapsed = total_seconds.saturating_sub(remaining_seconds);
    let progress = TimeDisplay::new(elapsed, total_seconds).format();
    let remaining = format_timer_display(remaining_seconds);
    match task_name {
        Some(name) => format!("{}  残り {}  タスク: {}", progress, remaining, name),
        None => format!("{}  残り {}", progress, remaining),
    }
}

/// カテゴリ別棒グラフの最大幅（文字数）
const BREAKDOWN_BAR_WIDTH: u64 = 20;

/// カテゴリ別作業時間の行（最長のカテゴリを棒の最大幅とする）
pub fn category_breakdown_lines(summary: &Summary) -> Vec<String> {
    let max = summary
        .by_category
        .iter()
        .map(|total| total.seconds)
        .max()
        .unwrap_or(0)
        .max(1);
    let name_width = summary
        .by_category
        .iter()
        .map(|total| total.name.chars().count())
        .max()
        .unwrap_or(0);

    summary
        .by_category
        .iter()
        .map(|total| {
            let filled = (total.seconds * BREAKDOWN_BAR_WIDTH / max) as usize;
            let padding = name_width - total.name.chars().count();
            format!(
                "{}{}  {}{}  {}",
                total.name,
                " ".repeat(padding),
                "█".repeat(filled),
                "░".repeat(BREAKDOWN_BAR_WIDTH as usize - filled),
                format_duration(total.seconds)
            )
        })
        .collect()
}

/// Display handler for CLI output
pub struct Display;

impl Display {
    // Helper to create styled progress bar
    fn create_progress_bar(
        &self,
        kind: StatusKind,
        total_seconds: u64,
        remaining_seconds: u64,
        task_name: Option<&str>,
    ) -> ProgressBar {
        let (color_code, icon, label) = kind.style();

        let template = format!(
            "{{prefix}} [{{bar:40.{}}}] {{msg}}",
            color_code
        );
        let style = ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█░");

        let bar = ProgressBar::new(total_seconds);
        bar.set_style(style);
        bar.set_position(total_seconds.saturating_sub(remaining_seconds));

        let prefix = format!("{} {}", icon, label).color(color_code).to_string();
        bar.set_prefix(prefix);

        bar.set_message(progress_message(total_seconds, remaining_seconds, task_name));

        bar
    }

    /// Create a new Display instance
    pub fn new() -> Self {
        Self
    }

    /// Show success message
    pub fn show_success(&self, msg: &str) {
        println!("{} {}", "✓".green().bold(), msg.green());
    }

    /// Show start success message
    pub fn show_start_success(&self, response: IpcResponse) {
        println!("{} {}", "✓".green().bold(), response.message.green());
        if let Some(data) = response.data {
            if let Some(task) = data.task_name {
                println!("  タスク: {}", task.cyan());
            }
            if let Some(mode) = data.mode {
                println!("  モード: {}", mode);
            }
        }
    }

    /// Show pause success message
    pub fn show_pause_success(&self, response: IpcResponse) {
        println!("{} {}", "⏸".yellow().bold(), response.message.yellow());
    }

    /// Show resume success message
    pub fn show_resume_success(&self, response: IpcResponse) {
        println!("{} {}", "▶".green().bold(), response.message.green());
    }

    /// Show stop success message
    pub fn show_stop_success(&self, response: IpcResponse) {
        println!("{} {}", "■".red().bold(), response.message.red());
        let Some(data) = response.data else {
            return;
        };
        if let Some(session) = &data.session {
            println!(
                "  記録: {} {}",
                session.task_name.cyan(),
                format_timer_display(u64::from(session.work_duration_seconds))
            );
        }
        if data.on_break == Some(true) {
            if let Some(remaining) = data.break_remaining_seconds {
                println!(
                    "  {} {}の休憩を開始しました",
                    "☕".green(),
                    format_timer_display(u64::from(remaining))
                );
            }
        }
    }

    /// Show cancel success message
    pub fn show_cancel_success(&self, response: IpcResponse) {
        println!("{} {}", "✗".yellow().bold(), response.message.yellow());
    }

    /// Show skip-break success message
    pub fn show_skip_break_success(&self, response: IpcResponse) {
        println!("{} {}", "⏭".green().bold(), response.message.green());
    }

    /// Show status information
    pub fn show_status(&self, response: IpcResponse) {
        let Some(data) = response.data else {
            println!("{}", response.message);
            return;
        };

        println!("{}", "=== タイマー状態 ===".bold());
        let kind = StatusKind::from_data(&data);
        let mode = data
            .mode
            .as_deref()
            .and_then(|s| TimerMode::from_str(s).ok())
            .unwrap_or_default();

        match kind {
            StatusKind::Idle => {
                println!("状態: {}", "待機中".white());
                println!("モード: {}", mode.as_str());
                return;
            }
            StatusKind::OnBreak => {
                if let Some(remaining) = data.break_remaining_seconds {
                    println!(
                        "{} 残り {}",
                        "☕ 休憩中".green(),
                        format_timer_display(u64::from(remaining))
                    );
                } else {
                    println!("{}", "☕ 休憩中".green());
                }
            }
            StatusKind::Working | StatusKind::Paused => {
                if let (TimerMode::Traditional, Some(remaining)) = (mode, data.remaining_seconds) {
                    let bar = self.create_progress_bar(
                        kind,
                        u64::from(TRADITIONAL_WORK_DURATION),
                        u64::from(remaining),
                        data.task_name.as_deref(),
                    );
                    bar.abandon();
                } else {
                    let (color_code, icon, label) = kind.style();
                    println!(
                        "{} 経過 {}",
                        format!("{} {}", icon, label).color(color_code),
                        format_timer_display(u64::from(data.elapsed_seconds.unwrap_or(0)))
                    );
                }
            }
        }

        println!("モード: {}", mode.as_str());
        if let Some(task) = &data.task_name {
            println!("タスク: {}", task.cyan());
        }
        if let Some(work) = data.work_seconds {
            println!("累計作業: {}", format_timer_display(u64::from(work)));
        }
        if let Some(breaks) = data.breaks_taken.filter(|count| *count > 0) {
            println!("休憩回数: {}", breaks);
        }
    }

    /// Show timer settings
    pub fn show_settings(&self, settings: &TimerSettings) {
        println!("{}", "=== タイマー設定 ===".bold());
        println!("Flow休憩率: {}%", settings.flow_break_percent);
    }

    /// Show session log
    pub fn show_sessions(&self, title: &str, sessions: &[Session]) {
        println!("{}", format!("=== {} ===", title).bold());
        if sessions.is_empty() {
            println!("{}", "セッションはありません".dimmed());
            return;
        }
        for session in sessions {
            println!("{}  {}", session.id.to_string().dimmed(), session_line(session));
        }
        println!(
            "合計: {} ({}件)",
            format_duration(total_work_seconds(sessions)).bold(),
            sessions.len()
        );
    }

    /// Show per-category summary
    pub fn show_summary(&self, title: &str, summary: &Summary) {
        println!("{}", format!("=== {} ===", title).bold());
        println!(
            "合計作業時間: {}  セッション数: {}",
            format_duration(summary.total_seconds).bold(),
            summary.session_count
        );
        if summary.by_category.is_empty() {
            println!("{}", "セッションはありません".dimmed());
            return;
        }
        println!("{}", "カテゴリ別".bold());
        for line in category_breakdown_lines(summary) {
            println!("  {}", line);
        }
    }

    /// Show category catalog
    pub fn show_categories(&self, categories: &[Category]) {
        println!("{}", "=== カテゴリ ===".bold());
        for category in categories {
            let marker = if category.is_default {
                " (デフォルト)".dimmed().to_string()
            } else {
                String::new()
            };
            println!("{} {}{}", "●".color(category_color(&category.color)), category.name, marker);
        }
    }

    /// Show error message
    pub fn show_error(&self, msg: &str) {
        eprintln!("{} {}", "✗".red().bold(), msg.red());
    }
}

/// #RRGGBB をターミナルの色に変換（不正な値は白）
fn category_color(hex: &str) -> colored::Color {
    let channel = |range: std::ops::Range<usize>| {
        hex.strip_prefix('#')
            .and_then(|digits| digits.get(range))
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
    };
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => colored::Color::TrueColor { r, g, b },
        _ => colored::Color::White,
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
