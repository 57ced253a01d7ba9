//! デーモンを介さないローカルコマンド
//!
//! 設定ファイル、セッションログ、カテゴリカタログを直接読み書きする。

use anyhow::{Context, Result};
use chrono::Utc;

use crate::categories::{Category, CategoryStore};
use crate::cli::commands::{
    CategoriesArgs, CategoriesCommand, ConfigArgs, EditArgs, SessionsArgs, SessionsCommand,
    StartArgs, SummaryArgs,
};
use crate::cli::Display;
use crate::settings::{SettingsProvider, TimerSettings};
use crate::store::{summarize, SessionStore, Summary};
use crate::types::{Session, SessionUpdate};

/// configコマンドを実行し、適用後の設定を返す
pub fn run_config(
    args: &ConfigArgs,
    settings: &dyn SettingsProvider,
    display: &Display,
) -> Result<TimerSettings> {
    let current = if args.reset {
        let reset = settings.reset().context("Failed to reset settings")?;
        display.show_success("設定をデフォルトに戻しました");
        reset
    } else if let Some(percent) = args.flow_break_percent {
        let updated = settings
            .set_flow_break_percent(percent)
            .context("Failed to update settings")?;
        display.show_success(&format!(
            "Flow休憩率を{}%に設定しました",
            updated.flow_break_percent
        ));
        updated
    } else {
        settings.settings()
    };

    display.show_settings(&current);
    Ok(current)
}

/// 一覧表示するセッションを選ぶ
pub fn select_sessions(
    args: &SessionsArgs,
    store: &dyn SessionStore,
) -> Result<(String, Vec<Session>)> {
    let selected = if args.today {
        ("今日のセッション".to_string(), store.today()?)
    } else if args.week {
        ("直近7日間のセッション".to_string(), store.week(Utc::now())?)
    } else if let Some(date) = args.date {
        (format!("{} のセッション", date), store.by_date(date)?)
    } else {
        ("すべてのセッション".to_string(), store.all()?)
    };
    Ok(selected)
}

/// sessionsコマンドを実行
pub fn run_sessions(args: &SessionsArgs, store: &dyn SessionStore, display: &Display) -> Result<()> {
    match &args.action {
        None => {
            let (title, sessions) =
                select_sessions(args, store).context("Failed to read session log")?;
            display.show_sessions(&title, &sessions);
            if args.today {
                display.show_summary("今日のカテゴリ別作業時間", &summarize(&sessions));
            }
        }
        Some(SessionsCommand::Edit(edit)) => {
            let session = store
                .update(edit.id, &edit_to_update(edit))
                .with_context(|| format!("Failed to update session {}", edit.id))?;
            display.show_success(&format!("セッションを更新しました: {}", session.task_name));
        }
        Some(SessionsCommand::Delete { id }) => {
            if !store.delete(*id).context("Failed to delete session")? {
                anyhow::bail!("セッションが見つかりません: {}", id);
            }
            display.show_success("セッションを削除しました");
        }
        Some(SessionsCommand::Clear) => {
            store.clear().context("Failed to clear session log")?;
            display.show_success("すべてのセッションを削除しました");
        }
    }
    Ok(())
}

/// summaryコマンドを実行し、集計結果を返す
pub fn run_summary(args: &SummaryArgs, store: &dyn SessionStore, display: &Display) -> Result<Summary> {
    let (title, sessions) = match args.date {
        Some(date) => (format!("{} のサマリー", date), store.by_date(date)),
        None => ("今日のサマリー".to_string(), store.today()),
    };
    let sessions = sessions.context("Failed to read session log")?;

    let summary = summarize(&sessions);
    display.show_summary(&title, &summary);
    Ok(summary)
}

/// categoriesコマンドを実行
pub fn run_categories(
    args: &CategoriesArgs,
    catalog: &dyn CategoryStore,
    display: &Display,
) -> Result<()> {
    match &args.action {
        None | Some(CategoriesCommand::List) => {
            let categories = catalog.all().context("Failed to read categories")?;
            display.show_categories(&categories);
        }
        Some(CategoriesCommand::Add { name, color }) => {
            let category = catalog.add(name, color.as_deref())?;
            display.show_success(&format!("カテゴリを追加しました: {}", category.name));
        }
        Some(CategoriesCommand::Delete { name }) => {
            let category = catalog.delete(name)?;
            display.show_success(&format!("カテゴリを削除しました: {}", category.name));
        }
    }
    Ok(())
}

/// 開始前にカテゴリをカタログと照合する
///
/// 登録済みの名前は登録時の表記に揃え、未登録の名前はカタログに追加する。
pub fn resolve_start_category(
    mut args: StartArgs,
    catalog: &dyn CategoryStore,
    display: &Display,
) -> Result<StartArgs> {
    let Some(name) = args.category.as_deref().map(str::trim) else {
        return Ok(args);
    };
    if name.is_empty() {
        args.category = None;
        return Ok(args);
    }

    let (category, added): (Category, bool) = catalog
        .ensure(name)
        .with_context(|| format!("Failed to register category {}", name))?;
    if added {
        display.show_success(&format!("カテゴリを追加しました: {}", category.name));
    }
    args.category = Some(category.name);
    Ok(args)
}

fn edit_to_update(edit: &EditArgs) -> SessionUpdate {
    SessionUpdate {
        task_name: edit.task.clone(),
        category: edit.category.clone(),
        description: edit.description.clone(),
        issue_id: edit.issue.clone(),
        work_duration_seconds: edit.minutes.map(|minutes| minutes.saturating_mul(60)),
    }
}

// ============================================================================
// Tests
// ============================================================================
