//! 作業時間トラッカーCLI
//!
//! デーモンプロセスとして動作し、Unix Domain Socket経由でCLIコマンドを受け付ける。
//! 設定・セッションログ・カテゴリのコマンドはデーモンを介さずにファイルを直接操作する。

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::Level;

use timetracker::categories::FileCategories;
use timetracker::cli::completions::generate_completions;
use timetracker::cli::local::{
    resolve_start_category, run_categories, run_config, run_sessions, run_summary,
};
use timetracker::cli::{Cli, Commands, Display, IpcClient};
use timetracker::daemon;
use timetracker::paths::AppPaths;
use timetracker::settings::FileSettings;
use timetracker::store::JsonSessionStore;
use timetracker::types::IpcResponse;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let display = Display::new();
    match run(cli, &display).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            display.show_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// コマンドを実行し、成功したかどうかを返す
async fn run(cli: Cli, display: &Display) -> Result<bool> {
    let paths = AppPaths::resolve(cli.home.as_deref())?;
    let client = IpcClient::new(paths.socket_path());

    let succeeded = match cli.command {
        Commands::Start(args) => {
            let catalog = FileCategories::new(paths.categories_path());
            let args = resolve_start_category(args, &catalog, display)?;
            report(
                display,
                client.start(args).await,
                "Failed to start timer",
                Display::show_start_success,
            )
        }
        Commands::Pause => report(
            display,
            client.pause().await,
            "Failed to pause timer",
            Display::show_pause_success,
        ),
        Commands::Resume => report(
            display,
            client.resume().await,
            "Failed to resume timer",
            Display::show_resume_success,
        ),
        Commands::Stop => report(
            display,
            client.stop().await,
            "Failed to stop timer",
            Display::show_stop_success,
        ),
        Commands::Cancel => report(
            display,
            client.cancel().await,
            "Failed to cancel timer",
            Display::show_cancel_success,
        ),
        Commands::Status => report(
            display,
            client.status().await,
            "Failed to get status",
            Display::show_status,
        ),
        Commands::SkipBreak => report(
            display,
            client.skip_break().await,
            "Failed to skip break",
            Display::show_skip_break_success,
        ),
        Commands::Daemon => {
            daemon::run(&paths).await?;
            true
        }
        Commands::Config(args) => {
            let settings = FileSettings::new(paths.settings_path());
            run_config(&args, &settings, display)?;
            true
        }
        Commands::Sessions(args) => {
            let store = JsonSessionStore::new(paths.sessions_path());
            run_sessions(&args, &store, display)?;
            true
        }
        Commands::Summary(args) => {
            let store = JsonSessionStore::new(paths.sessions_path());
            run_summary(&args, &store, display)?;
            true
        }
        Commands::Categories(args) => {
            let catalog = FileCategories::new(paths.categories_path());
            run_categories(&args, &catalog, display)?;
            true
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
            true
        }
    };

    Ok(succeeded)
}

/// デーモンからのレスポンスを表示する
fn report(
    display: &Display,
    result: Result<IpcResponse>,
    failure: &str,
    on_success: fn(&Display, IpcResponse),
) -> bool {
    match result {
        Ok(response) if response.is_success() => {
            on_success(display, response);
            true
        }
        Ok(response) => {
            display.show_error(&response.message);
            false
        }
        Err(e) => {
            display.show_error(&format!("{}: {:#}", failure, e));
            false
        }
    }
}
