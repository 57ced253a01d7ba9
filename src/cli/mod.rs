//! CLI module for the time tracker command-line interface
pub mod commands;
pub mod completions;
pub mod display;
pub mod ipc;
pub mod local;
pub mod time_format;

pub use commands::{
    CategoriesArgs, CategoriesCommand, Cli, Commands, ConfigArgs, ModeArg, SessionsArgs,
    SessionsCommand, StartArgs, SummaryArgs,
};
pub use display::Display;
pub use ipc::IpcClient;
