//! Shell completion script generation module
//!
//! Generates completion scripts for bash, zsh and fish using clap_complete.

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io::{self, Write};

use crate::cli::Cli;

/// Generate shell completion script to stdout
///
/// # Example
///
/// ```bash
/// timetracker completions bash > ~/.bash_completion.d/timetracker
/// timetracker completions zsh > ~/.zsh/completions/_timetracker
/// timetracker completions fish > ~/.config/fish/completions/timetracker.fish
/// ```
pub fn generate_completions(shell: Shell) {
    write_completions(shell, &mut io::stdout());
}

/// Write shell completion script to the given writer
pub fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, out);
}
