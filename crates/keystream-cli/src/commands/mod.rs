//! CLI command definitions and dispatch.

pub mod replay;
pub mod watch;

use clap::{Parser, Subcommand};
use keystream_common::config::NormalizerConfig;
use keystream_common::constants::{
    DEFAULT_PASTE_TIMEOUT_MS, ENV_NO_BRACKETED_PASTE, ENV_PASTE_TIMEOUT_MS,
};

/// keystream — normalized terminal key and paste events.
#[derive(Parser, Debug)]
#[command(name = "kst", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Inter-keystroke gap in milliseconds that separates typing from an unmarked paste.
    #[arg(long, global = true, env = ENV_PASTE_TIMEOUT_MS, default_value_t = DEFAULT_PASTE_TIMEOUT_MS)]
    pub paste_timeout_ms: u64,

    /// Do not ask the terminal to bracket pastes; rely on timing alone.
    #[arg(long, global = true, env = ENV_NO_BRACKETED_PASTE)]
    pub no_bracketed_paste: bool,
}

impl Cli {
    /// Builds the normalizer configuration from the global flags.
    #[must_use]
    pub const fn normalizer_config(&self) -> NormalizerConfig {
        NormalizerConfig {
            paste_timeout_ms: self.paste_timeout_ms,
            bracketed_paste: !self.no_bracketed_paste,
        }
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print normalized events from the terminal until Ctrl+C or Ctrl+D.
    Watch(watch::WatchArgs),
    /// Run a timed JSON script of raw keys through the paste detector.
    Replay(replay::ReplayArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = cli.normalizer_config();
    config.validate()?;
    match cli.command {
        Command::Watch(args) => watch::execute(args, config),
        Command::Replay(args) => replay::execute(&args, &config),
    }
}
