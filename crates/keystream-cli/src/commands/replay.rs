//! `kst replay` — Run a timed key script through the paste detector.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use keystream_common::config::NormalizerConfig;
use keystream_core::script::{load_script, run_script};

use crate::output::{format_event, format_event_json};

/// Arguments for the `replay` command.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Path to a JSON array of `{ "at_ms": .., "key": { .. } }` entries.
    pub file: PathBuf,

    /// Print each event as a JSON object.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `replay` command.
///
/// # Errors
///
/// Returns an error if the script cannot be loaded or output fails.
pub fn execute(args: &ReplayArgs, config: &NormalizerConfig) -> anyhow::Result<()> {
    let lines = render(args, config)?;
    let mut stdout = std::io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{line}")?;
    }
    Ok(())
}

fn render(args: &ReplayArgs, config: &NormalizerConfig) -> anyhow::Result<Vec<String>> {
    let keys = load_script(&args.file)?;
    let events = run_script(&keys, config)?;
    tracing::info!(
        file = %args.file.display(),
        keys = keys.len(),
        events = events.len(),
        "replay finished"
    );
    events
        .iter()
        .map(|event| -> anyhow::Result<String> {
            if args.json {
                Ok(format_event_json(event)?)
            } else {
                Ok(format_event(event))
            }
        })
        .collect()
}
