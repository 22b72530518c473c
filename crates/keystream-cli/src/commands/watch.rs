//! `kst watch` — Print normalized events from the terminal.

use std::io::{self, Write};

use clap::Args;
use keystream_common::config::NormalizerConfig;
use keystream_common::constants::APP_NAME;
use keystream_common::types::KeyEvent;
use keystream_core::listener::KeypressListener;
use tokio::sync::mpsc;

use crate::output::{format_event, format_event_json, with_timestamp};

/// Arguments for the `watch` command.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Print each event as a JSON object.
    #[arg(long)]
    pub json: bool,

    /// Prefix each line with the local time it was received.
    #[arg(long)]
    pub timestamps: bool,
}

/// Executes the `watch` command.
///
/// Activates the listener on the process terminal and prints every event
/// until Ctrl+C or Ctrl+D is pressed or SIGINT arrives.
///
/// # Errors
///
/// Returns an error if the runtime cannot start, the listener cannot be
/// activated, or output fails.
pub fn execute(args: WatchArgs, config: NormalizerConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch(&args, config))
}

async fn watch(args: &WatchArgs, config: NormalizerConfig) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut listener = KeypressListener::stdin(config);
    listener.activate_stdin(move |event| {
        let _ = tx.send(event);
    })?;

    let mut stdout = io::stdout();
    print_line(
        &mut stdout,
        &format!("{APP_NAME}: watching keys, press Ctrl+C or Ctrl+D to stop"),
    )?;

    let result = loop {
        tokio::select! {
            received = rx.recv() => {
                let Some(event) = received else { break Ok(()) };
                if let Err(err) = print_event(&mut stdout, args, &event) {
                    break Err(err);
                }
                if is_stop_key(&event) {
                    break Ok(());
                }
            }
            _ = tokio::signal::ctrl_c() => break Ok(()),
        }
    };

    listener.deactivate().await;
    while let Ok(event) = rx.try_recv() {
        print_event(&mut stdout, args, &event)?;
    }
    result
}

fn is_stop_key(event: &KeyEvent) -> bool {
    !event.paste && event.ctrl && matches!(event.name.as_str(), "c" | "d")
}

fn print_event(out: &mut impl Write, args: &WatchArgs, event: &KeyEvent) -> anyhow::Result<()> {
    let line = if args.json {
        format_event_json(event)?
    } else {
        format_event(event)
    };
    let line = if args.timestamps {
        with_timestamp(&line, &chrono::Local::now())
    } else {
        line
    };
    print_line(out, &line)
}

/// Writes one line with a CR LF ending, since raw mode disables output
/// newline translation.
fn print_line(out: &mut impl Write, line: &str) -> anyhow::Result<()> {
    write!(out, "{line}\r\n")?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use keystream_common::types::RawKey;

    use super::*;

    #[test]
    fn ctrl_c_and_ctrl_d_stop_the_session() {
        let ctrl = |name: &str| KeyEvent {
            name: name.into(),
            ctrl: true,
            ..KeyEvent::default()
        };
        assert!(is_stop_key(&ctrl("c")));
        assert!(is_stop_key(&ctrl("d")));
        assert!(!is_stop_key(&ctrl("x")));
        assert!(!is_stop_key(&KeyEvent::from(RawKey::new("c", "c"))));
    }

    #[test]
    fn lines_end_with_carriage_return() {
        let mut buf = Vec::new();
        let args = WatchArgs {
            json: false,
            timestamps: false,
        };
        print_event(&mut buf, &args, &KeyEvent::paste("hi")).expect("print");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "paste (2 bytes) \"hi\"\r\n");
    }
}
