//! Formatted output helpers for CLI commands.
//!
//! Renders key events as one human-readable line, or as JSON, with control
//! bytes in raw sequences shown as escapes.

use std::fmt::Write as _;

use chrono::{DateTime, Local};
use keystream_common::types::KeyEvent;

/// Renders control characters in `raw` as visible escapes (`\x1b`, `\r`).
#[must_use]
pub fn escape_sequence(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out
}

/// Formats an event as a single human-readable line.
#[must_use]
pub fn format_event(event: &KeyEvent) -> String {
    if event.paste {
        return format!(
            "paste ({} bytes) \"{}\"",
            event.sequence.len(),
            escape_sequence(&event.sequence)
        );
    }

    let mut label = String::new();
    for (held, modifier) in [(event.ctrl, "ctrl"), (event.meta, "meta"), (event.shift, "shift")] {
        if held {
            label.push_str(modifier);
            label.push('+');
        }
    }
    label.push_str(if event.name.is_empty() {
        "<unnamed>"
    } else {
        event.name.as_str()
    });
    format!("key {label} \"{}\"", escape_sequence(&event.sequence))
}

/// Formats an event as a JSON object.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn format_event_json(event: &KeyEvent) -> serde_json::Result<String> {
    serde_json::to_string(event)
}

/// Prefixes `line` with a wall-clock timestamp.
#[must_use]
pub fn with_timestamp(line: &str, at: &DateTime<Local>) -> String {
    format!("{} {line}", at.format("%H:%M:%S%.3f"))
}
