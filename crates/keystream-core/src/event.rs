//! Terminal event decoding.
//!
//! Converts crossterm events into [`RawKey`]s with readline-style names and a
//! re-encoded terminal byte sequence. Bracketed pastes, which crossterm
//! delivers as a single [`Event::Paste`], are expanded back into a
//! `paste-start` marker, the pasted text, and a `paste-end` marker.

use std::io;

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent as CKeyEvent, KeyEventKind, KeyModifiers,
};
use futures_util::stream::{self, BoxStream, StreamExt};
use keystream_common::types::{PasteMarker, RawKey};

/// Returns a stream of raw keys read from the process terminal.
///
/// Raw mode must be enabled for keys to arrive unbuffered.
pub fn crossterm_source() -> BoxStream<'static, io::Result<RawKey>> {
    EventStream::new()
        .map(|result| match result {
            Ok(event) => raw_keys_from_event(event).into_iter().map(Ok).collect(),
            Err(err) => vec![Err(err)],
        })
        .flat_map(stream::iter)
        .boxed()
}

/// Converts one terminal event into zero or more raw keys.
///
/// Resize, focus, and mouse events produce nothing.
#[must_use]
pub fn raw_keys_from_event(event: Event) -> Vec<RawKey> {
    match event {
        Event::Key(key) => raw_key_from_key(&key).into_iter().collect(),
        Event::Paste(text) => vec![
            RawKey::marker(PasteMarker::Start),
            RawKey::new("", text),
            RawKey::marker(PasteMarker::End),
        ],
        _ => Vec::new(),
    }
}

/// Converts a key press into a raw key, ignoring releases and unmapped keys.
#[must_use]
pub fn raw_key_from_key(key: &CKeyEvent) -> Option<RawKey> {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let meta = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    let modifier_param = 1 + u8::from(shift) + 2 * u8::from(meta) + 4 * u8::from(ctrl);

    let (name, sequence, shift) = match key.code {
        KeyCode::Char(c) => {
            let (name, base) = encode_char(c, ctrl);
            (name, alt_prefixed(meta, &base), shift || c.is_ascii_uppercase())
        }
        KeyCode::Enter => ("return".to_owned(), alt_prefixed(meta, "\r"), shift),
        KeyCode::Tab => ("tab".to_owned(), alt_prefixed(meta, "\t"), shift),
        KeyCode::BackTab => ("tab".to_owned(), "\x1b[Z".to_owned(), true),
        KeyCode::Backspace => ("backspace".to_owned(), alt_prefixed(meta, "\x7f"), shift),
        KeyCode::Esc => ("escape".to_owned(), alt_prefixed(meta, "\x1b"), shift),
        KeyCode::Up => ("up".to_owned(), csi_letter('A', modifier_param), shift),
        KeyCode::Down => ("down".to_owned(), csi_letter('B', modifier_param), shift),
        KeyCode::Right => ("right".to_owned(), csi_letter('C', modifier_param), shift),
        KeyCode::Left => ("left".to_owned(), csi_letter('D', modifier_param), shift),
        KeyCode::Home => ("home".to_owned(), csi_letter('H', modifier_param), shift),
        KeyCode::End => ("end".to_owned(), csi_letter('F', modifier_param), shift),
        KeyCode::Insert => ("insert".to_owned(), csi_tilde(2, modifier_param), shift),
        KeyCode::Delete => ("delete".to_owned(), csi_tilde(3, modifier_param), shift),
        KeyCode::PageUp => ("pageup".to_owned(), csi_tilde(5, modifier_param), shift),
        KeyCode::PageDown => ("pagedown".to_owned(), csi_tilde(6, modifier_param), shift),
        KeyCode::F(n) => (format!("f{n}"), function_key(n, modifier_param)?, shift),
        _ => return None,
    };

    Some(RawKey {
        name,
        ctrl,
        meta,
        shift,
        sequence,
    })
}

/// Name and unprefixed byte sequence for a character key.
fn encode_char(c: char, ctrl: bool) -> (String, String) {
    let name = match c {
        ' ' => "space".to_owned(),
        c if c.is_ascii_alphanumeric() => c.to_ascii_lowercase().to_string(),
        _ => String::new(),
    };
    let sequence = if ctrl && c.is_ascii_alphabetic() {
        char::from(c.to_ascii_lowercase() as u8 & 0x1f).to_string()
    } else if ctrl && c == ' ' {
        "\0".to_owned()
    } else {
        c.to_string()
    };
    (name, sequence)
}

fn alt_prefixed(meta: bool, base: &str) -> String {
    if meta {
        format!("\x1b{base}")
    } else {
        base.to_owned()
    }
}

fn csi_letter(letter: char, modifier_param: u8) -> String {
    if modifier_param == 1 {
        format!("\x1b[{letter}")
    } else {
        format!("\x1b[1;{modifier_param}{letter}")
    }
}

fn csi_tilde(code: u8, modifier_param: u8) -> String {
    if modifier_param == 1 {
        format!("\x1b[{code}~")
    } else {
        format!("\x1b[{code};{modifier_param}~")
    }
}

fn function_key(n: u8, modifier_param: u8) -> Option<String> {
    match n {
        1..=4 => {
            let letter = char::from(b'P' + (n - 1));
            Some(if modifier_param == 1 {
                format!("\x1bO{letter}")
            } else {
                format!("\x1b[1;{modifier_param}{letter}")
            })
        }
        5 => Some(csi_tilde(15, modifier_param)),
        6..=10 => Some(csi_tilde(n + 11, modifier_param)),
        11 | 12 => Some(csi_tilde(n + 12, modifier_param)),
        _ => None,
    }
}
