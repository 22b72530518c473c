//! Key event primitives shared by the normalizer and its consumers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{PASTE_END, PASTE_START};

/// One keypress as decoded by the raw terminal event source.
///
/// Bracketed paste boundaries arrive as ordinary raw keys named
/// [`PASTE_START`] and [`PASTE_END`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawKey {
    /// Readline-style key name (`"a"`, `"return"`, `"up"`), empty if unnamed.
    pub name: String,
    /// Control modifier.
    pub ctrl: bool,
    /// Meta/Alt modifier.
    pub meta: bool,
    /// Shift modifier.
    pub shift: bool,
    /// Raw terminal bytes that produced this key.
    pub sequence: String,
}

impl RawKey {
    /// Creates an unmodified key with the given name and raw sequence.
    #[must_use]
    pub fn new(name: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
            ..Self::default()
        }
    }

    /// Creates a bracketed paste marker event.
    #[must_use]
    pub fn marker(marker: PasteMarker) -> Self {
        Self::new(marker.name(), "")
    }

    /// Returns the paste marker this key represents, if any.
    #[must_use]
    pub fn paste_marker(&self) -> Option<PasteMarker> {
        match self.name.as_str() {
            PASTE_START => Some(PasteMarker::Start),
            PASTE_END => Some(PasteMarker::End),
            _ => None,
        }
    }
}

/// Bracketed paste boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PasteMarker {
    /// Terminal is about to deliver pasted text.
    Start,
    /// Terminal finished delivering pasted text.
    End,
}

impl PasteMarker {
    /// Returns the raw event name used for this marker.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => PASTE_START,
            Self::End => PASTE_END,
        }
    }
}

impl fmt::Display for PasteMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One logical input unit delivered to the consumer.
///
/// Either a single keystroke or a detected paste. A paste has an empty name,
/// no modifiers, and carries the full pasted text in `sequence`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Readline-style key name, empty for pastes.
    pub name: String,
    /// Control modifier.
    pub ctrl: bool,
    /// Meta/Alt modifier.
    pub meta: bool,
    /// Shift modifier.
    pub shift: bool,
    /// Whether this event is a paste.
    pub paste: bool,
    /// Raw key bytes, or the pasted text.
    pub sequence: String,
}

impl KeyEvent {
    /// Creates a paste event carrying `text`.
    #[must_use]
    pub fn paste(text: impl Into<String>) -> Self {
        Self {
            paste: true,
            sequence: text.into(),
            ..Self::default()
        }
    }
}

impl From<RawKey> for KeyEvent {
    fn from(raw: RawKey) -> Self {
        Self {
            name: raw.name,
            ctrl: raw.ctrl,
            meta: raw.meta,
            shift: raw.shift,
            paste: false,
            sequence: raw.sequence,
        }
    }
}
