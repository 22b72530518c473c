//! Paste detection state machine.
//!
//! Turns a stream of [`RawKey`]s into normalized [`KeyEvent`]s using two
//! strategies:
//!
//! - **Bracketed paste.** Everything between a `paste-start` and a
//!   `paste-end` marker is accumulated and emitted as one paste event.
//! - **Heuristic buffering.** Outside a bracketed paste, keys are queued and
//!   a flush deadline is pushed back by the paste timeout on every key. When
//!   the deadline passes, a lone key is forwarded and two or more keys are
//!   merged into one paste event.
//!
//! The detector owns no timer. Callers read [`PasteDetector::deadline`],
//! sleep until it, and call [`PasteDetector::expire`].

use std::time::Duration;

use keystream_common::constants::META_RETURN_SEQUENCE;
use keystream_common::types::{KeyEvent, PasteMarker, RawKey};
use tokio::time::Instant;

/// Buffering and accumulation state for one activation.
#[derive(Debug)]
pub struct PasteDetector {
    timeout: Duration,
    queue: Vec<KeyEvent>,
    deadline: Option<Instant>,
    in_paste: bool,
    paste_buffer: String,
}

impl PasteDetector {
    /// Creates an idle detector with the given inter-keystroke timeout.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            queue: Vec::new(),
            deadline: None,
            in_paste: false,
            paste_buffer: String::new(),
        }
    }

    /// Returns when the heuristic buffer should be flushed, if a flush is armed.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` while inside a bracketed paste.
    #[must_use]
    pub const fn in_paste(&self) -> bool {
        self.in_paste
    }

    /// Returns `true` when no key, paste text, or timer is pending.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
            && self.deadline.is_none()
            && !self.in_paste
            && self.paste_buffer.is_empty()
    }

    /// Handles one raw key received at `now`.
    pub fn feed<F>(&mut self, key: RawKey, now: Instant, emit: &mut F)
    where
        F: FnMut(KeyEvent),
    {
        match key.paste_marker() {
            Some(PasteMarker::Start) => {
                self.flush_queue(emit);
                tracing::trace!("bracketed paste started");
                self.in_paste = true;
                self.paste_buffer.clear();
            }
            Some(PasteMarker::End) => {
                self.in_paste = false;
                let text = std::mem::take(&mut self.paste_buffer);
                tracing::debug!(len = text.len(), "bracketed paste finished");
                emit(KeyEvent::paste(text));
            }
            None if self.in_paste => self.paste_buffer.push_str(&key.sequence),
            None => {
                tracing::trace!(name = %key.name, "buffering key");
                self.queue.push(KeyEvent::from(key));
                self.deadline = Some(now + self.timeout);
            }
        }
    }

    /// Flushes the heuristic buffer if its deadline is at or before `now`.
    ///
    /// Returns `true` if the deadline had passed.
    pub fn expire<F>(&mut self, now: Instant, emit: &mut F) -> bool
    where
        F: FnMut(KeyEvent),
    {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.flush_queue(emit);
                true
            }
            _ => false,
        }
    }

    /// Drains all pending state, as on deactivation.
    ///
    /// Cancels the timer, flushes the heuristic buffer, then emits any
    /// half-received bracketed paste. The detector is idle afterwards.
    pub fn finish<F>(&mut self, emit: &mut F)
    where
        F: FnMut(KeyEvent),
    {
        self.flush_queue(emit);
        if self.in_paste {
            self.in_paste = false;
            let text = std::mem::take(&mut self.paste_buffer);
            tracing::debug!(len = text.len(), "emitting unterminated bracketed paste");
            emit(KeyEvent::paste(text));
        }
    }

    fn flush_queue<F>(&mut self, emit: &mut F)
    where
        F: FnMut(KeyEvent),
    {
        self.deadline = None;
        match self.queue.len() {
            0 => {}
            1 => {
                let mut key = self.queue.remove(0);
                // Alt+Enter and a quick ESC, CR pair are indistinguishable here.
                if key.name == "return" && key.sequence == META_RETURN_SEQUENCE {
                    key.meta = true;
                }
                emit(key);
            }
            count => {
                let text: String = self.queue.drain(..).map(|key| key.sequence).collect();
                tracing::debug!(keys = count, len = text.len(), "merged key burst into paste");
                emit(KeyEvent::paste(text));
            }
        }
    }
}
