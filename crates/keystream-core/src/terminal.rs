//! Terminal mode control.
//!
//! The listener never touches the terminal directly. It goes through
//! [`TerminalControl`], which has a crossterm-backed implementation for real
//! terminals and an in-memory one for headless runs.

use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Raw-mode toggle and escape sequence sink.
pub trait TerminalControl: Send {
    /// Returns whether input comes from a genuine interactive terminal.
    fn is_tty(&self) -> bool;

    /// Switches raw input mode on or off.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal mode could not be changed.
    fn set_raw_mode(&mut self, enabled: bool) -> io::Result<()>;

    /// Writes a control sequence to the output stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or flush fails.
    fn write_escape(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// Controls the process terminal through crossterm and stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrosstermTerminal;

impl CrosstermTerminal {
    /// Creates a handle to the process terminal.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TerminalControl for CrosstermTerminal {
    fn is_tty(&self) -> bool {
        io::stdin().is_terminal()
    }

    fn set_raw_mode(&mut self, enabled: bool) -> io::Result<()> {
        if enabled {
            crossterm::terminal::enable_raw_mode()
        } else {
            crossterm::terminal::disable_raw_mode()
        }
    }

    fn write_escape(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()
    }
}

/// One observable terminal side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalOp {
    /// Raw mode was switched.
    RawMode(bool),
    /// A control sequence was written.
    Escape(Vec<u8>),
}

/// In-memory terminal that records every operation.
///
/// Clones share the same log, so a caller can keep one clone for inspection
/// after handing another to a listener.
#[derive(Debug, Clone)]
pub struct RecordingTerminal {
    tty: bool,
    ops: Arc<Mutex<Vec<TerminalOp>>>,
}

impl RecordingTerminal {
    /// Creates a recorder that reports itself as an interactive terminal
    /// when `tty` is true.
    #[must_use]
    pub fn new(tty: bool) -> Self {
        Self {
            tty,
            ops: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a snapshot of the recorded operations.
    #[must_use]
    pub fn ops(&self) -> Vec<TerminalOp> {
        self.ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns whether raw mode is currently on, according to the log.
    #[must_use]
    pub fn raw_mode(&self) -> bool {
        self.ops()
            .iter()
            .rev()
            .find_map(|op| match op {
                TerminalOp::RawMode(enabled) => Some(*enabled),
                TerminalOp::Escape(_) => None,
            })
            .unwrap_or(false)
    }

    fn record(&self, op: TerminalOp) {
        self.ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(op);
    }
}

impl TerminalControl for RecordingTerminal {
    fn is_tty(&self) -> bool {
        self.tty
    }

    fn set_raw_mode(&mut self, enabled: bool) -> io::Result<()> {
        self.record(TerminalOp::RawMode(enabled));
        Ok(())
    }

    fn write_escape(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.record(TerminalOp::Escape(bytes.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_clones_share_log() {
        let recorder = RecordingTerminal::new(true);
        let mut handle = recorder.clone();
        handle.set_raw_mode(true).expect("raw on");
        handle.write_escape(b"\x1b[?2004h").expect("write");
        assert_eq!(
            recorder.ops(),
            vec![
                TerminalOp::RawMode(true),
                TerminalOp::Escape(b"\x1b[?2004h".to_vec()),
            ]
        );
        assert!(recorder.raw_mode());
    }

    #[test]
    fn raw_mode_defaults_to_off() {
        let recorder = RecordingTerminal::new(false);
        assert!(!recorder.is_tty());
        assert!(!recorder.raw_mode());
    }
}
