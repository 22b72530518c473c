//! # keystream-core
//!
//! Turns a raw terminal key stream into normalized key events for an
//! interactive command-line interface, detecting pasted text along the way.
//!
//! Provides:
//! - [`PasteDetector`](detector::PasteDetector): the paste detection state
//!   machine, driven by an external clock.
//! - [`KeypressListener`](listener::KeypressListener): activation lifecycle
//!   (raw mode, bracketed paste) around an async driver task.
//! - [`crossterm_source`](event::crossterm_source): raw keys decoded from the
//!   process terminal.
//! - [`run_script`](script::run_script): deterministic replay of timed keys.
//!
//! # Example
//!
//! ```rust,no_run
//! use keystream_common::config::NormalizerConfig;
//! use keystream_core::listener::KeypressListener;
//!
//! # async fn run() -> keystream_common::error::Result<()> {
//! let mut listener = KeypressListener::stdin(NormalizerConfig::default());
//! listener.activate_stdin(|event| {
//!     if event.paste {
//!         tracing::info!(len = event.sequence.len(), "pasted");
//!     }
//! })?;
//! // ...
//! listener.deactivate().await;
//! # Ok(())
//! # }
//! ```

pub mod detector;
pub mod event;
pub mod listener;
pub mod script;
pub mod terminal;
