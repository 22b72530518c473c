//! Keypress listener lifecycle.
//!
//! A [`KeypressListener`] owns the terminal for the duration of an
//! activation. Activating puts the terminal in raw mode, turns on bracketed
//! paste, and spawns one driver task that feeds raw keys through a
//! [`PasteDetector`] and dispatches the resulting events to the consumer.
//! Deactivating stops the task, waits for its final flush, and restores the
//! terminal. Dropping an active listener aborts the task and drains the
//! detector in place instead, so the flush still precedes the restore.
//!
//! The driver multiplexes three things with a biased `select!`: the shutdown
//! signal, the raw key stream, and a single sleep until the detector's
//! current flush deadline. Every key replaces the deadline, so there is
//! never more than one pending timer. A key read after the deadline has
//! already passed first flushes the expired burst, so a late wakeup never
//! merges keystrokes that arrived more than one timeout apart.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::{Stream, StreamExt};
use keystream_common::config::NormalizerConfig;
use keystream_common::constants::{BRACKETED_PASTE_DISABLE, BRACKETED_PASTE_ENABLE};
use keystream_common::error::{KeystreamError, Result};
use keystream_common::types::{KeyEvent, RawKey};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use crate::detector::PasteDetector;
use crate::event::crossterm_source;
use crate::terminal::{CrosstermTerminal, TerminalControl};

type Consumer = Box<dyn FnMut(KeyEvent) + Send>;

/// Shared handle to the current consumer.
///
/// The driver task always dispatches through the slot, so swapping the
/// consumer takes effect on the next event without touching the stream.
#[derive(Clone)]
struct ConsumerSlot(Arc<Mutex<Consumer>>);

impl ConsumerSlot {
    fn new(consumer: Consumer) -> Self {
        Self(Arc::new(Mutex::new(consumer)))
    }

    fn replace(&self, consumer: Consumer) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = consumer;
    }

    fn dispatch(&self, event: KeyEvent) {
        let mut consumer = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        (*consumer)(event);
    }
}

type SharedDetector = Arc<Mutex<PasteDetector>>;

fn lock(detector: &SharedDetector) -> MutexGuard<'_, PasteDetector> {
    detector.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Terminal side effects performed by one activation, undone on teardown.
#[derive(Debug)]
struct Session {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
    detector: SharedDetector,
    raw_mode: bool,
    bracketed_paste: bool,
}

/// Normalizes a raw key stream into [`KeyEvent`]s for a single consumer.
///
/// The consumer is called from the driver task while an internal lock is
/// held, so it must not call back into [`KeypressListener::set_consumer`].
pub struct KeypressListener<T: TerminalControl> {
    terminal: T,
    config: NormalizerConfig,
    consumer: ConsumerSlot,
    session: Option<Session>,
}

impl<T: TerminalControl> std::fmt::Debug for KeypressListener<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeypressListener")
            .field("config", &self.config)
            .field("active", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

impl KeypressListener<CrosstermTerminal> {
    /// Creates a listener bound to the process terminal.
    #[must_use]
    pub fn stdin(config: NormalizerConfig) -> Self {
        Self::new(CrosstermTerminal::new(), config)
    }

    /// Activates on the process terminal's own key stream.
    ///
    /// # Errors
    ///
    /// See [`KeypressListener::activate`].
    pub fn activate_stdin<F>(&mut self, on_event: F) -> Result<()>
    where
        F: FnMut(KeyEvent) + Send + 'static,
    {
        self.activate(crossterm_source(), on_event)
    }
}

impl<T: TerminalControl> KeypressListener<T> {
    /// Creates an inactive listener.
    #[must_use]
    pub fn new(terminal: T, config: NormalizerConfig) -> Self {
        Self {
            terminal,
            config,
            consumer: ConsumerSlot::new(Box::new(|_| {})),
            session: None,
        }
    }

    /// Returns the normalizer configuration.
    #[must_use]
    pub const fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Returns whether the listener is currently attached to a source.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Replaces the consumer without re-subscribing to the source.
    pub fn set_consumer<F>(&self, on_event: F)
    where
        F: FnMut(KeyEvent) + Send + 'static,
    {
        self.consumer.replace(Box::new(on_event));
    }

    /// Starts listening on `source`, delivering normalized events to `on_event`.
    ///
    /// Enables raw mode and bracketed paste when the terminal is interactive.
    /// Terminal write failures are logged and otherwise ignored. Must be
    /// called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`KeystreamError::AlreadyActive`] if the listener has not been
    /// deactivated since the last activation, or [`KeystreamError::Config`]
    /// if the configuration is invalid.
    pub fn activate<S, F>(&mut self, source: S, on_event: F) -> Result<()>
    where
        S: Stream<Item = io::Result<RawKey>> + Send + Unpin + 'static,
        F: FnMut(KeyEvent) + Send + 'static,
    {
        if self.session.is_some() {
            return Err(KeystreamError::AlreadyActive);
        }
        self.config.validate()?;
        self.consumer.replace(Box::new(on_event));

        let interactive = self.terminal.is_tty();
        let raw_mode = interactive && self.enable_raw_mode();
        let bracketed_paste = interactive && self.config.bracketed_paste;
        if bracketed_paste {
            self.write_escape(BRACKETED_PASTE_ENABLE);
        }

        let (shutdown, shutdown_rx) = oneshot::channel();
        let detector = Arc::new(Mutex::new(PasteDetector::new(self.config.paste_timeout())));
        let task = tokio::spawn(drive(
            source,
            Arc::clone(&detector),
            self.consumer.clone(),
            shutdown_rx,
        ));

        tracing::info!(
            interactive,
            bracketed_paste,
            paste_timeout_ms = self.config.paste_timeout_ms,
            "keypress listener activated"
        );
        self.session = Some(Session {
            shutdown,
            task,
            detector,
            raw_mode,
            bracketed_paste,
        });
        Ok(())
    }

    /// Stops listening and restores the terminal.
    ///
    /// Pending keys and any unterminated bracketed paste are delivered to the
    /// consumer before this returns. Does nothing when inactive.
    pub async fn deactivate(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let _ = session.shutdown.send(());
        if let Err(err) = session.task.await {
            tracing::warn!(error = %err, "keypress driver task failed");
        }
        self.restore(session.raw_mode, session.bracketed_paste);
        tracing::info!("keypress listener deactivated");
    }

    fn enable_raw_mode(&mut self) -> bool {
        match self.terminal.set_raw_mode(true) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "failed to enable raw mode");
                false
            }
        }
    }

    fn write_escape(&mut self, bytes: &[u8]) {
        if let Err(err) = self.terminal.write_escape(bytes) {
            tracing::warn!(error = %err, "failed to write terminal control sequence");
        }
    }

    fn restore(&mut self, raw_mode: bool, bracketed_paste: bool) {
        if bracketed_paste {
            self.write_escape(BRACKETED_PASTE_DISABLE);
        }
        if raw_mode {
            if let Err(err) = self.terminal.set_raw_mode(false) {
                tracing::warn!(error = %err, "failed to disable raw mode");
            }
        }
    }
}

impl<T: TerminalControl> Drop for KeypressListener<T> {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        // Keys the driver is still reading concurrently are discarded, as
        // with any key not yet read at deactivation.
        session.task.abort();
        let consumer = self.consumer.clone();
        lock(&session.detector).finish(&mut |event| consumer.dispatch(event));
        self.restore(session.raw_mode, session.bracketed_paste);
        tracing::info!("keypress listener dropped while active");
    }
}

async fn drive<S>(
    mut source: S,
    detector: SharedDetector,
    consumer: ConsumerSlot,
    mut shutdown: oneshot::Receiver<()>,
) where
    S: Stream<Item = io::Result<RawKey>> + Send + Unpin + 'static,
{
    let mut emit = |event: KeyEvent| consumer.dispatch(event);
    let mut source_open = true;

    loop {
        let deadline = lock(&detector).deadline();
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            item = source.next(), if source_open => match item {
                Some(Ok(key)) => {
                    let now = Instant::now();
                    let mut state = lock(&detector);
                    let _ = state.expire(now, &mut emit);
                    state.feed(key, now, &mut emit);
                }
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "raw key source failed, no further keys will be read");
                    source_open = false;
                }
                None => {
                    tracing::debug!("raw key source ended");
                    source_open = false;
                }
            },
            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                let _ = lock(&detector).expire(Instant::now(), &mut emit);
            }
        }
    }

    lock(&detector).finish(&mut emit);
}
