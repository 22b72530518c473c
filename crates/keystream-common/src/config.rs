//! Configuration model for the key event normalizer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PASTE_TIMEOUT_MS, MAX_PASTE_TIMEOUT_MS};
use crate::error::{KeystreamError, Result};

/// Tunables for paste detection and terminal setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Inter-keystroke gap, in milliseconds, that closes a heuristic buffer.
    pub paste_timeout_ms: u64,
    /// Whether to send the bracketed paste enable/disable sequences.
    pub bracketed_paste: bool,
}

impl NormalizerConfig {
    /// Returns the paste timeout as a [`Duration`].
    #[must_use]
    pub const fn paste_timeout(&self) -> Duration {
        Duration::from_millis(self.paste_timeout_ms)
    }

    /// Checks that the configured values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`KeystreamError::Config`] if the paste timeout is zero or
    /// exceeds [`MAX_PASTE_TIMEOUT_MS`].
    pub fn validate(&self) -> Result<()> {
        if self.paste_timeout_ms == 0 {
            return Err(KeystreamError::Config {
                message: "paste timeout must be at least 1 ms".into(),
            });
        }
        if self.paste_timeout_ms > MAX_PASTE_TIMEOUT_MS {
            return Err(KeystreamError::Config {
                message: format!(
                    "paste timeout {} ms exceeds the {MAX_PASTE_TIMEOUT_MS} ms maximum",
                    self.paste_timeout_ms
                ),
            });
        }
        Ok(())
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            paste_timeout_ms: DEFAULT_PASTE_TIMEOUT_MS,
            bracketed_paste: true,
        }
    }
}
