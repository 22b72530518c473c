//! Timed replay scripts.
//!
//! A script is a JSON array of raw keys stamped with the millisecond offset
//! at which they arrive:
//!
//! ```json
//! [
//!   { "at_ms": 0, "key": { "name": "a", "sequence": "a" } },
//!   { "at_ms": 2, "key": { "name": "b", "sequence": "b" } }
//! ]
//! ```
//!
//! Replaying runs the keys through a [`PasteDetector`] on a synthetic clock,
//! so the result is exactly what a live listener would emit for the same
//! timing.

use std::path::Path;
use std::time::Duration;

use keystream_common::config::NormalizerConfig;
use keystream_common::error::{KeystreamError, Result};
use keystream_common::types::{KeyEvent, RawKey};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::detector::PasteDetector;

/// A raw key and its arrival time relative to the start of the script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedKey {
    /// Arrival offset in milliseconds.
    pub at_ms: u64,
    /// The key that arrives.
    pub key: RawKey,
}

impl TimedKey {
    /// Creates a timed key.
    #[must_use]
    pub const fn new(at_ms: u64, key: RawKey) -> Self {
        Self { at_ms, key }
    }
}

/// Parses a script from JSON text.
///
/// # Errors
///
/// Returns [`KeystreamError::Serialization`] for malformed JSON and
/// [`KeystreamError::Script`] if arrival times ever decrease.
pub fn parse_script(json: &str) -> Result<Vec<TimedKey>> {
    let keys: Vec<TimedKey> = serde_json::from_str(json)?;
    if let Some(index) = keys.windows(2).position(|pair| pair[1].at_ms < pair[0].at_ms) {
        return Err(KeystreamError::Script {
            entry: index + 2,
            message: format!(
                "arrival time {} ms is earlier than the previous {} ms",
                keys[index + 1].at_ms,
                keys[index].at_ms
            ),
        });
    }
    Ok(keys)
}

/// Reads and parses a script file.
///
/// # Errors
///
/// Returns [`KeystreamError::Io`] if the file cannot be read, or any error
/// from [`parse_script`].
pub fn load_script(path: &Path) -> Result<Vec<TimedKey>> {
    let json = std::fs::read_to_string(path).map_err(|source| KeystreamError::Io {
        context: format!("reading replay script {}", path.display()),
        source,
    })?;
    parse_script(&json)
}

/// Replays `keys` and returns the normalized events in emission order.
///
/// A key arriving exactly at the flush deadline lands after the flush.
/// After the last key, the pending timer is allowed to fire and the
/// detector is then drained as on deactivation.
///
/// # Errors
///
/// Returns [`KeystreamError::Config`] if `config` is invalid.
pub fn run_script(keys: &[TimedKey], config: &NormalizerConfig) -> Result<Vec<KeyEvent>> {
    config.validate()?;

    let start = Instant::now();
    let mut detector = PasteDetector::new(config.paste_timeout());
    let mut events = Vec::new();
    let mut emit = |event: KeyEvent| events.push(event);

    for entry in keys {
        let now = start + Duration::from_millis(entry.at_ms);
        let _ = detector.expire(now, &mut emit);
        detector.feed(entry.key.clone(), now, &mut emit);
    }
    if let Some(deadline) = detector.deadline() {
        let _ = detector.expire(deadline, &mut emit);
    }
    detector.finish(&mut emit);

    tracing::debug!(keys = keys.len(), events = events.len(), "replayed script");
    Ok(events)
}

#[cfg(test)]
mod tests {
    use keystream_common::types::PasteMarker;

    use super::*;

    #[test]
    fn parses_keys_with_default_modifiers() {
        let keys = parse_script(
            r#"[{"at_ms": 0, "key": {"name": "a", "sequence": "a"}},
                {"at_ms": 2, "key": {"name": "b", "sequence": "b", "shift": true}}]"#,
        )
        .expect("parse");
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0], TimedKey::new(0, RawKey::new("a", "a")));
        assert!(keys[1].key.shift);
    }

    #[test]
    fn decreasing_times_are_rejected() {
        let err = parse_script(
            r#"[{"at_ms": 5, "key": {"name": "a", "sequence": "a"}},
                {"at_ms": 3, "key": {"name": "b", "sequence": "b"}}]"#,
        )
        .expect_err("out of order");
        assert!(matches!(err, KeystreamError::Script { entry: 2, .. }));
    }

    #[test]
    fn out_of_order_entry_is_reported_by_position() {
        let err = parse_script(
            r#"[{"at_ms": 0, "key": {"name": "a", "sequence": "a"}},
                {"at_ms": 9, "key": {"name": "b", "sequence": "b"}},
                {"at_ms": 4, "key": {"name": "c", "sequence": "c"}}]"#,
        )
        .expect_err("out of order");
        assert!(
            err.to_string().starts_with("invalid replay script at entry 3:"),
            "{err}"
        );
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = parse_script("{").expect_err("bad json");
        assert!(matches!(err, KeystreamError::Serialization { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_script(&dir.path().join("absent.json")).expect_err("missing");
        assert!(matches!(err, KeystreamError::Io { .. }));
    }

    #[test]
    fn replay_merges_fast_keys_and_keeps_slow_ones() {
        let keys = vec![
            TimedKey::new(0, RawKey::new("a", "a")),
            TimedKey::new(2, RawKey::new("b", "b")),
            TimedKey::new(100, RawKey::new("c", "c")),
        ];
        let events = run_script(&keys, &NormalizerConfig::default()).expect("replay");
        assert_eq!(
            events,
            vec![
                KeyEvent::paste("ab"),
                KeyEvent::from(RawKey::new("c", "c"))
            ]
        );
    }

    #[test]
    fn replay_respects_configured_timeout() {
        let keys = vec![
            TimedKey::new(0, RawKey::new("a", "a")),
            TimedKey::new(30, RawKey::new("b", "b")),
        ];
        let config = NormalizerConfig {
            paste_timeout_ms: 50,
            ..NormalizerConfig::default()
        };
        let events = run_script(&keys, &config).expect("replay");
        assert_eq!(events, vec![KeyEvent::paste("ab")]);
    }

    #[test]
    fn replay_drains_unterminated_paste() {
        let keys = vec![
            TimedKey::new(0, RawKey::marker(PasteMarker::Start)),
            TimedKey::new(1, RawKey::new("", "partial")),
        ];
        let events = run_script(&keys, &NormalizerConfig::default()).expect("replay");
        assert_eq!(events, vec![KeyEvent::paste("partial")]);
    }
}
