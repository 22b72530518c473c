//! Terminal control sequences, marker names, and default timings.

/// Escape sequence that enables bracketed paste mode (`ESC [ ? 2004 h`).
pub const BRACKETED_PASTE_ENABLE: &[u8] = b"\x1b[?2004h";

/// Escape sequence that disables bracketed paste mode (`ESC [ ? 2004 l`).
pub const BRACKETED_PASTE_DISABLE: &[u8] = b"\x1b[?2004l";

/// Name carried by the raw event that opens a bracketed paste.
pub const PASTE_START: &str = "paste-start";

/// Name carried by the raw event that closes a bracketed paste.
pub const PASTE_END: &str = "paste-end";

/// Default inter-keystroke gap, in milliseconds, below which buffered keys
/// are treated as a single paste.
///
/// Changing this shifts the line between fast typing and an unmarked paste.
pub const DEFAULT_PASTE_TIMEOUT_MS: u64 = 10;

/// Upper bound accepted for a configured paste timeout.
pub const MAX_PASTE_TIMEOUT_MS: u64 = 1_000;

/// Raw sequence terminals send for Alt+Enter (ESC followed by CR).
pub const META_RETURN_SEQUENCE: &str = "\x1b\r";

/// Environment variable overriding the paste timeout.
pub const ENV_PASTE_TIMEOUT_MS: &str = "KEYSTREAM_PASTE_TIMEOUT_MS";

/// Environment variable disabling the bracketed paste escape sequences.
pub const ENV_NO_BRACKETED_PASTE: &str = "KEYSTREAM_NO_BRACKETED_PASTE";

/// Application name used in CLI output.
pub const APP_NAME: &str = "keystream";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "kst";
