//! VW1871 Concentrator Constants
//!
//! Framing constants observed on the VW1871 BLE concentrator when relaying
//! Kamstrup flowIQ 2101 water meter telegrams. These values seed the default
//! [`ExtractorConfig`](crate::config::ExtractorConfig); every one of them can
//! be overridden at runtime.

/// Start-of-envelope marker emitted before every relayed telegram
pub const VW1871_START_MARKER: [u8; 4] = [0xFB, 0xFB, 0xFB, 0xF0];

/// End-of-envelope marker, missing when the concentrator truncated the frame
pub const VW1871_END_MARKER: [u8; 4] = [0xFE, 0xFE, 0x0E, 0x0F];

// ----------------------------------------------------------------------------
// Telegram types (L-field, C-field SND_NR, manufacturer KAM)
// ----------------------------------------------------------------------------

/// Compact frame prefix: L=0x25, C=0x44, M=0x2C2D
pub const COMPACT_TELEGRAM_PREFIX: [u8; 4] = [0x25, 0x44, 0x2D, 0x2C];

/// Compact frame length in bytes (L-field 0x25 + 1)
pub const COMPACT_TELEGRAM_LEN: usize = 38;

/// Full frame prefix: L=0x30, C=0x44, M=0x2C2D
pub const FULL_TELEGRAM_PREFIX: [u8; 4] = [0x30, 0x44, 0x2D, 0x2C];

/// Full frame length in bytes (L-field 0x30 + 1)
pub const FULL_TELEGRAM_LEN: usize = 49;

/// Telegrams shorter than this are treated as status bytes or fragments
pub const MIN_TELEGRAM_LEN: usize = 10;

/// A-field of the reference meter 74493770 (id LE BCD, version, device type)
pub const FLOWIQ2101_DEVICE_ADDRESS: [u8; 6] = [0x70, 0x37, 0x49, 0x74, 0x1F, 0x16];

// ----------------------------------------------------------------------------
// Notification size classes (exact BLE notification length in bytes)
// ----------------------------------------------------------------------------

/// One compact telegram behind a 15-byte metadata header
pub const NOTIFICATION_SIZE_COMPACT: usize = 59;

/// One full telegram behind a 15-byte metadata header
pub const NOTIFICATION_SIZE_FULL: usize = 70;

/// One compact telegram behind a 54-byte header (intermediate class)
pub const NOTIFICATION_SIZE_INTERMEDIATE: usize = 96;

/// Several envelopes packed into one notification
pub const NOTIFICATION_SIZE_PACKED: usize = 244;

/// Header width for the 59 and 70 byte classes
pub const SINGLE_HEADER_LEN: usize = 15;

/// Trailer width for the 59 and 70 byte classes
pub const SINGLE_TRAILER_LEN: usize = 6;

/// Header width for the 96 byte class
pub const INTERMEDIATE_HEADER_LEN: usize = 54;

/// Trailer width for the 96 byte class
pub const INTERMEDIATE_TRAILER_LEN: usize = 4;

// ----------------------------------------------------------------------------
// Sink line format
// ----------------------------------------------------------------------------

/// Opening delimiter of a sink line (`telegram=|HEX|`)
pub const TELEGRAM_LINE_OPEN: &str = "telegram=|";

/// Closing delimiter of a sink line
pub const TELEGRAM_LINE_CLOSE: &str = "|";

// ----------------------------------------------------------------------------
// Envelope metadata header type bytes
// ----------------------------------------------------------------------------

/// Standard frame metadata header
pub const ENVELOPE_HEADER_STANDARD: u8 = 0x11;

/// Extended frame metadata header
pub const ENVELOPE_HEADER_EXTENDED: u8 = 0x25;
