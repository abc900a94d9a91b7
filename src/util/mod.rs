//! # Utility Modules
//!
//! Hex handling and logging helpers used throughout the vw1871-rs crate.

pub mod hex;
pub mod logging;

// Re-export commonly used types and functions
pub use self::hex::{clean_hex, decode_hex, encode_hex_upper, find_subslice, format_hex_compact, HexError};
pub use self::logging::{log_frame_hex, LogThrottle};
