//! Notification normalizer.
//!
//! Turns whatever the BLE bridge printed (hex text in any case, with or
//! without separators) or delivered (raw bytes) into one canonical form: the
//! decoded bytes plus their uppercase hex rendering.

use crate::util::hex::{clean_hex, encode_hex_upper, HexError};
use std::fmt;

/// A validated notification buffer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedHex {
    hex: String,
    bytes: Vec<u8>,
}

impl NormalizedHex {
    /// Uppercase hex without separators
    pub fn as_str(&self) -> &str {
        &self.hex
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Display for NormalizedHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

/// Validate hex text.
///
/// Whitespace and `: - _ ,` separators are removed first; any other non-hex
/// character, or an odd digit count, is rejected. Empty text is a valid empty
/// notification.
pub fn normalize_hex(input: &str) -> Result<NormalizedHex, HexError> {
    let digits = clean_hex(input)?;
    let bytes = hex::decode(&digits).map_err(|_| HexError::OddLength(digits.len()))?;
    Ok(NormalizedHex { hex: digits, bytes })
}

/// Wrap raw bytes; always succeeds.
pub fn normalize_bytes(raw: &[u8]) -> NormalizedHex {
    NormalizedHex {
        hex: encode_hex_upper(raw),
        bytes: raw.to_vec(),
    }
}
