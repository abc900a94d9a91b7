//! # Hex Encoding/Decoding Utilities
//!
//! Hex helpers shared by the normalizer, the configuration layer and the
//! diagnostics output. Concentrator notifications travel as hex text between
//! the BLE bridge and the decoder, so strict validation lives here.
//!
//! ## Usage
//!
//! ```rust
//! use vw1871_rs::util::hex::{decode_hex, encode_hex_upper, format_hex_compact};
//!
//! let data = decode_hex("fb fb fb f0").unwrap();
//! assert_eq!(encode_hex_upper(&data), "FBFBFBF0");
//! assert_eq!(format_hex_compact(&data), "FB FB FB F0");
//! ```

use thiserror::Error;

/// Errors that can occur during hex operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("Invalid hex character: {0:?}")]
    InvalidCharacter(char),

    #[error("Odd number of hex characters: {0}")]
    OddLength(usize),
}

/// Characters tolerated between hex digits
pub fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ':' | '-' | '_' | ',')
}

/// Strip separators and validate the remaining digits.
///
/// Returns the uppercase digit string. An empty input is valid and yields an
/// empty string.
pub fn clean_hex(input: &str) -> Result<String, HexError> {
    let mut digits = String::with_capacity(input.len());
    for c in input.chars() {
        if is_separator(c) {
            continue;
        }
        if !c.is_ascii_hexdigit() {
            return Err(HexError::InvalidCharacter(c));
        }
        digits.push(c.to_ascii_uppercase());
    }

    if digits.len() % 2 != 0 {
        return Err(HexError::OddLength(digits.len()));
    }
    Ok(digits)
}

/// Decode hex text (separators allowed) to bytes
pub fn decode_hex(input: &str) -> Result<Vec<u8>, HexError> {
    let digits = clean_hex(input)?;
    // clean_hex already rejected anything hex::decode could fail on
    hex::decode(&digits).map_err(|_| HexError::OddLength(digits.len()))
}

/// Encode bytes to uppercase hex string
///
/// This is the canonical telegram representation handed to the sink.
pub fn encode_hex_upper(data: &[u8]) -> String {
    hex::encode_upper(data)
}

/// Format hex data for compact display (useful for logs)
pub fn format_hex_compact(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Position of the first occurrence of `needle` in `haystack`
pub fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Position of the last occurrence of `needle` in `haystack`
pub fn rfind_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Serde adapter storing byte strings as uppercase hex text
pub mod serde_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode_hex_upper(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::decode_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for optional hex byte strings
pub mod serde_hex_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_some(&super::encode_hex_upper(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => super::decode_hex(&text)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_hex_strips_separators() {
        assert_eq!(clean_hex("fb:fb-fb_f0, 25 44").unwrap(), "FBFBFBF02544");
        assert_eq!(clean_hex("").unwrap(), "");
    }

    #[test]
    fn test_clean_hex_rejects() {
        assert_eq!(clean_hex("FBG0"), Err(HexError::InvalidCharacter('G')));
        assert_eq!(clean_hex("FBF"), Err(HexError::OddLength(3)));
        assert_eq!(clean_hex("0x25"), Err(HexError::InvalidCharacter('x')));
    }

    #[test]
    fn test_decode_with_whitespace() {
        let expected = vec![0xFE, 0xFE, 0x0E, 0x0F];
        assert_eq!(decode_hex("fe fe 0e 0f").unwrap(), expected);
        assert_eq!(encode_hex_upper(&expected), "FEFE0E0F");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_hex_compact(&[0x25, 0x44, 0x2D]), "25 44 2D");
        assert_eq!(format_hex_compact(&[]), "");
    }

    #[test]
    fn test_find_subslice() {
        let data = [0x00, 0x25, 0x44, 0x00, 0x25, 0x44];
        assert_eq!(find_subslice(&data, &[0x25, 0x44]), Some(1));
        assert_eq!(rfind_subslice(&data, &[0x25, 0x44]), Some(4));
        assert_eq!(find_subslice(&data, &[0x30]), None);
        assert_eq!(find_subslice(&data, &[]), None);
        assert_eq!(find_subslice(&[0x25], &[0x25, 0x44]), None);
    }
}
