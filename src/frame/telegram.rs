//! Extracted telegrams.
//!
//! A [`Telegram`] is the concentrator payload with the envelope removed,
//! byte-for-byte as received. The downstream decoder checks CRCs and
//! decrypts, so nothing here alters content; the flags only describe how
//! the bytes were recovered.

use crate::config::TelegramKind;
use crate::notification::format_telegram_line;
use crate::util::hex::encode_hex_upper;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Recovery notes attached to a telegram
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TelegramFlags: u8 {
        /// Shorter than the fixed length of its type
        const TRUNCATED = 0x01;
        /// Does not contain the configured device address
        const DEVICE_MISMATCH = 0x02;
        /// Envelope had no end marker
        const MISSING_TRAILER = 0x04;
    }
}

/// Classification used by the diagnostic counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelegramClass {
    Compact,
    Full,
    Truncated,
    Unrecognized,
}

/// One telegram ready for the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Telegram {
    bytes: Vec<u8>,
    kind: Option<TelegramKind>,
    offset: usize,
    flags: TelegramFlags,
}

impl Telegram {
    pub(crate) fn new(bytes: &[u8], kind: Option<TelegramKind>, offset: usize, flags: TelegramFlags) -> Self {
        Self {
            bytes: bytes.to_vec(),
            kind,
            offset,
            flags,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Telegram type matched by prefix, `None` for unprefixed payloads
    pub fn kind(&self) -> Option<TelegramKind> {
        self.kind
    }

    /// Byte offset of the telegram within its notification
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn flags(&self) -> TelegramFlags {
        self.flags
    }

    pub fn is_truncated(&self) -> bool {
        self.flags.contains(TelegramFlags::TRUNCATED)
    }

    pub fn class(&self) -> TelegramClass {
        if self.is_truncated() {
            return TelegramClass::Truncated;
        }
        match self.kind {
            Some(TelegramKind::Compact) => TelegramClass::Compact,
            Some(TelegramKind::Full) => TelegramClass::Full,
            None => TelegramClass::Unrecognized,
        }
    }

    /// Uppercase hex, the value handed to the sink
    pub fn to_hex(&self) -> String {
        encode_hex_upper(&self.bytes)
    }

    /// `telegram=|HEX|` line for line-oriented sinks
    pub fn to_line(&self) -> String {
        format_telegram_line(&self.to_hex())
    }

    pub fn header(&self) -> Option<TelegramHeader> {
        TelegramHeader::peek(&self.bytes)
    }
}

impl fmt::Display for Telegram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Link-layer fields at the start of a wM-Bus telegram.
///
/// Read for logging and inspection only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelegramHeader {
    /// L-field: number of bytes following it
    pub length: u8,
    pub c_field: u8,
    pub manufacturer: u16,
    /// Identification number, BCD
    pub id: u32,
    pub version: u8,
    pub device_type: u8,
}

impl TelegramHeader {
    /// Bytes needed to read the header
    pub const LEN: usize = 10;

    pub fn peek(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::LEN {
            return None;
        }
        Some(Self {
            length: bytes[0],
            c_field: bytes[1],
            manufacturer: u16::from_le_bytes([bytes[2], bytes[3]]),
            id: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            version: bytes[8],
            device_type: bytes[9],
        })
    }

    /// Total telegram length announced by the L-field
    pub fn declared_len(&self) -> usize {
        self.length as usize + 1
    }

    /// Three-letter manufacturer code
    pub fn manufacturer_code(&self) -> String {
        manufacturer_code(self.manufacturer)
    }

    /// Meter identification as printed on the device
    pub fn device_id(&self) -> String {
        format!("{:08X}", self.id)
    }
}

impl fmt::Display for TelegramHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "L={:02X} C={:02X} M={} id={} ver={:02X} type={:02X}",
            self.length,
            self.c_field,
            self.manufacturer_code(),
            self.device_id(),
            self.version,
            self.device_type
        )
    }
}

/// Decode the 15-bit packed manufacturer identifier
pub fn manufacturer_code(id: u16) -> String {
    let letter = |v: u16| -> Option<char> {
        let v = (v & 0x1F) as u8;
        (1..=26).contains(&v).then(|| (b'A' + v - 1) as char)
    };

    match (letter(id >> 10), letter(id >> 5), letter(id)) {
        (Some(a), Some(b), Some(c)) => format!("{a}{b}{c}"),
        _ => format!("{id:04X}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::hex::decode_hex;

    const COMPACT: &str =
        "25442D2C703749741F168D208E320502213A4A3B74FA49CEF847D54C4FB74C4175ED60D3E8D9";

    #[test]
    fn test_header_peek() {
        let bytes = decode_hex(COMPACT).unwrap();
        let header = TelegramHeader::peek(&bytes).unwrap();
        assert_eq!(header.declared_len(), 38);
        assert_eq!(header.c_field, 0x44);
        assert_eq!(header.manufacturer_code(), "KAM");
        assert_eq!(header.device_id(), "74493770");
        assert_eq!(header.version, 0x1F);
        assert_eq!(header.device_type, 0x16);
        assert!(header.to_string().contains("M=KAM id=74493770"));
    }

    #[test]
    fn test_header_too_short() {
        assert!(TelegramHeader::peek(&[0x25, 0x44, 0x2D]).is_none());
    }

    #[test]
    fn test_manufacturer_code_invalid_letters() {
        assert_eq!(manufacturer_code(0x0000), "0000");
        assert_eq!(manufacturer_code(0x2C2D), "KAM");
    }

    #[test]
    fn test_telegram_class_and_line() {
        let bytes = decode_hex(COMPACT).unwrap();
        let t = Telegram::new(&bytes, Some(TelegramKind::Compact), 4, TelegramFlags::empty());
        assert_eq!(t.class(), TelegramClass::Compact);
        assert_eq!(t.to_line(), format!("telegram=|{COMPACT}|"));
        assert_eq!(t.offset(), 4);

        let short = Telegram::new(&bytes[..20], Some(TelegramKind::Compact), 0, TelegramFlags::TRUNCATED);
        assert_eq!(short.class(), TelegramClass::Truncated);

        let unknown = Telegram::new(&bytes[4..], None, 0, TelegramFlags::empty());
        assert_eq!(unknown.class(), TelegramClass::Unrecognized);
    }
}
