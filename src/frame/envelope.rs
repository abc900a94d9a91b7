//! Concentrator envelopes.
//!
//! The VW1871 wraps each relayed radio frame as
//!
//! ```text
//! FB FB FB F0 | metadata (2-3 bytes) | wM-Bus telegram | FE FE 0E 0F
//! ```
//!
//! The end marker is absent when the concentrator cut the frame to fit its
//! buffer. A start marker seen before the end marker also closes the current
//! envelope.

use crate::constants::{ENVELOPE_HEADER_EXTENDED, ENVELOPE_HEADER_STANDARD};
use crate::util::hex::{find_subslice, rfind_subslice};
use std::fmt;

/// One marker-delimited envelope inside a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope<'a> {
    /// Offset of the start marker
    pub offset: usize,
    /// Bytes between the markers
    pub payload: &'a [u8],
    /// End marker was found
    pub complete: bool,
}

impl<'a> Envelope<'a> {
    /// Split the payload into metadata header and telegram bytes.
    ///
    /// Standard frames (`0x11`) carry two metadata bytes, others three.
    pub fn header(&self) -> EnvelopeHeader<'a> {
        let data = self.payload;
        let header_len = if data.first() == Some(&ENVELOPE_HEADER_STANDARD) && data.len() > 2 {
            2
        } else if data.len() > 3 {
            3
        } else {
            data.len().min(2)
        };

        EnvelopeHeader {
            bytes: &data[..header_len],
            body: &data[header_len..],
        }
    }
}

/// Metadata header kind, from its first byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    Standard,
    Extended,
    Unknown(u8),
    Empty,
}

impl fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderKind::Standard => write!(f, "standard frame (0x11)"),
            HeaderKind::Extended => write!(f, "extended frame (0x25)"),
            HeaderKind::Unknown(b) => write!(f, "unknown (0x{b:02X})"),
            HeaderKind::Empty => write!(f, "empty header"),
        }
    }
}

/// Envelope payload split at the metadata boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeHeader<'a> {
    pub bytes: &'a [u8],
    pub body: &'a [u8],
}

impl EnvelopeHeader<'_> {
    pub fn kind(&self) -> HeaderKind {
        match self.bytes.first() {
            None => HeaderKind::Empty,
            Some(&ENVELOPE_HEADER_STANDARD) => HeaderKind::Standard,
            Some(&ENVELOPE_HEADER_EXTENDED) => HeaderKind::Extended,
            Some(&b) => HeaderKind::Unknown(b),
        }
    }

    /// Sequence/control byte following the type byte
    pub fn sequence(&self) -> Option<u8> {
        self.bytes.get(1).copied()
    }

    /// Human-readable interpretation for inspection output
    pub fn describe(&self) -> String {
        let mut parts = vec![format!("type: {}", self.kind())];
        if let Some(seq) = self.sequence() {
            parts.push(format!("seq/ctrl: 0x{seq:02X} ({seq})"));
        }
        if let Some(extra) = self.bytes.get(2) {
            parts.push(format!("extra: 0x{extra:02X}"));
        }
        parts.join(" | ")
    }
}

/// List every envelope in a buffer, left to right.
pub fn find_envelopes<'a>(data: &'a [u8], start: &[u8], end: &[u8]) -> Vec<Envelope<'a>> {
    let mut envelopes = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let Some(rel) = find_subslice(&data[pos..], start) else {
            break;
        };
        let offset = pos + rel;
        let body_start = offset + start.len();
        let rest = &data[body_start..];

        let end_at = find_subslice(rest, end);
        let next_start = find_subslice(rest, start);
        let (body_len, complete, consumed) = match (end_at, next_start) {
            (Some(e), Some(s)) if s < e => (s, false, s),
            (Some(e), _) => (e, true, e + end.len()),
            (None, Some(s)) => (s, false, s),
            (None, None) => (rest.len(), false, rest.len()),
        };

        if body_len > 0 {
            envelopes.push(Envelope {
                offset,
                payload: &rest[..body_len],
                complete,
            });
        }
        pos = body_start + consumed;
    }

    envelopes
}

/// A start marker after which no end marker follows.
///
/// In a notification class that normally carries complete envelopes this
/// hints that an envelope continues in the next notification.
pub fn has_dangling_start(data: &[u8], start: &[u8], end: &[u8]) -> bool {
    match rfind_subslice(data, start) {
        Some(last) => find_subslice(&data[last + start.len()..], end).is_none(),
        None => false,
    }
}
