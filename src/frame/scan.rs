//! Prefix scanning for packed notifications.
//!
//! Each telegram type of this meter family has a fixed length determined by
//! its L-field, so a prefix match fixes the telegram boundary. Bytes between
//! matches (envelope markers, metadata, filler) are skipped.

use crate::config::{TelegramKind, TelegramType};
use crate::util::hex::find_subslice;

/// A telegram boundary found by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanHit {
    pub offset: usize,
    pub len: usize,
    pub kind: TelegramKind,
    /// Fewer bytes than the type's fixed length were available
    pub truncated: bool,
}

impl ScanHit {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Earliest prefix match at or after `from`.
///
/// When several prefixes match at the same offset the longest telegram type
/// wins, so a short type cannot split a longer telegram.
pub fn next_prefix<'t>(data: &[u8], types: &'t [TelegramType], from: usize) -> Option<(usize, &'t TelegramType)> {
    (from..data.len()).find_map(|pos| {
        types
            .iter()
            .filter(|t| data[pos..].starts_with(&t.prefix))
            .max_by_key(|t| t.length)
            .map(|t| (pos, t))
    })
}

/// Whether any telegram prefix occurs in `data`
pub fn contains_prefix(data: &[u8], types: &[TelegramType]) -> bool {
    next_prefix(data, types, 0).is_some()
}

/// Walk `data` left to right collecting telegram boundaries.
///
/// A telegram normally spans its type's fixed length. It ends early, and is
/// marked truncated, when the buffer runs out or when a start marker shows
/// up inside it (the concentrator cut the frame and began the next
/// envelope). An end marker directly before such a cut is not telegram data.
pub fn scan_telegrams(data: &[u8], types: &[TelegramType], start: &[u8], end: &[u8]) -> Vec<ScanHit> {
    let mut hits = Vec::new();
    let mut pos = 0;

    while let Some((offset, t)) = next_prefix(data, types, pos) {
        let wanted = offset + t.length;
        let mut stop = wanted.min(data.len());
        let mut truncated = wanted > data.len();

        let body = offset + t.prefix.len();
        if body < stop {
            if let Some(cut) = find_subslice(&data[body..stop], start) {
                stop = body + cut;
                truncated = true;
            }
        }
        let resume = stop;

        if truncated && stop - body >= end.len() && data[..stop].ends_with(end) {
            stop -= end.len();
        }

        hits.push(ScanHit {
            offset,
            len: stop - offset,
            kind: t.kind,
            truncated,
        });
        pos = resume.max(offset + 1);
    }

    hits
}
