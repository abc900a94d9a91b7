//! Envelope survey over many notifications.
//!
//! Collects metadata header patterns, sequence bytes and payload lengths of
//! every marker-delimited envelope. Used when a firmware update changes the
//! wrapper layout and the size table has to be re-derived from captures.

use crate::frame::envelope::find_envelopes;
use crate::util::hex::encode_hex_upper;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, Serialize)]
pub struct EnvelopeSurvey {
    pub envelopes: u64,
    /// Envelopes without an end marker
    pub incomplete: u64,
    /// Occurrences per metadata header (hex)
    pub header_patterns: BTreeMap<String, u64>,
    /// Distinct sequence bytes per header type byte
    pub sequences: BTreeMap<u8, BTreeSet<u8>>,
    /// Envelope payload length distribution
    pub payload_lengths: BTreeMap<usize, u64>,
}

impl EnvelopeSurvey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every envelope found in one notification
    pub fn add_notification(&mut self, data: &[u8], start: &[u8], end: &[u8]) {
        for envelope in find_envelopes(data, start, end) {
            self.envelopes += 1;
            if !envelope.complete {
                self.incomplete += 1;
            }
            *self.payload_lengths.entry(envelope.payload.len()).or_insert(0) += 1;

            let header = envelope.header();
            *self
                .header_patterns
                .entry(encode_hex_upper(header.bytes))
                .or_insert(0) += 1;
            if let (Some(&kind), Some(seq)) = (header.bytes.first(), header.sequence()) {
                self.sequences.entry(kind).or_default().insert(seq);
            }
        }
    }

    /// Header patterns, most frequent first
    pub fn most_common_headers(&self) -> Vec<(&str, u64)> {
        let mut patterns: Vec<(&str, u64)> = self
            .header_patterns
            .iter()
            .map(|(pattern, count)| (pattern.as_str(), *count))
            .collect();
        patterns.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        patterns
    }
}
