//! # Frame Extractor
//!
//! Recovers wM-Bus telegrams from one concentrator notification. Strategies
//! are tried in a fixed order:
//!
//! 1. **Wrapper strip** - the whole buffer is one `start .. end` envelope
//!    holding a single telegram.
//! 2. **Size class** - the exact notification length selects a strip rule
//!    (fixed header and trailer widths) or a scan rule.
//! 3. **Multi scan** - telegram prefixes are located and each telegram is
//!    cut at its type's fixed length.
//! 4. **Fallback** - unknown sizes are scanned when a prefix is present,
//!    otherwise marker-delimited envelopes are emitted as they are.
//!
//! Extraction never fails on damaged content. Unclear boundaries produce an
//! empty result or a flagged telegram, and the downstream decoder's CRC and
//! decryption checks have the final word.

use super::envelope::{find_envelopes, has_dangling_start};
use super::scan::{contains_prefix, next_prefix, scan_telegrams};
use super::size_class::SizeClassTable;
use super::telegram::{Telegram, TelegramFlags};
use crate::config::{ExtractorConfig, SizeRule, TelegramKind};
use crate::error::ExtractError;
use crate::notification::{normalize_hex, RawNotification};
use crate::util::hex::find_subslice;
use crate::util::logging::log_frame_hex;
use bitflags::bitflags;
use std::fmt;
use std::ops::Range;

bitflags! {
    /// Notification-level diagnostics
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Anomalies: u8 {
        /// Length matched no size class; fallback scanning was used
        const UNRECOGNIZED_SIZE = 0x01;
        /// No telegram could be recovered
        const NO_TELEGRAM = 0x02;
        /// At least one telegram is shorter than its type's length
        const TRUNCATED = 0x04;
        /// Start marker without end marker in a class that normally completes
        const DANGLING_START_MARKER = 0x08;
        /// At least one telegram lacks the configured device address
        const DEVICE_MISMATCH = 0x10;
        /// A candidate below the minimum length was dropped
        const SHORT_DROPPED = 0x20;
        /// Bytes outside every envelope were not emitted by the generic strip
        const UNFRAMED_BYTES = 0x40;
    }
}

/// Strategy that produced the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Empty buffer
    Empty,
    WrapperStrip,
    SizeClassStrip,
    MultiScan,
    /// Prefix scan over a buffer whose size rule did not apply
    FallbackScan,
    /// Marker-delimited envelopes without any known prefix
    GenericStrip,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Empty => "empty",
            Strategy::WrapperStrip => "wrapper-strip",
            Strategy::SizeClassStrip => "size-class-strip",
            Strategy::MultiScan => "multi-scan",
            Strategy::FallbackScan => "fallback-scan",
            Strategy::GenericStrip => "generic-strip",
        };
        f.write_str(name)
    }
}

/// Side-channel diagnostics for one notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Notification length in bytes
    pub len: usize,
    /// Matched size class, if any
    pub size_class: Option<usize>,
    pub strategy: Strategy,
    pub anomalies: Anomalies,
    /// Candidates dropped for being shorter than the minimum
    pub dropped: usize,
    /// Bytes the generic strip found outside every envelope
    pub unframed: usize,
}

impl ExtractionReport {
    fn new(len: usize) -> Self {
        Self {
            len,
            size_class: None,
            strategy: Strategy::Empty,
            anomalies: Anomalies::empty(),
            dropped: 0,
            unframed: 0,
        }
    }

    pub fn is_unrecognized_size(&self) -> bool {
        self.anomalies.contains(Anomalies::UNRECOGNIZED_SIZE)
    }

    pub fn has_dangling_start(&self) -> bool {
        self.anomalies.contains(Anomalies::DANGLING_START_MARKER)
    }
}

/// Telegrams recovered from one notification, in byte order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub telegrams: Vec<Telegram>,
    pub report: ExtractionReport,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.telegrams.is_empty()
    }

    pub fn len(&self) -> usize {
        self.telegrams.len()
    }

    /// Telegrams as uppercase hex strings
    pub fn hex_strings(&self) -> Vec<String> {
        self.telegrams.iter().map(Telegram::to_hex).collect()
    }
}

struct Candidate {
    range: Range<usize>,
    kind: Option<TelegramKind>,
    flags: TelegramFlags,
}

/// Stateless telegram extractor bound to one configuration
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractorConfig,
    sizes: SizeClassTable,
}

impl Default for Extractor {
    /// Extractor for the VW1871 defaults
    fn default() -> Self {
        Self::from_validated(ExtractorConfig::default())
    }
}

impl Extractor {
    /// Validate `config` and build an extractor from it.
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: ExtractorConfig) -> Self {
        let sizes = SizeClassTable::new(&config.size_classes);
        Self { config, sizes }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn size_classes(&self) -> &SizeClassTable {
        &self.sizes
    }

    /// Normalize hex text and extract from it.
    pub fn extract_hex(&self, hex: &str) -> Result<Extraction, ExtractError> {
        let normalized = normalize_hex(hex)?;
        self.extract(normalized.as_bytes())
    }

    pub fn extract_notification(&self, notification: &RawNotification) -> Result<Extraction, ExtractError> {
        self.extract(&notification.data)
    }

    /// Extract every telegram in one notification buffer.
    ///
    /// The only error is a non-empty buffer shorter than the smallest
    /// marker, which the normalizer contract rules out for device data.
    pub fn extract(&self, data: &[u8]) -> Result<Extraction, ExtractError> {
        let len = data.len();
        let mut report = ExtractionReport::new(len);
        let mut telegrams = Vec::new();

        if data.is_empty() {
            report.anomalies |= Anomalies::NO_TELEGRAM;
            return Ok(Extraction { telegrams, report });
        }

        let min_marker = self.config.min_marker_len();
        if len < min_marker {
            return Err(ExtractError::ShortBuffer { len, min: min_marker });
        }

        log_frame_hex("Notification", data);

        let rule = self.sizes.lookup(len);
        match rule {
            Some(_) => report.size_class = Some(len),
            None => report.anomalies |= Anomalies::UNRECOGNIZED_SIZE,
        }

        if matches!(rule, Some(SizeRule::Strip { .. }))
            && has_dangling_start(data, &self.config.start_marker, &self.config.end_marker)
        {
            report.anomalies |= Anomalies::DANGLING_START_MARKER;
        }

        if let Some(candidate) = self.strip_wrapper(data) {
            report.strategy = Strategy::WrapperStrip;
            self.emit(data, candidate, &mut report, &mut telegrams);
        } else {
            match rule {
                Some(&SizeRule::Strip { header, trailer, expect }) => {
                    match self.strip_size_class(data, header, trailer, expect) {
                        Some(candidate) => {
                            report.strategy = Strategy::SizeClassStrip;
                            self.emit(data, candidate, &mut report, &mut telegrams);
                        }
                        None => {
                            log::debug!("Size class {len} rule did not apply, falling back");
                            self.fallback(data, &mut report, &mut telegrams);
                        }
                    }
                }
                Some(SizeRule::Scan) if contains_prefix(data, &self.config.telegram_types) => {
                    report.strategy = Strategy::MultiScan;
                    self.scan(data, &mut report, &mut telegrams);
                }
                Some(SizeRule::Scan) | None => self.fallback(data, &mut report, &mut telegrams),
            }
        }

        if telegrams.is_empty() {
            report.anomalies |= Anomalies::NO_TELEGRAM;
        }
        log::debug!(
            "{len} byte notification: {} telegram(s) via {} ({:?})",
            telegrams.len(),
            report.strategy,
            report.anomalies
        );

        Ok(Extraction { telegrams, report })
    }

    /// Strip a single `start .. end` envelope spanning the whole buffer.
    ///
    /// Declined when the interior holds another start marker or carries
    /// metadata before its telegram prefix. An inner end marker or a second
    /// prefix stays part of the payload.
    fn strip_wrapper(&self, data: &[u8]) -> Option<Candidate> {
        let start = &self.config.start_marker;
        let end = &self.config.end_marker;
        if data.len() < start.len() + end.len() || !data.starts_with(start) || !data.ends_with(end) {
            return None;
        }

        let range = start.len()..data.len() - end.len();
        let interior = &data[range.clone()];
        if interior.len() < self.config.min_telegram_len {
            return None;
        }
        if find_subslice(interior, start).is_some() {
            return None;
        }

        let types = &self.config.telegram_types;
        match next_prefix(interior, types, 0) {
            None => Some(Candidate {
                range,
                kind: None,
                flags: TelegramFlags::empty(),
            }),
            Some((0, t)) => {
                let flags = if interior.len() < t.length {
                    TelegramFlags::TRUNCATED
                } else {
                    TelegramFlags::empty()
                };
                Some(Candidate {
                    range,
                    kind: Some(t.kind),
                    flags,
                })
            }
            Some(_) => None,
        }
    }

    /// Cut a strip class's fixed header and trailer.
    ///
    /// The telegram must start exactly at the header boundary and be the
    /// first prefix in the buffer; a prefix inside the header means the
    /// notification is not laid out as the class expects.
    fn strip_size_class(&self, data: &[u8], header: usize, trailer: usize, expect: TelegramKind) -> Option<Candidate> {
        if header + trailer >= data.len() {
            return None;
        }
        let t = self.config.telegram_type(expect)?;
        let range = header..data.len() - trailer;
        if range.len() < self.config.min_telegram_len {
            return None;
        }
        match next_prefix(data, &self.config.telegram_types, 0) {
            Some((offset, found)) if offset == header && found.kind == t.kind => {}
            _ => return None,
        }

        Some(Candidate {
            range,
            kind: Some(expect),
            flags: TelegramFlags::empty(),
        })
    }

    fn scan(&self, data: &[u8], report: &mut ExtractionReport, out: &mut Vec<Telegram>) {
        let hits = scan_telegrams(
            data,
            &self.config.telegram_types,
            &self.config.start_marker,
            &self.config.end_marker,
        );
        for hit in hits {
            let flags = if hit.truncated {
                TelegramFlags::TRUNCATED
            } else {
                TelegramFlags::empty()
            };
            let candidate = Candidate {
                range: hit.range(),
                kind: Some(hit.kind),
                flags,
            };
            self.emit(data, candidate, report, out);
        }
    }

    fn fallback(&self, data: &[u8], report: &mut ExtractionReport, out: &mut Vec<Telegram>) {
        if contains_prefix(data, &self.config.telegram_types) {
            report.strategy = Strategy::FallbackScan;
            self.scan(data, report, out);
            return;
        }

        report.strategy = Strategy::GenericStrip;
        let start = &self.config.start_marker;
        let end = &self.config.end_marker;
        let mut pos = 0;
        for envelope in find_envelopes(data, start, end) {
            report.unframed += envelope.offset - pos;
            let body = envelope.offset + start.len();
            let (flags, trailer) = if envelope.complete {
                (TelegramFlags::empty(), end.len())
            } else {
                (TelegramFlags::MISSING_TRAILER, 0)
            };
            pos = body + envelope.payload.len() + trailer;
            let candidate = Candidate {
                range: body..body + envelope.payload.len(),
                kind: None,
                flags,
            };
            self.emit(data, candidate, report, out);
        }
        report.unframed += data.len() - pos;

        if report.unframed > 0 {
            log::debug!("{} byte(s) outside any envelope left unclaimed", report.unframed);
            report.anomalies |= Anomalies::UNFRAMED_BYTES;
        }
    }

    fn emit(&self, data: &[u8], candidate: Candidate, report: &mut ExtractionReport, out: &mut Vec<Telegram>) {
        let Candidate { range, kind, mut flags } = candidate;
        let bytes = &data[range.clone()];

        if bytes.len() < self.config.min_telegram_len {
            log::debug!(
                "Dropping {} byte candidate at offset {} (minimum {})",
                bytes.len(),
                range.start,
                self.config.min_telegram_len
            );
            report.anomalies |= Anomalies::SHORT_DROPPED;
            report.dropped += 1;
            return;
        }

        if let Some(address) = &self.config.device_address {
            if find_subslice(bytes, address).is_none() {
                flags |= TelegramFlags::DEVICE_MISMATCH;
                report.anomalies |= Anomalies::DEVICE_MISMATCH;
            }
        }
        if flags.contains(TelegramFlags::TRUNCATED) {
            report.anomalies |= Anomalies::TRUNCATED;
        }

        out.push(Telegram::new(bytes, kind, range.start, flags));
    }
}
