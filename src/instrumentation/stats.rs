//! # Extraction Statistics
//!
//! Counters describing what the extractor saw and produced. They are plain
//! values owned by the caller and fed from each [`Extraction`]; nothing here
//! influences extraction results.
//!
//! ## Usage
//!
//! ```rust
//! use vw1871_rs::frame::Extractor;
//! use vw1871_rs::instrumentation::ExtractionStats;
//!
//! let extractor = Extractor::default();
//! let mut stats = ExtractionStats::default();
//!
//! let extraction = extractor.extract_hex("FEFE0E0F").unwrap();
//! stats.record(&extraction);
//! assert_eq!(stats.notifications, 1);
//! assert_eq!(stats.empty_notifications, 1);
//! ```

use crate::frame::{Anomalies, Extraction, TelegramClass, TelegramFlags};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Totals over a stream of notifications
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Notifications handed to the extractor
    pub notifications: u64,
    /// Telegrams emitted
    pub telegrams: u64,
    pub compact: u64,
    pub full: u64,
    pub truncated: u64,
    /// Telegrams without a known prefix
    pub unrecognized: u64,
    /// Notifications whose size matched no class
    pub unrecognized_sizes: u64,
    /// Notifications that yielded nothing
    pub empty_notifications: u64,
    pub dangling_start_markers: u64,
    /// Telegrams flagged by the advisory address check
    pub device_mismatches: u64,
    /// Candidates dropped below the minimum length
    pub dropped_short: u64,
    /// Notifications shorter than a marker, such as status bytes
    #[serde(default)]
    pub status_only: u64,
    /// Lines or buffers rejected before extraction
    pub rejected_inputs: u64,
    /// Notifications seen per exact size
    pub sizes: BTreeMap<usize, u64>,
}

impl ExtractionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one extraction result
    pub fn record(&mut self, extraction: &Extraction) {
        let report = &extraction.report;
        self.notifications += 1;
        *self.sizes.entry(report.len).or_insert(0) += 1;

        if report.anomalies.contains(Anomalies::UNRECOGNIZED_SIZE) {
            self.unrecognized_sizes += 1;
        }
        if report.anomalies.contains(Anomalies::DANGLING_START_MARKER) {
            self.dangling_start_markers += 1;
        }
        if extraction.is_empty() {
            self.empty_notifications += 1;
        }
        self.dropped_short += report.dropped as u64;

        for telegram in &extraction.telegrams {
            self.telegrams += 1;
            match telegram.class() {
                TelegramClass::Compact => self.compact += 1,
                TelegramClass::Full => self.full += 1,
                TelegramClass::Truncated => self.truncated += 1,
                TelegramClass::Unrecognized => self.unrecognized += 1,
            }
            if telegram.flags().contains(TelegramFlags::DEVICE_MISMATCH) {
                self.device_mismatches += 1;
            }
        }
    }

    /// Account for a notification too short to hold a marker
    pub fn record_status_only(&mut self) {
        self.notifications += 1;
        self.empty_notifications += 1;
        self.status_only += 1;
    }

    /// Account for input rejected by the normalizer
    pub fn record_rejected(&mut self) {
        self.rejected_inputs += 1;
    }

    /// Count by telegram class
    pub fn count(&self, class: TelegramClass) -> u64 {
        match class {
            TelegramClass::Compact => self.compact,
            TelegramClass::Full => self.full,
            TelegramClass::Truncated => self.truncated,
            TelegramClass::Unrecognized => self.unrecognized,
        }
    }

    /// Fold another set of counters into this one
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.notifications += other.notifications;
        self.telegrams += other.telegrams;
        self.compact += other.compact;
        self.full += other.full;
        self.truncated += other.truncated;
        self.unrecognized += other.unrecognized;
        self.unrecognized_sizes += other.unrecognized_sizes;
        self.empty_notifications += other.empty_notifications;
        self.dangling_start_markers += other.dangling_start_markers;
        self.device_mismatches += other.device_mismatches;
        self.dropped_short += other.dropped_short;
        self.status_only += other.status_only;
        self.rejected_inputs += other.rejected_inputs;
        for (size, count) in &other.sizes {
            *self.sizes.entry(*size).or_insert(0) += count;
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ExtractionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} notifications -> {} telegrams (compact={}, full={}, truncated={}, unrecognized={}); \
             empty={}, unknown sizes={}, rejected={}",
            self.notifications,
            self.telegrams,
            self.compact,
            self.full,
            self.truncated,
            self.unrecognized,
            self.empty_notifications,
            self.unrecognized_sizes,
            self.rejected_inputs
        )
    }
}

/// Independent counters per source device
#[derive(Debug, Clone, Default)]
pub struct DeviceStreams {
    streams: BTreeMap<String, ExtractionStats>,
}

impl DeviceStreams {
    pub fn record(&mut self, device: &str, extraction: &Extraction) {
        self.streams.entry(device.to_string()).or_default().record(extraction);
    }

    pub fn get(&self, device: &str) -> Option<&ExtractionStats> {
        self.streams.get(device)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ExtractionStats)> {
        self.streams.iter()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Sum over every device
    pub fn total(&self) -> ExtractionStats {
        let mut total = ExtractionStats::default();
        for stats in self.streams.values() {
            total.merge(stats);
        }
        total
    }
}
