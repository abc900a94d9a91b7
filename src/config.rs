//! # Extractor Configuration
//!
//! Everything the extractor knows about the concentrator is data: envelope
//! markers, telegram-type prefixes with their fixed lengths, the table of
//! notification size classes and the minimum telegram length. Firmware
//! updates that introduce a new notification size only need a new table
//! entry, which is checked for consistency before use.
//!
//! ## JSON layout
//!
//! ```json
//! {
//!   "start_marker": "FBFBFBF0",
//!   "end_marker": "FEFE0E0F",
//!   "telegram_types": [
//!     { "kind": "compact", "prefix": "25442D2C", "length": 38 },
//!     { "kind": "full", "prefix": "30442D2C", "length": 49 }
//!   ],
//!   "size_classes": [
//!     { "size": 59, "rule": "strip", "header": 15, "trailer": 6, "expect": "compact" },
//!     { "size": 244, "rule": "scan" }
//!   ],
//!   "min_telegram_len": 10,
//!   "device_address": "703749741F16"
//! }
//! ```
//!
//! Omitted fields keep their VW1871 defaults.

use crate::constants::*;
use crate::error::ExtractError;
use crate::util::hex::{serde_hex, serde_hex_opt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Fixed-size telegram variants emitted by the meter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelegramKind {
    /// Short frame carrying the current reading only
    Compact,
    /// Long frame with the full data record set
    Full,
}

impl fmt::Display for TelegramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelegramKind::Compact => write!(f, "compact"),
            TelegramKind::Full => write!(f, "full"),
        }
    }
}

/// A telegram type recognized by its leading bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramType {
    pub kind: TelegramKind,
    #[serde(with = "serde_hex")]
    pub prefix: Vec<u8>,
    /// Total telegram length in bytes, prefix included
    pub length: usize,
}

impl TelegramType {
    pub fn new(kind: TelegramKind, prefix: &[u8], length: usize) -> Self {
        Self {
            kind,
            prefix: prefix.to_vec(),
            length,
        }
    }
}

/// Extraction rule selected by an exact notification size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "lowercase")]
pub enum SizeRule {
    /// Exactly one envelope; cut `header` bytes from the front and
    /// `trailer` bytes from the back.
    Strip {
        header: usize,
        trailer: usize,
        expect: TelegramKind,
    },
    /// Several envelopes packed together; scan for telegram prefixes.
    Scan,
}

/// One row of the notification size table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeClass {
    /// Notification length in bytes
    pub size: usize,
    #[serde(flatten)]
    pub rule: SizeRule,
}

impl SizeClass {
    pub fn strip(size: usize, header: usize, trailer: usize, expect: TelegramKind) -> Self {
        Self {
            size,
            rule: SizeRule::Strip {
                header,
                trailer,
                expect,
            },
        }
    }

    pub fn scan(size: usize) -> Self {
        Self {
            size,
            rule: SizeRule::Scan,
        }
    }
}

/// Immutable configuration consumed by the [`Extractor`](crate::frame::Extractor)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    #[serde(with = "serde_hex")]
    pub start_marker: Vec<u8>,
    #[serde(with = "serde_hex")]
    pub end_marker: Vec<u8>,
    pub telegram_types: Vec<TelegramType>,
    pub size_classes: Vec<SizeClass>,
    /// Minimum telegram length in bytes
    pub min_telegram_len: usize,
    /// Advisory A-field cross-check; mismatches are flagged, not dropped
    #[serde(with = "serde_hex_opt")]
    pub device_address: Option<Vec<u8>>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            start_marker: VW1871_START_MARKER.to_vec(),
            end_marker: VW1871_END_MARKER.to_vec(),
            telegram_types: vec![
                TelegramType::new(TelegramKind::Compact, &COMPACT_TELEGRAM_PREFIX, COMPACT_TELEGRAM_LEN),
                TelegramType::new(TelegramKind::Full, &FULL_TELEGRAM_PREFIX, FULL_TELEGRAM_LEN),
            ],
            size_classes: vec![
                SizeClass::strip(
                    NOTIFICATION_SIZE_COMPACT,
                    SINGLE_HEADER_LEN,
                    SINGLE_TRAILER_LEN,
                    TelegramKind::Compact,
                ),
                SizeClass::strip(
                    NOTIFICATION_SIZE_FULL,
                    SINGLE_HEADER_LEN,
                    SINGLE_TRAILER_LEN,
                    TelegramKind::Full,
                ),
                SizeClass::strip(
                    NOTIFICATION_SIZE_INTERMEDIATE,
                    INTERMEDIATE_HEADER_LEN,
                    INTERMEDIATE_TRAILER_LEN,
                    TelegramKind::Compact,
                ),
                SizeClass::scan(NOTIFICATION_SIZE_PACKED),
            ],
            min_telegram_len: MIN_TELEGRAM_LEN,
            device_address: Some(FLOWIQ2101_DEVICE_ADDRESS.to_vec()),
        }
    }
}

impl ExtractorConfig {
    /// Parse a JSON configuration; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ExtractError> {
        let config: ExtractorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded extractor config from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String, ExtractError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up the telegram type for a kind
    pub fn telegram_type(&self, kind: TelegramKind) -> Option<&TelegramType> {
        self.telegram_types.iter().find(|t| t.kind == kind)
    }

    /// Length of the shortest envelope marker
    pub fn min_marker_len(&self) -> usize {
        self.start_marker.len().min(self.end_marker.len())
    }

    /// Check the tables for internal consistency.
    ///
    /// Every strip class must account for its full size as
    /// `header + telegram length + trailer`, and every scan class must be
    /// able to hold at least one telegram.
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.start_marker.is_empty() || self.end_marker.is_empty() {
            return Err(ExtractError::Config("envelope markers must not be empty".into()));
        }
        if self.start_marker == self.end_marker {
            return Err(ExtractError::Config("start and end markers must differ".into()));
        }
        if self.min_telegram_len == 0 {
            return Err(ExtractError::Config("min_telegram_len must be positive".into()));
        }
        if self.telegram_types.is_empty() {
            return Err(ExtractError::Config("at least one telegram type is required".into()));
        }

        let mut kinds = HashSet::new();
        for t in &self.telegram_types {
            if t.prefix.is_empty() {
                return Err(ExtractError::Config(format!("{} prefix is empty", t.kind)));
            }
            if t.length < t.prefix.len() {
                return Err(ExtractError::Config(format!(
                    "{} length {} is shorter than its prefix",
                    t.kind, t.length
                )));
            }
            if !kinds.insert(t.kind) {
                return Err(ExtractError::Config(format!("{} is declared twice", t.kind)));
            }
        }
        let shortest = self.telegram_types.iter().map(|t| t.length).min().unwrap_or(0);

        let mut sizes = HashSet::new();
        for class in &self.size_classes {
            if !sizes.insert(class.size) {
                return Err(ExtractError::Config(format!(
                    "size class {} is declared twice",
                    class.size
                )));
            }
            match &class.rule {
                SizeRule::Strip {
                    header,
                    trailer,
                    expect,
                } => {
                    let t = self.telegram_type(*expect).ok_or_else(|| {
                        ExtractError::Config(format!(
                            "size class {} expects unknown telegram type {expect}",
                            class.size
                        ))
                    })?;
                    if header + t.length + trailer != class.size {
                        return Err(ExtractError::Config(format!(
                            "size class {}: header {header} + {expect} {} + trailer {trailer} != {}",
                            class.size, t.length, class.size
                        )));
                    }
                }
                SizeRule::Scan => {
                    if class.size < shortest {
                        return Err(ExtractError::Config(format!(
                            "scan class {} cannot hold a {shortest} byte telegram",
                            class.size
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_consistent() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_marker_len(), 4);
        assert_eq!(config.telegram_type(TelegramKind::Full).map(|t| t.length), Some(49));
    }

    #[test]
    fn test_strip_class_width_mismatch() {
        let mut config = ExtractorConfig::default();
        config.size_classes.push(SizeClass::strip(60, 15, 6, TelegramKind::Compact));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ExtractError::Config(msg) if msg.contains("size class 60")));
    }

    #[test]
    fn test_duplicate_size_class() {
        let mut config = ExtractorConfig::default();
        config.size_classes.push(SizeClass::scan(244));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scan_class_too_small() {
        let mut config = ExtractorConfig::default();
        config.size_classes.push(SizeClass::scan(20));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let mut config = ExtractorConfig::default();
        config.telegram_types[0].prefix.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_tables() {
        let config = ExtractorConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert!(json.contains("\"FBFBFBF0\""));
        assert!(json.contains("\"rule\": \"strip\""));
        let parsed = ExtractorConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            ExtractorConfig::from_json_str(r#"{ "min_telegram_len": 20, "device_address": null }"#).unwrap();
        assert_eq!(config.min_telegram_len, 20);
        assert_eq!(config.device_address, None);
        assert_eq!(config.start_marker, VW1871_START_MARKER.to_vec());
    }

    #[test]
    fn test_bad_hex_in_json() {
        let err = ExtractorConfig::from_json_str(r#"{ "start_marker": "FBXX" }"#).unwrap_err();
        assert!(matches!(err, ExtractError::Json(_)));
    }
}
