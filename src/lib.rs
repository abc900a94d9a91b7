//! # vw1871-rs - Telegram Extraction for the VW1871 BLE Concentrator
//!
//! The VW1871 concentrator relays wireless M-Bus telegrams from a meter over
//! BLE notifications. Each notification wraps one or more telegrams in a
//! vendor envelope (`FBFBFBF0 .. FEFE0E0F`) with metadata bytes whose layout
//! depends on the notification size. This crate recovers the raw wM-Bus
//! telegrams so they can be handed to a standard decoder.
//!
//! ## Features
//!
//! - Deterministic extraction over a data-driven size class table
//! - Prefix scanning for packed and unknown notification sizes
//! - Per-notification diagnostics without global state
//! - Line, raw hex and JSONL capture input formats
//! - Async streaming pipeline with pluggable telegram sinks
//!
//! ## Usage
//!
//! ```rust
//! use vw1871_rs::{extract_hex, Extractor};
//!
//! let hex = "FBFBFBF0 25442D2C703749741F168D208E320502213A4A3B74FA49CEF847D54C4FB74C4175ED60D3E8D9 FEFE0E0F";
//! let telegrams = extract_hex(hex).unwrap();
//! assert_eq!(telegrams.len(), 1);
//! assert!(telegrams[0].starts_with("25442D2C"));
//!
//! let extraction = Extractor::default().extract_hex(hex).unwrap();
//! assert_eq!(extraction.telegrams[0].len(), 38);
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
pub mod instrumentation;
pub mod logging;
pub mod notification;
pub mod pipeline;
pub mod util;

pub use crate::config::{ExtractorConfig, SizeClass, SizeRule, TelegramKind, TelegramType};
pub use crate::error::ExtractError;
pub use crate::logging::{init_logger, log_info};

// Extraction core
pub use frame::{
    Anomalies, Extraction, ExtractionReport, Extractor, Strategy, Telegram, TelegramClass,
    TelegramFlags, TelegramHeader,
};

// Input handling
pub use notification::{normalize_hex, parse_line, CaptureReader, CaptureRecord, RawNotification};

// Streaming
pub use pipeline::{CollectSink, LineSink, Pipeline, TelegramSink};

// Instrumentation
pub use instrumentation::{DeviceStreams, EnvelopeSurvey, ExtractionStats};

use once_cell::sync::Lazy;

static DEFAULT_EXTRACTOR: Lazy<Extractor> = Lazy::new(Extractor::default);

/// Extract telegrams from one notification given as hex text.
///
/// Uses the default VW1871 configuration.
///
/// # Arguments
/// * `hex` - Notification bytes as hex, separators allowed
///
/// # Returns
/// * `Ok(Vec<String>)` - Telegrams as uppercase hex, in byte order
/// * `Err(ExtractError)` - Input was not valid hex or shorter than a marker
pub fn extract_hex(hex: &str) -> Result<Vec<String>, ExtractError> {
    let extraction = DEFAULT_EXTRACTOR.extract_hex(hex)?;
    Ok(extraction.hex_strings())
}
