//! # Frame Reassembly
//!
//! Turns concentrator notifications into clean wM-Bus telegrams. The
//! [`Extractor`] is the entry point; the submodules hold the envelope
//! finder, the size table, the prefix scanner and the telegram type.

pub mod envelope;
pub mod extractor;
pub mod scan;
pub mod size_class;
pub mod telegram;

pub use envelope::{find_envelopes, Envelope, EnvelopeHeader, HeaderKind};
pub use extractor::{Anomalies, Extraction, ExtractionReport, Extractor, Strategy};
pub use scan::{scan_telegrams, ScanHit};
pub use size_class::SizeClassTable;
pub use telegram::{manufacturer_code, Telegram, TelegramClass, TelegramFlags, TelegramHeader};
