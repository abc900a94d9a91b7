//! Extraction instrumentation.
//!
//! Counters and surveys that observe the extractor from the outside. They
//! are owned by whoever drives extraction, never shared globally.

pub mod stats;
pub mod survey;

pub use stats::{DeviceStreams, ExtractionStats};
pub use survey::EnvelopeSurvey;
