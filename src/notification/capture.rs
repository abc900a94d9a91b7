//! JSON-lines capture logs.
//!
//! The BLE capture tooling writes one JSON object per notification:
//!
//! ```json
//! {"ts": "2025-08-14T09:12:44.120Z", "device": "VW1871-250111", "characteristic": "fff1", "raw_hex": "FBFBFBF0..."}
//! ```
//!
//! `ts` may also be a Unix timestamp in (fractional) seconds.

use super::RawNotification;
use crate::error::ExtractError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::Path;

/// One notification as recorded in a capture log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub raw_hex: String,
    #[serde(default)]
    pub ts: Option<serde_json::Value>,
    #[serde(default, alias = "char", alias = "uuid")]
    pub characteristic: Option<String>,
    #[serde(default, alias = "address")]
    pub device: Option<String>,
}

impl CaptureRecord {
    /// Timestamp of the record, if it carries a readable one
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self.ts.as_ref()? {
            serde_json::Value::Number(n) => {
                let secs = n.as_f64()?;
                let whole = secs.trunc() as i64;
                let nanos = ((secs - secs.trunc()) * 1e9).round() as u32;
                DateTime::from_timestamp(whole, nanos.min(999_999_999))
            }
            serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
                        .ok()
                        .map(|naive| naive.and_utc())
                }),
            _ => None,
        }
    }

    /// Normalize the record into a notification.
    pub fn to_notification(&self) -> Result<RawNotification, ExtractError> {
        let mut notification = RawNotification::from_hex(&self.raw_hex)?;
        if let Some(ts) = self.timestamp() {
            notification = notification.with_timestamp(ts);
        }
        if let Some(characteristic) = &self.characteristic {
            notification = notification.with_characteristic(characteristic.clone());
        }
        if let Some(device) = &self.device {
            notification = notification.with_device(device.clone());
        }
        Ok(notification)
    }
}

/// Iterator over the records of a capture log.
///
/// Blank lines are skipped; undecodable lines surface as
/// [`ExtractError::Capture`] so the caller can count and continue.
pub struct CaptureReader<R> {
    reader: R,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> CaptureReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }
}

impl CaptureReader<std::io::BufReader<std::fs::File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let file = std::fs::File::open(path)?;
        Ok(Self::new(std::io::BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for CaptureReader<R> {
    type Item = Result<CaptureRecord, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line_no += 1,
                Err(e) => return Some(Err(e.into())),
            }

            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }
            return Some(
                serde_json::from_str(line).map_err(|source| ExtractError::Capture {
                    line: self.line_no,
                    source,
                }),
            );
        }
    }
}
