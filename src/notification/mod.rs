//! # BLE Notifications
//!
//! A [`RawNotification`] is the unit delivered by the BLE transport: one
//! GATT notification from the concentrator, processed synchronously and then
//! dropped. This module also holds the normalizer that produces it from hex
//! text and the readers for the line and capture-log formats it arrives in.

pub mod capture;
pub mod line;
pub mod normalize;

pub use capture::{CaptureReader, CaptureRecord};
pub use line::{format_telegram_line, parse_line, LineInput};
pub use normalize::{normalize_bytes, normalize_hex, NormalizedHex};

use crate::error::ExtractError;
use crate::util::hex::encode_hex_upper;
use bytes::Bytes;
use chrono::{DateTime, Utc};

/// One notification event from the concentrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNotification {
    pub data: Bytes,
    /// When the transport delivered the notification
    pub received_at: DateTime<Utc>,
    /// Source characteristic identifier (opaque)
    pub characteristic: Option<String>,
    /// Source device, used to keep per-device streams apart
    pub device: Option<String>,
}

impl RawNotification {
    /// Notification from raw bytes, stamped with the current time
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            received_at: Utc::now(),
            characteristic: None,
            device: None,
        }
    }

    /// Normalize hex text into a notification.
    pub fn from_hex(hex: &str) -> Result<Self, ExtractError> {
        let normalized = normalize_hex(hex)?;
        Ok(Self::new(normalized.into_bytes()))
    }

    pub fn with_timestamp(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = received_at;
        self
    }

    pub fn with_characteristic(mut self, characteristic: impl Into<String>) -> Self {
        self.characteristic = Some(characteristic.into());
        self
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn to_hex(&self) -> String {
        encode_hex_upper(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        let n = RawNotification::from_hex("fb fb fb f0").unwrap();
        assert_eq!(n.len(), 4);
        assert_eq!(n.to_hex(), "FBFBFBF0");
        assert!(n.characteristic.is_none());
    }

    #[test]
    fn test_from_hex_malformed() {
        assert!(matches!(
            RawNotification::from_hex("FBF"),
            Err(ExtractError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_builders() {
        let ts = DateTime::from_timestamp(1_755_162_764, 0).unwrap();
        let n = RawNotification::new(vec![0x25u8, 0x44])
            .with_timestamp(ts)
            .with_characteristic("fff1")
            .with_device("VW1871-250111");
        assert_eq!(n.received_at, ts);
        assert_eq!(n.characteristic.as_deref(), Some("fff1"));
        assert_eq!(n.device.as_deref(), Some("VW1871-250111"));
    }
}
