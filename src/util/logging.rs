//! # Logging Utilities
//!
//! Rate limiting and bounded hex dumps for notification processing. A
//! concentrator relays every telegram it hears, so a single misconfigured
//! size table can produce a warning per notification; [`LogThrottle`] keeps
//! that readable.
//!
//! ## Usage
//!
//! ```rust
//! use vw1871_rs::util::logging::{log_frame_hex, LogThrottle};
//!
//! let mut throttle = LogThrottle::new(1000, 5); // 5 messages per second
//! if throttle.allow() {
//!     log::warn!("Unrecognized notification size");
//! }
//!
//! log_frame_hex("Notification", &[0xFB, 0xFB, 0xFB, 0xF0]);
//! ```

use std::time::Instant;

/// Bytes shown by [`log_frame_hex`] before the dump is cut
const MAX_LOG_BYTES: usize = 64;

/// Fixed-window rate limiter for log messages
#[derive(Debug)]
pub struct LogThrottle {
    /// Time window for throttling (in milliseconds)
    window_ms: u64,
    /// Maximum messages allowed per window
    cap: u32,
    /// Messages allowed in the current window
    count: u32,
    /// Messages refused since the last report
    suppressed: u64,
    /// Start time of current window
    t0: Instant,
}

impl LogThrottle {
    /// Create new throttle with time window and message cap
    pub fn new(window_ms: u64, cap: u32) -> Self {
        Self {
            window_ms,
            cap,
            count: 0,
            suppressed: 0,
            t0: Instant::now(),
        }
    }

    /// Check if logging is allowed (resets counter after window expires)
    pub fn allow(&mut self) -> bool {
        let elapsed_ms = self.t0.elapsed().as_millis() as u64;
        if elapsed_ms > self.window_ms {
            self.t0 = Instant::now();
            self.count = 0;
        }

        if self.count < self.cap {
            self.count += 1;
            true
        } else {
            self.suppressed += 1;
            false
        }
    }

    /// Number of refused messages since the last call, resetting the tally
    pub fn take_suppressed(&mut self) -> u64 {
        std::mem::take(&mut self.suppressed)
    }

    /// Start a new window immediately
    pub fn reset(&mut self) {
        self.t0 = Instant::now();
        self.count = 0;
    }
}

/// Log frame data in hex format for debugging
///
/// Output is cut after 64 bytes so packed notifications stay on one line.
pub fn log_frame_hex(prefix: &str, data: &[u8]) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }

    let shown = &data[..data.len().min(MAX_LOG_BYTES)];
    let hex_str = crate::util::hex::format_hex_compact(shown);
    if data.len() > MAX_LOG_BYTES {
        log::debug!("{prefix}: {hex_str} ... ({} bytes total)", data.len());
    } else {
        log::debug!("{prefix}: {hex_str}");
    }
}
