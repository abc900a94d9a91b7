//! Tests for the logging helpers in the `vw1871-rs` crate.

use vw1871_rs::logging::{init_logger, log_info};
use vw1871_rs::util::logging::{log_frame_hex, LogThrottle};
use vw1871_rs::{Extractor, Pipeline};

/// Logging helpers must not panic, with or without an initialized logger.
#[test]
fn test_logging() {
    log_info("Capture summary: 0 notifications");
    log_frame_hex("Notification", &[0u8; 200]);
}

/// Initializing twice is harmless.
#[test]
fn test_init_logger() {
    init_logger();
    init_logger();
}

#[test]
fn test_throttle_caps_window() {
    let mut throttle = LogThrottle::new(60_000, 3);
    let allowed = (0..10).filter(|_| throttle.allow()).count();
    assert_eq!(allowed, 3);
    assert_eq!(throttle.take_suppressed(), 7);
    assert_eq!(throttle.take_suppressed(), 0);
}

/// Unknown sizes are warned about through the throttle but always counted.
#[test]
fn test_unrecognized_sizes_counted_past_throttle() {
    init_logger();
    let mut pipeline = Pipeline::new(Extractor::default());
    for _ in 0..50 {
        pipeline.process_line("00112233445566778899");
    }
    assert_eq!(pipeline.stats().unrecognized_sizes, 50);
    assert_eq!(pipeline.stats().empty_notifications, 50);
}
