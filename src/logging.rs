use log::{info, log_enabled, Level};

/// Initializes the logger with the `env_logger` crate.
///
/// The level comes from `RUST_LOG` and defaults to `info`, which shows one
/// line per extracted telegram. Logs go to stderr so stdout stays a clean
/// `telegram=|HEX|` stream. Calling this twice is harmless.
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}
