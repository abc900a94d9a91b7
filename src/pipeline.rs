//! # Streaming Pipeline
//!
//! Drives the extractor over a line stream (bridge output or a raw hex
//! dump) and forwards telegrams to a [`TelegramSink`]. Notifications are
//! handled strictly in arrival order and one at a time, so the telegram
//! order on the sink matches the byte order on the air.
//!
//! Log levels follow what an operator watching the stream needs: a
//! notification without telegrams is routine (debug), an unknown
//! notification size means the size table needs attention (warn).

use crate::error::ExtractError;
use crate::frame::{Extraction, Extractor, Telegram};
use crate::instrumentation::{DeviceStreams, ExtractionStats};
use crate::notification::{parse_line, RawNotification};
use crate::util::logging::LogThrottle;
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Receiver of extracted telegrams
#[async_trait]
pub trait TelegramSink: Send {
    async fn accept(&mut self, telegram: &Telegram) -> Result<(), ExtractError>;

    /// Called once after the input is exhausted
    async fn finish(&mut self) -> Result<(), ExtractError> {
        Ok(())
    }
}

/// Writes `telegram=|HEX|` lines, flushing after each one
pub struct LineSink<W> {
    writer: W,
    written: u64,
}

impl<W> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> TelegramSink for LineSink<W> {
    async fn accept(&mut self, telegram: &Telegram) -> Result<(), ExtractError> {
        let mut line = telegram.to_line();
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        self.written += 1;
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), ExtractError> {
        self.writer.flush().await?;
        Ok(())
    }
}

/// Keeps every telegram in memory
#[derive(Debug, Default)]
pub struct CollectSink {
    pub telegrams: Vec<Telegram>,
}

#[async_trait]
impl TelegramSink for CollectSink {
    async fn accept(&mut self, telegram: &Telegram) -> Result<(), ExtractError> {
        self.telegrams.push(telegram.clone());
        Ok(())
    }
}

/// Line-oriented extraction loop with running statistics
pub struct Pipeline {
    extractor: Extractor,
    stats: ExtractionStats,
    devices: DeviceStreams,
    size_warnings: LogThrottle,
}

impl Pipeline {
    pub fn new(extractor: Extractor) -> Self {
        Self {
            extractor,
            stats: ExtractionStats::default(),
            devices: DeviceStreams::default(),
            size_warnings: LogThrottle::new(10_000, 5),
        }
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    pub fn stats(&self) -> &ExtractionStats {
        &self.stats
    }

    pub fn device_stats(&self) -> &DeviceStreams {
        &self.devices
    }

    /// Extract from one text line; lines without hex content yield nothing.
    pub fn process_line(&mut self, line: &str) -> Vec<Telegram> {
        let Some(input) = parse_line(line) else {
            return Vec::new();
        };

        match RawNotification::from_hex(input.hex()) {
            Ok(notification) => self.process_notification(&notification),
            Err(e) => {
                self.reject(&e);
                Vec::new()
            }
        }
    }

    /// Count input that never reached the extractor.
    pub fn reject(&mut self, err: &ExtractError) {
        self.stats.record_rejected();
        log::warn!("Rejected notification: {err}");
    }

    /// Extract from one notification and account for the result.
    pub fn process_notification(&mut self, notification: &RawNotification) -> Vec<Telegram> {
        match self.extractor.extract_notification(notification) {
            Ok(extraction) => {
                self.observe(notification, &extraction);
                extraction.telegrams
            }
            Err(ExtractError::ShortBuffer { len, .. }) => {
                self.stats.record_status_only();
                log::debug!("No telegram in {len} byte status notification");
                Vec::new()
            }
            Err(e) => {
                self.stats.record_rejected();
                log::error!("Extraction precondition violated: {e}");
                Vec::new()
            }
        }
    }

    fn observe(&mut self, notification: &RawNotification, extraction: &Extraction) {
        self.stats.record(extraction);
        if let Some(device) = &notification.device {
            self.devices.record(device, extraction);
        }

        let report = &extraction.report;
        if report.is_unrecognized_size() && self.size_warnings.allow() {
            let suppressed = self.size_warnings.take_suppressed();
            log::warn!(
                "Unrecognized notification size: {} bytes, used {} ({} telegram(s)){}",
                report.len,
                report.strategy,
                extraction.len(),
                if suppressed > 0 {
                    format!(", {suppressed} similar warnings suppressed")
                } else {
                    String::new()
                }
            );
        }
        if report.has_dangling_start() {
            log::warn!(
                "Possible split envelope: {} byte notification ends inside an envelope",
                report.len
            );
        }

        if extraction.is_empty() {
            log::debug!("No telegram in {} byte notification", report.len);
        }
        for telegram in &extraction.telegrams {
            log::info!(
                "Extracted {} telegram: {}... ({} bytes, flags {:?})",
                telegram
                    .kind()
                    .map(|k| k.to_string())
                    .unwrap_or_else(|| "unprefixed".into()),
                &telegram.to_hex()[..telegram.len().min(8) * 2],
                telegram.len(),
                telegram.flags()
            );
            if let Some(header) = telegram.header() {
                log::debug!("Telegram header: {header}");
            }
        }
    }

    /// Consume `reader` line by line, forwarding telegrams to `sink`.
    ///
    /// Malformed lines are counted and skipped; only I/O failures end the
    /// run early.
    pub async fn run<R, S>(&mut self, reader: R, sink: &mut S) -> Result<ExtractionStats, ExtractError>
    where
        R: AsyncBufRead + Unpin,
        S: TelegramSink + ?Sized,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            for telegram in self.process_line(&line) {
                sink.accept(&telegram).await?;
            }
        }
        sink.finish().await?;

        log::info!("Summary: {}", self.stats);
        Ok(self.stats.clone())
    }
}
