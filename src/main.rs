use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::BufReader;
use vw1871_rs::frame::find_envelopes;
use vw1871_rs::util::hex::{decode_hex, format_hex_compact};
use vw1871_rs::{
    init_logger, log_info, CaptureReader, EnvelopeSurvey, Extractor, ExtractorConfig, LineSink,
    Pipeline, TelegramHeader,
};

#[derive(Parser)]
#[command(name = "vw1871")]
#[command(about = "Extract wM-Bus telegrams from VW1871 concentrator notifications")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read lines from stdin, write `telegram=|HEX|` lines to stdout
    Extract {
        #[command(flatten)]
        overrides: ConfigArgs,
        /// Print a JSON statistics summary to stderr at end of input
        #[arg(long)]
        summary: bool,
    },
    /// Show envelopes, size class and telegrams of one notification
    Inspect {
        hex: String,
        #[command(flatten)]
        overrides: ConfigArgs,
    },
    /// Replay a JSONL capture log and report statistics
    Capture {
        file: PathBuf,
        #[command(flatten)]
        overrides: ConfigArgs,
    },
    /// Print the effective configuration as JSON
    Config {
        #[command(flatten)]
        overrides: ConfigArgs,
    },
}

#[derive(clap::Args)]
struct ConfigArgs {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Minimum telegram length in bytes
    #[arg(long)]
    min_len: Option<usize>,
    /// Device address to cross-check, as hex; "none" disables the check
    #[arg(long)]
    device_address: Option<String>,
}

impl ConfigArgs {
    fn load(&self) -> anyhow::Result<ExtractorConfig> {
        let mut config = match &self.config {
            Some(path) => ExtractorConfig::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ExtractorConfig::default(),
        };
        if let Some(min_len) = self.min_len {
            config.min_telegram_len = min_len;
        }
        if let Some(address) = &self.device_address {
            config.device_address = if address.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(decode_hex(address).context("invalid --device-address")?)
            };
        }
        config.validate()?;
        Ok(config)
    }

    fn extractor(&self) -> anyhow::Result<Extractor> {
        Ok(Extractor::new(self.load()?)?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract { overrides, summary } => {
            let mut pipeline = Pipeline::new(overrides.extractor()?);
            let mut sink = LineSink::new(tokio::io::stdout());
            let stats = pipeline
                .run(BufReader::new(tokio::io::stdin()), &mut sink)
                .await?;
            if summary {
                eprintln!("{}", stats.to_json()?);
            }
        }
        Commands::Inspect { hex, overrides } => {
            let extractor = overrides.extractor()?;
            let extraction = extractor.extract_hex(&hex)?;
            let report = &extraction.report;
            let config = extractor.config();
            let data = decode_hex(&hex)?;

            println!("length:     {} bytes", report.len);
            match report.size_class {
                Some(size) => println!("size class: {size}"),
                None => println!("size class: unrecognized"),
            }
            println!("strategy:   {}", report.strategy);
            println!("anomalies:  {:?}", report.anomalies);

            for envelope in find_envelopes(&data, &config.start_marker, &config.end_marker) {
                println!(
                    "envelope @{:<3} {:>3} bytes {} header {}",
                    envelope.offset,
                    envelope.payload.len(),
                    if envelope.complete { "complete  " } else { "incomplete" },
                    envelope.header().describe()
                );
            }
            for telegram in &extraction.telegrams {
                println!(
                    "telegram @{:<3} {:>3} bytes {:?} {}",
                    telegram.offset(),
                    telegram.len(),
                    telegram.class(),
                    format_hex_compact(telegram.as_bytes())
                );
                if let Some(header) = TelegramHeader::peek(telegram.as_bytes()) {
                    println!("  {header}");
                }
            }
        }
        Commands::Capture { file, overrides } => {
            let mut pipeline = Pipeline::new(overrides.extractor()?);
            let start = pipeline.extractor().config().start_marker.clone();
            let end = pipeline.extractor().config().end_marker.clone();
            let mut survey = EnvelopeSurvey::new();

            let reader = CaptureReader::open(&file)
                .with_context(|| format!("opening {}", file.display()))?;
            for record in reader {
                let notification = match record.and_then(|r| r.to_notification()) {
                    Ok(notification) => notification,
                    Err(e) if e.is_input_error() => {
                        pipeline.reject(&e);
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };
                survey.add_notification(&notification.data, &start, &end);
                for telegram in pipeline.process_notification(&notification) {
                    println!("{}", telegram.to_line());
                }
            }

            log_info(&format!("Capture summary: {}", pipeline.stats()));
            for (device, stats) in pipeline.device_stats().iter() {
                log_info(&format!("  {device}: {stats}"));
            }
            let summary = serde_json::json!({
                "stats": pipeline.stats(),
                "envelopes": survey,
            });
            eprintln!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Config { overrides } => {
            println!("{}", overrides.load()?.to_json_pretty()?);
        }
    }

    Ok(())
}
