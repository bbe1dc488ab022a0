use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_probe::{
    config::{Config, duration_serde::parse_duration},
    models::{ChannelRecord, PlayRequest},
    services::{
        AvailabilityProber, ChannelFilter, ChannelLoader, HttpReachabilityChecker, ProbeEvent,
        ProgressReporter, playback::sink_for,
    },
    sources::HttpPlaylistFetcher,
    utils::UrlUtils,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "m3u-probe")]
#[command(version)]
#[command(about = "Parse M3U playlists and probe which channels are reachable")]
#[command(long_about = None)]
struct Cli {
    /// Playlist URL (or local playlist path) to load
    url: Option<String>,

    /// Configuration file path (defaults to $M3U_PROBE_CONFIG or m3u-probe.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<String>,

    /// Local playlist file(s), loaded in order
    #[arg(short, long = "file", value_name = "PATH", num_args = 1..)]
    files: Vec<String>,

    /// Load a configured category
    #[arg(short = 'C', long, value_name = "NAME")]
    category: Option<String>,

    /// Per-probe timeout (e.g. "5s", "500ms")
    #[arg(short, long, value_name = "DURATION", value_parser = parse_duration)]
    timeout: Option<Duration>,

    /// Concurrent probe cap (0 = unbounded)
    #[arg(short = 'j', long, value_name = "N")]
    concurrency: Option<usize>,

    /// Filter the printed channels
    #[arg(short, long, value_name = "TERM")]
    search: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Hand the Nth printed channel (1-based) to the player
    #[arg(short, long, value_name = "INDEX")]
    play: Option<usize>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("m3u_probe={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting m3u-probe v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };

    // Override config with CLI arguments
    if let Some(timeout) = cli.timeout {
        config.probe.timeout = timeout;
    }
    if let Some(concurrency) = cli.concurrency {
        config.probe.max_concurrent = concurrency;
    }
    config.validate()?;

    if cli.url.is_none() && cli.category.is_none() && cli.files.is_empty() {
        bail!("Nothing to load: pass a playlist URL, --category or --file");
    }

    let checker = HttpReachabilityChecker::new(&config.probe)?;
    let prober = Arc::new(AvailabilityProber::new(
        Arc::new(checker),
        config.probe.clone(),
    ));
    let fetcher = HttpPlaylistFetcher::new(&config.playlist)?;
    let loader = ChannelLoader::new(Arc::new(fetcher), Arc::clone(&prober));

    let event_logger = tokio::spawn(log_events(loader.reporter().clone()));

    if let Some(name) = &cli.category {
        let summary = loader.load_category(&config, name).await?;
        debug!("Run summary: {:?}", summary);
    } else if let Some(url) = cli.url.as_deref().filter(|url| UrlUtils::is_http(url)) {
        let summary = loader.load_url(url).await;
        debug!("Run summary: {:?}", summary);
    } else if let Some(path) = &cli.url {
        // Anything that isn't an http(s) URL is read as a local playlist
        let summary = loader.load_file(path).await?;
        debug!("Run summary: {:?}", summary);
    } else {
        let summaries = loader.load_files(&cli.files).await;
        if summaries.is_empty() {
            warn!("None of the {} playlist files could be read", cli.files.len());
        }
    }

    event_logger.abort();

    let snapshot = loader.registry().snapshot().await;
    let channels = ChannelFilter::new(cli.search.as_deref().unwrap_or_default()).apply(&snapshot);

    match cli.output {
        OutputFormat::Text => print_text(&channels),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&channels)?),
    }

    if let Some(index) = cli.play {
        let Some(channel) = index.checked_sub(1).and_then(|i| channels.get(i)) else {
            bail!(
                "Play index {} out of range (1..={} channels listed)",
                index,
                channels.len()
            );
        };
        let sink = sink_for(&config.playback);
        sink.play(&PlayRequest::for_channel(channel)).await?;
    }

    Ok(())
}

async fn log_events(reporter: ProgressReporter) {
    let mut events = reporter.subscribe();
    loop {
        match events.recv().await {
            Ok(ProbeEvent::Started { generation, total }) => {
                info!("Run {} started with {} channels", generation, total);
            }
            Ok(ProbeEvent::Progress { progress, .. }) => {
                debug!(
                    "Probed {}/{} ({}%), {} available",
                    progress.processed, progress.total, progress.percent, progress.available
                );
            }
            Ok(ProbeEvent::Snapshot { progress, channels, .. }) => {
                info!(
                    "{} channels available so far ({}%)",
                    channels.len(),
                    progress.percent
                );
            }
            Ok(ProbeEvent::Completed { progress, .. }) => {
                info!(
                    "Probing complete: {} of {} channels available",
                    progress.available, progress.total
                );
            }
            Err(RecvError::Lagged(skipped)) => {
                debug!("Event logger lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn print_text(channels: &[ChannelRecord]) {
    for (i, channel) in channels.iter().enumerate() {
        let group = if channel.is_grouped() {
            format!(" [{}]", channel.group)
        } else {
            String::new()
        };
        println!(
            "{:>4}. {}{} {}",
            i + 1,
            channel.name,
            group,
            UrlUtils::obfuscate_credentials(&channel.stream_url)
        );
    }
}
