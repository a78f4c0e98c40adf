//! Headless showcase host.
//!
//! Reads one input per stdin line and writes every notification and status
//! change to stdout as newline-delimited JSON. A line is either a JSON UI
//! command (`{"command":"start"}`) or an utterance, optionally followed by
//! `|confidence` (`next app|0.92`). Utterances without a confidence are
//! treated as certain.
//!
//! Usage: `showcase-host <catalog.toml> [config.toml]`
//!
//! All tracing output goes to stderr so stdout stays a clean JSON channel.

use anyhow::Context;
use cosmic_autopilot::catalog::{Catalog, load_sources_from_file};
use cosmic_autopilot::config::ShowcaseConfig;
use cosmic_autopilot::ports::{RecordingPage, RecordingRenderer, RecordingSpeech, RecordingViewport};
use cosmic_autopilot::runtime::{RuntimeHandle, ShowcaseRuntime};
use cosmic_autopilot::shortcuts::UiCommand;
use cosmic_autopilot::showcase::{Showcase, ShowcaseInput, ShowcasePorts};
use cosmic_autopilot::status::ChannelNotifier;
use cosmic_autopilot::store::JsonFileStore;
use cosmic_autopilot::timer::TokioTimers;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::broadcast::error::RecvError;

const INPUT_CAPACITY: usize = 64;
const EVENT_CAPACITY: usize = 256;
const PAGE_HEIGHT_PX: f64 = 6_000.0;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let catalog_path = args
        .next()
        .map(PathBuf::from)
        .context("usage: showcase-host <catalog.toml> [config.toml]")?;
    let config = match args.next().map(PathBuf::from) {
        Some(path) => ShowcaseConfig::from_file(&path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => {
            let path = ShowcaseConfig::default_config_path();
            if path.exists() {
                ShowcaseConfig::from_file(&path)
                    .with_context(|| format!("failed to load config {}", path.display()))?
            } else {
                ShowcaseConfig::default()
            }
        }
    };

    let sources = load_sources_from_file(&catalog_path)
        .with_context(|| format!("failed to load catalog {}", catalog_path.display()))?;
    tracing::info!(entries = sources.len(), "catalog loaded");

    let (timers, timer_rx) = TokioTimers::new();
    let notifier = Arc::new(ChannelNotifier::new(EVENT_CAPACITY));
    let mut events = notifier.subscribe();
    let viewport = RecordingViewport::new(PAGE_HEIGHT_PX)
        .with_section("home", 0.0)
        .with_section("about", 900.0)
        .with_section("projects", 1_800.0)
        .with_section("blog", 4_200.0)
        .with_section("community", 5_400.0);
    let ports = ShowcasePorts {
        timers: Arc::new(timers),
        viewport: Arc::new(viewport),
        page: Arc::new(RecordingPage::new(true)),
        speech: Arc::new(RecordingSpeech::new(true)),
        renderer: Arc::new(RecordingRenderer::new()),
        notifier,
        store: Arc::new(JsonFileStore::open(JsonFileStore::default_path())),
    };

    let showcase = Showcase::new(config, Catalog::load(sources), ports);
    let (runtime, handle) = ShowcaseRuntime::new(showcase, timer_rx, INPUT_CAPACITY);
    let runtime_task = tokio::spawn(runtime.run());

    let forwarder = tokio::spawn(async move {
        let mut writer = BufWriter::new(tokio::io::stdout());
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        if let Err(e) = write_line(&mut writer, &json).await {
                            tracing::warn!(error = %e, "stdout closed; stopping event forwarder");
                            break;
                        }
                    }
                    Err(e) => tracing::error!(error = %e, "failed to serialize event; skipping"),
                },
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "event forwarder lagged; some events were dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let read_result = read_inputs(&handle).await;
    handle.shutdown();
    drop(handle);
    // Dropping the showcase closes the event channel, which lets the
    // forwarder drain and exit.
    let _ = runtime_task.await;
    let _ = forwarder.await;

    read_result?;
    tracing::info!("showcase-host shut down cleanly");
    Ok(())
}

async fn read_inputs(handle: &RuntimeHandle) -> anyhow::Result<()> {
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut line = String::new();
    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .await
            .context("failed to read from stdin")?;
        if read == 0 {
            tracing::info!("stdin closed (EOF); shutting down");
            return Ok(());
        }
        let Some(input) = parse_line(&line) else {
            continue;
        };
        handle.send(input).await?;
    }
}

/// Turn one stdin line into a showcase input.
fn parse_line(line: &str) -> Option<ShowcaseInput> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('{') {
        return match serde_json::from_str::<UiCommand>(trimmed) {
            Ok(command) => Some(ShowcaseInput::Ui(command)),
            Err(e) => {
                tracing::warn!(error = %e, raw_line = %trimmed, "failed to parse UI command");
                None
            }
        };
    }
    let (text, confidence) = match trimmed.rsplit_once('|') {
        Some((text, score)) => match score.trim().parse::<f32>() {
            Ok(confidence) => (text.trim(), confidence),
            Err(_) => (trimmed, 1.0),
        },
        None => (trimmed, 1.0),
    };
    Some(ShowcaseInput::Utterance {
        text: text.to_owned(),
        confidence,
    })
}

async fn write_line(writer: &mut BufWriter<tokio::io::Stdout>, json: &str) -> std::io::Result<()> {
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
