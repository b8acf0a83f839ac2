//! reelsync CLI
//!
//! Reads a timeline document, runs the engine and prints JSON to stdout.
//! Logs go to stderr so the output stays machine-readable.

mod cli;

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use reelsync_core::core::composition::caption_pages;
use reelsync_core::core::fonts::{caption_font, DEFAULT_FONT_PATH};
use reelsync_core::core::timeline::calculate_metadata;
use reelsync_core::core::{FrameState, Ratio};
use reelsync_core::{build_schedule, CompositionPreset, EngineSettings, Timeline, TimelineDocument};

use crate::cli::{Cli, Commands, GlobalOptions};

/// `state` output: the frame plus the caption face to draw it with
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateOutput {
    #[serde(flatten)]
    state: FrameState,
    font_family: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let settings = resolve_settings(&cli.options)?;
    let timeline = read_timeline(cli.command.file()).await?;

    match &cli.command {
        Commands::Metadata { .. } => {
            let metadata = calculate_metadata(&timeline, settings.fps, &settings.duration_policy());
            print_json(&metadata, cli.options.compact)
        }
        Commands::Pages { .. } => {
            let pages = caption_pages(&timeline, &settings);
            print_json(&pages, cli.options.compact)
        }
        Commands::Schedule { .. } => {
            let schedule = build_schedule(&timeline, &settings);
            print_json(&schedule, cli.options.compact)
        }
        Commands::State { frame, .. } => {
            let schedule = build_schedule(&timeline, &settings);
            if *frame < 0 || *frame >= schedule.metadata.duration_in_frames {
                warn!(
                    "Frame {} is outside the composition (0..{})",
                    frame, schedule.metadata.duration_in_frames
                );
            }

            let font_path = cli
                .options
                .font
                .as_deref()
                .unwrap_or_else(|| Path::new(DEFAULT_FONT_PATH));
            let output = StateOutput {
                state: schedule.frame_state(*frame),
                font_family: caption_font(font_path).font_stack(),
            };
            print_json(&output, cli.options.compact)
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file, then preset, then individual flags
fn resolve_settings(options: &GlobalOptions) -> Result<EngineSettings> {
    let mut settings = match &options.config {
        Some(path) => EngineSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => EngineSettings::default(),
    };

    if let Some(preset) = options.preset {
        let preset = CompositionPreset::from(preset);
        settings.fps = preset.fps();
        settings.show_captions = preset.shows_captions();
    }
    if let Some(fps) = options.fps {
        settings.fps = Ratio::fps(fps);
    }
    if let Some(gap_ms) = options.gap_ms {
        settings.gap_threshold_ms = gap_ms;
    }

    if let Err(e) = settings.validate() {
        bail!("Invalid settings: {}", e);
    }
    settings.normalize();

    debug!("Resolved settings: {:?}", settings);
    Ok(settings)
}

async fn read_timeline(path: &Path) -> Result<Timeline> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read timeline {}", path.display()))?;
    let timeline = TimelineDocument::from_json(&content)
        .with_context(|| format!("Failed to parse timeline {}", path.display()))?;

    if let Err(e) = timeline.validate() {
        warn!("Timeline has invalid entries: {}", e);
    }
    Ok(timeline)
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
