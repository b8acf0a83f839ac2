use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use reelsync_core::CompositionPreset;

/// Caption segmentation and frame scheduling for timeline JSON
#[derive(Parser, Debug)]
#[command(name = "reelsync", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// Output format; overrides the frame rate and caption toggle from --config
    #[arg(long, global = true, value_enum)]
    pub preset: Option<PresetArg>,

    /// Output frame rate (integer frames per second)
    #[arg(long, global = true)]
    pub fps: Option<i32>,

    /// Silence in milliseconds that starts a new caption page
    #[arg(long = "gap-ms", global = true)]
    pub gap_ms: Option<f64>,

    /// Engine settings JSON file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Caption font file to probe for `state`
    #[arg(long, global = true)]
    pub font: Option<PathBuf>,

    /// Print single-line JSON
    #[arg(long, global = true)]
    pub compact: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print { fps, durationInFrames } for a timeline
    Metadata {
        /// Timeline or manifest JSON
        file: PathBuf,
    },
    /// Print the caption pages of a timeline
    Pages {
        /// Timeline or manifest JSON
        file: PathBuf,
    },
    /// Print the full frame schedule of a timeline
    Schedule {
        /// Timeline or manifest JSON
        file: PathBuf,
    },
    /// Print what is active at one frame
    State {
        /// Timeline or manifest JSON
        file: PathBuf,
        /// Composition frame index
        #[arg(long)]
        frame: i64,
    },
}

impl Commands {
    pub fn file(&self) -> &PathBuf {
        match self {
            Commands::Metadata { file }
            | Commands::Pages { file }
            | Commands::Schedule { file }
            | Commands::State { file, .. } => file,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetArg {
    /// 1920x1080, captions off
    Landscape,
    /// 1080x1920, captions on
    Vertical,
}

impl From<PresetArg> for CompositionPreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Landscape => CompositionPreset::Landscape,
            PresetArg::Vertical => CompositionPreset::Vertical,
        }
    }
}
