//! Engine Settings
//!
//! Provides the engine configuration with:
//! - Defaults for every field (partial files are fine)
//! - Normalization that repairs bad values instead of failing
//! - Atomic file writes (temp file + rename)

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::captions::PHRASE_GAP_MS;
use crate::core::composition::CompositionPreset;
use crate::core::schedule::{FadeEnvelope, ScheduleMapper, DEFAULT_TAIL_PADDING_FRAMES};
use crate::core::timeline::{
    DurationPolicy, EndScan, DEFAULT_MINIMUM_DURATION_MS, DEFAULT_TAIL_BUFFER_MS,
};
use crate::core::{frame_to_ms, CoreError, CoreResult, Frame, Ratio, TimeMs};

/// Settings schema version for migration support
pub const SETTINGS_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE: &str = "reelsync.json";

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    /// Output frame rate, independent of any source media rate
    #[serde(default)]
    pub fps: Ratio,

    /// Silence that starts a new caption page
    #[serde(default = "default_gap_threshold")]
    pub gap_threshold_ms: TimeMs,

    /// Frames the last caption page lingers after its final word
    #[serde(default = "default_tail_padding")]
    pub tail_padding_frames: Frame,

    /// Time kept after the last spoken character when sizing the composition
    #[serde(default = "default_tail_buffer")]
    pub tail_buffer_ms: TimeMs,

    /// Length of a composition with nothing on it
    #[serde(default = "default_minimum_duration")]
    pub minimum_duration_ms: TimeMs,

    /// How each track's end is found
    #[serde(default)]
    pub end_scan: EndScan,

    /// Upper bound on how long one caption page stays on screen
    #[serde(default)]
    pub max_page_duration_ms: Option<TimeMs>,

    /// Whether caption pages are scheduled at all
    #[serde(default = "default_true")]
    pub show_captions: bool,

    /// Volume ramp applied to audio clips
    #[serde(default)]
    pub audio_fade: FadeEnvelope,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

fn default_gap_threshold() -> TimeMs {
    PHRASE_GAP_MS
}

fn default_tail_padding() -> Frame {
    DEFAULT_TAIL_PADDING_FRAMES
}

fn default_tail_buffer() -> TimeMs {
    DEFAULT_TAIL_BUFFER_MS
}

fn default_minimum_duration() -> TimeMs {
    DEFAULT_MINIMUM_DURATION_MS
}

fn default_true() -> bool {
    true
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            fps: Ratio::default(),
            gap_threshold_ms: default_gap_threshold(),
            tail_padding_frames: default_tail_padding(),
            tail_buffer_ms: default_tail_buffer(),
            minimum_duration_ms: default_minimum_duration(),
            end_scan: EndScan::default(),
            max_page_duration_ms: None,
            show_captions: true,
            audio_fade: FadeEnvelope::default(),
        }
    }
}

impl EngineSettings {
    /// Settings matching a composition preset's rate and caption toggle
    pub fn for_preset(preset: CompositionPreset) -> Self {
        Self {
            fps: preset.fps(),
            show_captions: preset.shows_captions(),
            ..Self::default()
        }
    }

    /// Checks values that would make the engine meaningless
    pub fn validate(&self) -> CoreResult<()> {
        if !self.fps.is_valid_rate() {
            return Err(CoreError::InvalidFrameRate(format!(
                "{}/{}",
                self.fps.num, self.fps.den
            )));
        }
        if !self.gap_threshold_ms.is_finite() || self.gap_threshold_ms < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "gapThresholdMs must be a non-negative number, got {}",
                self.gap_threshold_ms
            )));
        }
        Ok(())
    }

    /// Normalizes and clamps settings so they are always usable.
    ///
    /// Bad values are corrected rather than rejected, so an old or hand-edited
    /// config never stops a render.
    pub fn normalize(&mut self) {
        self.version = SETTINGS_VERSION;

        if !self.fps.is_valid_rate() {
            warn!(
                "Invalid frame rate {}/{}, defaulting to {}",
                self.fps.num,
                self.fps.den,
                Ratio::default().num
            );
            self.fps = Ratio::default();
        }

        self.gap_threshold_ms = clamp_f64(self.gap_threshold_ms, 0.0, 60_000.0, PHRASE_GAP_MS);
        self.tail_padding_frames = self.tail_padding_frames.clamp(0, 600);
        self.tail_buffer_ms = clamp_f64(self.tail_buffer_ms, 0.0, 60_000.0, DEFAULT_TAIL_BUFFER_MS);
        self.minimum_duration_ms = clamp_f64(
            self.minimum_duration_ms,
            1.0,
            3_600_000.0,
            DEFAULT_MINIMUM_DURATION_MS,
        );
        // A cap shorter than one frame would round every page window to nothing.
        let one_frame_ms = frame_to_ms(1, self.fps);
        self.max_page_duration_ms = self
            .max_page_duration_ms
            .filter(|ms| ms.is_finite() && *ms > 0.0)
            .map(|ms| ms.max(one_frame_ms));
        self.audio_fade.normalize();
    }

    /// Duration aggregator constants
    pub fn duration_policy(&self) -> DurationPolicy {
        DurationPolicy {
            tail_buffer_ms: self.tail_buffer_ms,
            minimum_duration_ms: self.minimum_duration_ms,
            end_scan: self.end_scan,
        }
    }

    /// Schedule mapper configured from these settings
    pub fn schedule_mapper(&self) -> ScheduleMapper {
        ScheduleMapper::new(self.fps)
            .with_tail_padding(self.tail_padding_frames)
            .with_max_page_duration(self.max_page_duration_ms)
    }

    /// Reads settings from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> CoreResult<Self> {
        SettingsManager::new(path).try_load()
    }

    /// Writes normalized settings to `path` atomically
    pub fn save(&self, path: &Path) -> CoreResult<Self> {
        SettingsManager::new(path).save(self)
    }
}

fn clamp_f64(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if !value.is_finite() {
        return fallback;
    }
    value.clamp(min, max)
}

// =============================================================================
// Settings Manager
// =============================================================================

/// Loads and saves engine settings at a fixed path
pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    /// Creates a manager for an explicit settings file
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
        }
    }

    /// Creates a manager for `reelsync.json` inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SETTINGS_FILE))
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Reads settings, failing on unreadable or unparsable files
    ///
    /// A missing file is not an error; it yields the defaults.
    pub fn try_load(&self) -> CoreResult<EngineSettings> {
        if !self.settings_path.exists() {
            info!("Settings file not found, using defaults");
            return Ok(EngineSettings::default());
        }

        let content = fs::read_to_string(&self.settings_path)?;
        let mut settings: EngineSettings = serde_json::from_str(&content)?;

        if settings.version < SETTINGS_VERSION {
            info!(
                "Migrating settings from version {} to {}",
                settings.version, SETTINGS_VERSION
            );
        }

        settings.normalize();
        Ok(settings)
    }

    /// Load settings from disk, returning defaults on any failure
    pub fn load(&self) -> EngineSettings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load settings, using defaults: {}", e);
                EngineSettings::default()
            }
        }
    }

    /// Save settings to disk using atomic write (temp file + rename)
    pub fn save(&self, settings: &EngineSettings) -> CoreResult<EngineSettings> {
        if let Some(parent) = self.settings_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Normalize before persisting.
        let mut normalized = settings.clone();
        normalized.normalize();

        let content = serde_json::to_string_pretty(&normalized)?;

        let temp_path = self.settings_path.with_extension("json.tmp");
        if temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        drop(file);

        if cfg!(windows) && self.settings_path.exists() {
            // Windows: rename does not overwrite.
            fs::remove_file(&self.settings_path)?;
        }
        fs::rename(&temp_path, &self.settings_path)?;

        info!("Settings saved to {:?}", self.settings_path);
        Ok(normalized)
    }
}

// =============================================================================
// Tests
// =============================================================================
