//! Timeline Model Definitions
//!
//! Defines the input timeline: media elements, audio clips and caption lines,
//! each as a typed model rather than a loosely typed bag of optional fields.

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::captions::CharacterTrack;
use crate::core::{CoreError, CoreResult, TimeMs};

// =============================================================================
// Time Span
// =============================================================================

/// Anything placed on the timeline with a start and an end
pub trait TimeSpan {
    /// Start time on the global timeline
    fn start_ms(&self) -> TimeMs;

    /// End time on the global timeline
    fn end_ms(&self) -> TimeMs;

    /// Returns the span length
    fn duration_ms(&self) -> TimeMs {
        self.end_ms() - self.start_ms()
    }
}

// =============================================================================
// Media Element
// =============================================================================

/// Where a media element's pixels come from
///
/// When both URLs are present the video wins. An element with neither still
/// parses as [`MediaSource::Missing`] and is left out of the schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaSource {
    #[serde(rename_all = "camelCase")]
    Video { video_url: String },
    #[serde(rename_all = "camelCase")]
    Image { image_url: String },
    Missing {},
}

impl MediaSource {
    /// Returns the referenced URL or static file path (empty when missing)
    pub fn url(&self) -> &str {
        match self {
            Self::Video { video_url } => video_url,
            Self::Image { image_url } => image_url,
            Self::Missing {} => "",
        }
    }

    /// Returns true if neither `videoUrl` nor `imageUrl` was given
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing {})
    }

    /// Returns true for video sources
    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video { .. })
    }

    /// Returns true for remote sources (served as-is rather than from static files)
    pub fn is_remote(&self) -> bool {
        self.url().starts_with("http")
    }
}

/// Animation attached to a media element over its whole window
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ElementAnimation {
    /// Linear zoom from `from` to `to`
    Scale { from: f64, to: f64 },
    /// Any animation type this engine does not evaluate
    #[serde(other)]
    Unsupported,
}

/// Visual media (image or video) placed on the timeline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaElement {
    pub start_ms: TimeMs,
    pub end_ms: TimeMs,
    #[serde(flatten)]
    pub source: MediaSource,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub animations: Vec<ElementAnimation>,
}

impl MediaElement {
    /// Creates an image element
    pub fn image(start_ms: TimeMs, end_ms: TimeMs, image_url: &str) -> Self {
        Self {
            start_ms,
            end_ms,
            source: MediaSource::Image {
                image_url: image_url.to_string(),
            },
            animations: vec![],
        }
    }

    /// Creates a video element
    pub fn video(start_ms: TimeMs, end_ms: TimeMs, video_url: &str) -> Self {
        Self {
            start_ms,
            end_ms,
            source: MediaSource::Video {
                video_url: video_url.to_string(),
            },
            animations: vec![],
        }
    }

    /// Adds an animation
    pub fn with_animation(mut self, animation: ElementAnimation) -> Self {
        self.animations.push(animation);
        self
    }
}

impl TimeSpan for MediaElement {
    fn start_ms(&self) -> TimeMs {
        self.start_ms
    }

    fn end_ms(&self) -> TimeMs {
        self.end_ms
    }
}

// =============================================================================
// Audio Clip
// =============================================================================

/// Audio placed on the timeline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioClip {
    pub start_ms: TimeMs,
    pub end_ms: TimeMs,
    pub audio_url: String,
    /// Clip gain (1.0 = unchanged)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl AudioClip {
    pub fn new(start_ms: TimeMs, end_ms: TimeMs, audio_url: &str) -> Self {
        Self {
            start_ms,
            end_ms,
            audio_url: audio_url.to_string(),
            volume: None,
        }
    }

    /// Sets the clip gain
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }
}

impl TimeSpan for AudioClip {
    fn start_ms(&self) -> TimeMs {
        self.start_ms
    }

    fn end_ms(&self) -> TimeMs {
        self.end_ms
    }
}

// =============================================================================
// Caption Line
// =============================================================================

/// One line of transcript, usually carrying per-character timing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionLine {
    /// Anchors the character timestamps to the global timeline
    pub start_ms: TimeMs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_ms: Option<TimeMs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<CharacterTrack>,
}

impl CaptionLine {
    /// Creates a line with character timing
    pub fn timed(start_ms: TimeMs, timestamps: CharacterTrack) -> Self {
        Self {
            start_ms,
            end_ms: None,
            text: Some(timestamps.text()),
            timestamps: Some(timestamps),
        }
    }

    /// Creates a line with only coarse timing
    pub fn untimed(start_ms: TimeMs, end_ms: TimeMs) -> Self {
        Self {
            start_ms,
            end_ms: Some(end_ms),
            text: None,
            timestamps: None,
        }
    }

    /// End of the last character's speech, when character timing is available
    pub fn spoken_end_ms(&self) -> Option<TimeMs> {
        self.timestamps
            .as_ref()
            .and_then(|t| t.last_end_seconds())
            .map(|seconds| self.start_ms + seconds * 1000.0)
    }
}

impl TimeSpan for CaptionLine {
    fn start_ms(&self) -> TimeMs {
        self.start_ms
    }

    /// Spoken end, else the declared end, else the start
    fn end_ms(&self) -> TimeMs {
        self.spoken_end_ms()
            .or(self.end_ms)
            .unwrap_or(self.start_ms)
    }
}

// =============================================================================
// Timeline
// =============================================================================

/// Kind of a timeline entity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Media,
    Audio,
    Caption,
}

/// Borrowed view of any timeline entry
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimelineEntity<'a> {
    Media(&'a MediaElement),
    Audio(&'a AudioClip),
    Caption(&'a CaptionLine),
}

impl TimelineEntity<'_> {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Media(_) => EntityKind::Media,
            Self::Audio(_) => EntityKind::Audio,
            Self::Caption(_) => EntityKind::Caption,
        }
    }
}

impl TimeSpan for TimelineEntity<'_> {
    fn start_ms(&self) -> TimeMs {
        match self {
            Self::Media(m) => m.start_ms(),
            Self::Audio(a) => a.start_ms(),
            Self::Caption(c) => c.start_ms(),
        }
    }

    fn end_ms(&self) -> TimeMs {
        match self {
            Self::Media(m) => m.end_ms(),
            Self::Audio(a) => a.end_ms(),
            Self::Caption(c) => c.end_ms(),
        }
    }
}

/// The three independent tracks of a composition
///
/// A missing or `null` track is the same as an empty one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub elements: Vec<MediaElement>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub audio: Vec<AudioClip>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub text: Vec<CaptionLine>,
}

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if every track is empty
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.audio.is_empty() && self.text.is_empty()
    }

    /// Iterates every entity: elements, then audio, then caption lines
    pub fn entities(&self) -> impl Iterator<Item = TimelineEntity<'_>> {
        self.elements
            .iter()
            .map(TimelineEntity::Media)
            .chain(self.audio.iter().map(TimelineEntity::Audio))
            .chain(self.text.iter().map(TimelineEntity::Caption))
    }

    /// Checks the `end >= start` invariant on media and audio, and that every
    /// caption line's timestamp arrays line up
    pub fn validate(&self) -> CoreResult<()> {
        for (index, line) in self.text.iter().enumerate() {
            if let Some(track) = &line.timestamps {
                track
                    .validate()
                    .map_err(|e| CoreError::MalformedCaptionLine {
                        index,
                        reason: e.to_string(),
                    })?;
            }
        }
        for entity in self.entities() {
            if entity.kind() == EntityKind::Caption {
                continue;
            }
            let (start, end) = (entity.start_ms(), entity.end_ms());
            if end < start || start.is_nan() || end.is_nan() {
                return Err(CoreError::InvalidTimeRange(start, end));
            }
        }
        Ok(())
    }
}

/// A timeline as it arrives on disk: bare, or wrapped in a manifest
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TimelineDocument {
    Manifest { timeline: Timeline },
    Bare(Timeline),
}

impl TimelineDocument {
    /// Parses a timeline document from JSON
    ///
    /// The shape is picked by the presence of a `timeline` key, so a bad entry
    /// reports its own serde error instead of a generic untagged mismatch.
    pub fn from_json(content: &str) -> CoreResult<Timeline> {
        let mut value: serde_json::Value = serde_json::from_str(content)?;
        let document = match value.get_mut("timeline").map(serde_json::Value::take) {
            Some(timeline) => Self::Manifest {
                timeline: serde_json::from_value(timeline)?,
            },
            None => Self::Bare(serde_json::from_value(value)?),
        };
        Ok(document.into_timeline())
    }

    pub fn into_timeline(self) -> Timeline {
        match self {
            Self::Manifest { timeline } | Self::Bare(timeline) => timeline,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
