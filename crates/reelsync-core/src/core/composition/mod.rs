//! Composition Module
//!
//! Output formats and the one-call pipeline that turns a timeline into a render
//! schedule:
//!
//! ```text
//! Timeline ─┬─ text ──► tokenize_lines ──► create_pages ──► map_pages ──┐
//!           ├─ elements ─────────────────────────────────► map_elements ├─► RenderSchedule
//!           ├─ audio ────────────────────────────────────► map_audio ───┤
//!           └─ (all tracks) ─────────────────────────► calculate_metadata ┘
//! ```

mod state;

pub use state::{ActiveAudio, ActiveCaption, ActiveElement, FrameState};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::captions::{create_pages, tokenize_lines, CaptionPage};
use crate::core::schedule::{FadeEnvelope, ScheduledAudio, ScheduledElement, ScheduledPage};
use crate::core::settings::EngineSettings;
use crate::core::timeline::{calculate_metadata, CompositionMetadata, Timeline};
use crate::core::Ratio;

// =============================================================================
// Presets
// =============================================================================

/// Canvas size
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the aspect ratio as a float
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Output format of a composition
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompositionPreset {
    /// 1920x1080 long-form video, no burned-in captions
    Landscape,
    /// 1080x1920 short-form video with word-highlighted captions
    #[default]
    Vertical,
}

impl CompositionPreset {
    pub fn canvas(&self) -> Canvas {
        match self {
            CompositionPreset::Landscape => Canvas::new(1920, 1080),
            CompositionPreset::Vertical => Canvas::new(1080, 1920),
        }
    }

    pub fn fps(&self) -> Ratio {
        Ratio::fps(30)
    }

    /// Whether caption pages are drawn in this format
    pub fn shows_captions(&self) -> bool {
        matches!(self, CompositionPreset::Vertical)
    }
}

// =============================================================================
// Render Schedule
// =============================================================================

/// Everything the render host needs to draw a timeline frame by frame
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSchedule {
    pub metadata: CompositionMetadata,
    pub elements: Vec<ScheduledElement>,
    pub audio: Vec<ScheduledAudio>,
    pub captions: Vec<ScheduledPage>,
    #[serde(skip)]
    fps: Ratio,
    #[serde(skip)]
    audio_fade: FadeEnvelope,
}

impl RenderSchedule {
    /// Output frame rate the windows were computed at
    pub fn fps(&self) -> Ratio {
        self.fps
    }

    /// Envelope applied to audio volumes in [`RenderSchedule::frame_state`]
    pub fn audio_fade(&self) -> &FadeEnvelope {
        &self.audio_fade
    }

    /// Returns true if nothing is scheduled
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.audio.is_empty() && self.captions.is_empty()
    }
}

/// Tokenizes and segments every caption line of `timeline`
pub fn caption_pages(timeline: &Timeline, settings: &EngineSettings) -> Vec<CaptionPage> {
    let tokens = tokenize_lines(&timeline.text);
    create_pages(&tokens, settings.gap_threshold_ms)
}

/// Runs the full pipeline on an immutable timeline snapshot
pub fn build_schedule(timeline: &Timeline, settings: &EngineSettings) -> RenderSchedule {
    let mapper = settings.schedule_mapper();
    let metadata = calculate_metadata(timeline, settings.fps, &settings.duration_policy());

    let captions = if settings.show_captions {
        mapper.map_pages(&caption_pages(timeline, settings))
    } else {
        Vec::new()
    };

    let schedule = RenderSchedule {
        metadata,
        elements: mapper.map_elements(&timeline.elements),
        audio: mapper.map_audio(&timeline.audio),
        captions,
        fps: settings.fps,
        audio_fade: settings.audio_fade,
    };

    info!(
        "Built schedule: {} frames, {} elements, {} audio, {} caption pages",
        schedule.metadata.duration_in_frames,
        schedule.elements.len(),
        schedule.audio.len(),
        schedule.captions.len()
    );

    schedule
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::captions::CharacterTrack;
    use crate::core::timeline::{AudioClip, CaptionLine, MediaElement, TimelineDocument};

    fn hi_there(line_start_ms: f64) -> CaptionLine {
        CaptionLine::timed(
            line_start_ms,
            CharacterTrack::from_text(
                "hi there",
                vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7],
                vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8],
            ),
        )
    }

    fn captioned() -> EngineSettings {
        EngineSettings::for_preset(CompositionPreset::Vertical)
    }

    // -------------------------------------------------------------------------
    // Preset Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_presets() {
        let landscape = CompositionPreset::Landscape;
        assert_eq!(landscape.canvas(), Canvas::new(1920, 1080));
        assert!(!landscape.shows_captions());

        let vertical = CompositionPreset::Vertical;
        assert_eq!(vertical.canvas(), Canvas::new(1080, 1920));
        assert!(vertical.shows_captions());
        assert_eq!(vertical.fps(), Ratio::fps(30));
        assert!(vertical.canvas().aspect_ratio() < 1.0);
    }

    // -------------------------------------------------------------------------
    // Pipeline Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_empty_timeline_schedule() {
        let schedule = build_schedule(&Timeline::new(), &EngineSettings::default());

        assert!(schedule.is_empty());
        assert_eq!(schedule.metadata.fps, 30.0);
        assert_eq!(schedule.metadata.duration_in_frames, 30);
    }

    #[test]
    fn test_audio_only_schedule() {
        let mut timeline = Timeline::new();
        timeline.audio.push(AudioClip::new(0.0, 5000.0, "voice.mp3"));

        let schedule = build_schedule(&timeline, &EngineSettings::default());
        assert_eq!(schedule.metadata.duration_in_frames, 150);
        assert_eq!(schedule.audio.len(), 1);
        assert_eq!(schedule.audio[0].window.duration_frames, 150);
    }

    #[test]
    fn test_caption_pipeline() {
        let mut timeline = Timeline::new();
        timeline.text.push(hi_there(1000.0));

        let pages = caption_pages(&timeline, &captioned());
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].text(), "hi there");
        assert_eq!(pages[0].tokens[0].end_ms, 1200.0);

        let schedule = build_schedule(&timeline, &captioned());
        // 1000 + 800 + 500 tail buffer -> 2300ms -> 69 frames
        assert_eq!(schedule.metadata.duration_in_frames, 69);
        assert_eq!(schedule.captions.len(), 1);
        assert_eq!(schedule.captions[0].window.start_frame, 30);
        assert_eq!(schedule.captions[0].window.duration_frames, 39);
    }

    #[test]
    fn test_landscape_hides_captions() {
        let mut timeline = Timeline::new();
        timeline.text.push(hi_there(0.0));

        let settings = EngineSettings::for_preset(CompositionPreset::Landscape);
        let schedule = build_schedule(&timeline, &settings);
        assert!(schedule.captions.is_empty());
        // Captions still count toward the duration
        assert_eq!(schedule.metadata.duration_in_frames, 39);
    }

    #[test]
    fn test_gap_threshold_splits_pages() {
        let mut timeline = Timeline::new();
        timeline.text.push(hi_there(0.0));
        timeline.text.push(hi_there(5000.0));

        let settings = captioned();
        let schedule = build_schedule(&timeline, &settings);
        assert_eq!(schedule.captions.len(), 2);
        assert_eq!(schedule.captions[0].window.end_frame(), 150);

        let word_by_word = EngineSettings {
            gap_threshold_ms: 1.0,
            ..settings
        };
        // "hi" + " " + "there" are contiguous, so each line is still one page
        assert_eq!(build_schedule(&timeline, &word_by_word).captions.len(), 2);
    }

    #[test]
    fn test_malformed_line_is_skipped() {
        let mut timeline = Timeline::new();
        timeline.text.push(CaptionLine::timed(
            0.0,
            CharacterTrack::from_text("bad", vec![0.0], vec![0.1, 0.2, 0.3]),
        ));
        timeline.text.push(hi_there(1000.0));

        let schedule = build_schedule(&timeline, &captioned());
        assert_eq!(schedule.captions.len(), 1);
        assert_eq!(schedule.captions[0].text, "hi there");
    }

    #[test]
    fn test_degenerate_entities_never_scheduled() {
        let mut timeline = Timeline::new();
        timeline.elements.push(MediaElement::image(0.0, 2000.0, "a.png"));
        timeline.elements.push(MediaElement::image(2000.0, 2000.0, "b.png"));
        timeline.audio.push(AudioClip::new(3000.0, 1000.0, "c.mp3"));

        let schedule = build_schedule(&timeline, &EngineSettings::default());
        assert_eq!(schedule.elements.len(), 1);
        assert!(schedule.audio.is_empty());
        assert!(schedule
            .elements
            .iter()
            .all(|e| e.window.duration_frames > 0));
    }

    #[test]
    fn test_schedule_from_manifest_json() {
        let json = r#"{
            "timeline": {
                "elements": [{ "startMs": 0, "endMs": 3000, "imageUrl": "a.png" }],
                "audio": [{ "startMs": 0, "endMs": 4000, "audioUrl": "voice.mp3" }],
                "text": null
            }
        }"#;
        let timeline = TimelineDocument::from_json(json).unwrap();
        let schedule = build_schedule(&timeline, &EngineSettings::default());

        assert_eq!(schedule.metadata.duration_in_frames, 120);

        let value = serde_json::to_value(&schedule).unwrap();
        assert_eq!(value["metadata"]["durationInFrames"], 120);
        assert_eq!(value["elements"][0]["window"]["durationFrames"], 90);
        assert!(value.get("fps").is_none());
        assert_eq!(value["metadata"]["fps"], 30);
    }

    #[test]
    fn test_element_without_source_does_not_sink_timeline() {
        let json = r#"{
            "elements": [
                { "startMs": 0, "endMs": 1000 },
                { "startMs": 1000, "endMs": 2000, "imageUrl": "b.png" }
            ],
            "audio": [{ "startMs": 0, "endMs": 5000, "audioUrl": "voice.mp3" }]
        }"#;
        let timeline = TimelineDocument::from_json(json).unwrap();
        let schedule = build_schedule(&timeline, &EngineSettings::default());

        assert_eq!(schedule.metadata.duration_in_frames, 150);
        assert_eq!(schedule.elements.len(), 1);
        assert_eq!(schedule.elements[0].index, 1);
        assert_eq!(schedule.audio.len(), 1);
    }

    #[test]
    fn test_zero_length_timeline_is_one_frame() {
        let mut timeline = Timeline::new();
        timeline.audio.push(AudioClip::new(0.0, 0.0, "blip.mp3"));

        let schedule = build_schedule(&timeline, &EngineSettings::default());
        assert_eq!(schedule.metadata.duration_in_frames, 1);
        assert!(schedule.audio.is_empty());
    }
}
