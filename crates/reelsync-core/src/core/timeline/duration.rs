//! Duration Aggregator
//!
//! Computes the total composition length from the three timeline tracks.

use serde::{Deserialize, Serialize, Serializer};
use tracing::warn;

use super::{CaptionLine, Timeline, TimeSpan};
use crate::core::{ms_to_frames_ceil, Frame, Ratio, TimeMs};

/// Silence kept after the last spoken caption character
pub const DEFAULT_TAIL_BUFFER_MS: TimeMs = 500.0;

/// Length of a composition with nothing on it (one second)
pub const DEFAULT_MINIMUM_DURATION_MS: TimeMs = 1000.0;

/// How the end of a track is found
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndScan {
    /// Read the last entry only; tracks must be sorted by start time
    #[default]
    LastEntry,
    /// Take the latest end over every entry; order does not matter
    Maximum,
}

/// Constants that shape the total duration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DurationPolicy {
    pub tail_buffer_ms: TimeMs,
    pub minimum_duration_ms: TimeMs,
    pub end_scan: EndScan,
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self {
            tail_buffer_ms: DEFAULT_TAIL_BUFFER_MS,
            minimum_duration_ms: DEFAULT_MINIMUM_DURATION_MS,
            end_scan: EndScan::LastEntry,
        }
    }
}

/// Total render length, the single source of truth for the render host
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionMetadata {
    /// Whole rates serialize as integers (`30`, not `30.0`)
    #[serde(serialize_with = "serialize_rate")]
    pub fps: f64,
    pub duration_in_frames: Frame,
}

/// Computes the total duration of `timeline` in milliseconds
///
/// A timeline with every track empty is `minimum_duration_ms` long rather than zero.
pub fn total_duration_ms(timeline: &Timeline, policy: &DurationPolicy) -> TimeMs {
    if timeline.is_empty() {
        return policy.minimum_duration_ms;
    }

    let caption_end = |line: &CaptionLine| match line.spoken_end_ms() {
        Some(spoken) => spoken + policy.tail_buffer_ms,
        None => line.end_ms.unwrap_or(line.start_ms),
    };

    let ends = [
        track_end("audio", &timeline.audio, policy.end_scan, |a| a.end_ms),
        track_end("elements", &timeline.elements, policy.end_scan, |e| e.end_ms),
        track_end("text", &timeline.text, policy.end_scan, caption_end),
    ];

    ends.into_iter().flatten().fold(0.0, f64::max)
}

/// Computes `{ fps, durationInFrames }` for `timeline`
///
/// A composition is never shorter than one frame, even when every entry ends at 0 ms.
pub fn calculate_metadata(timeline: &Timeline, fps: Ratio, policy: &DurationPolicy) -> CompositionMetadata {
    let total_ms = total_duration_ms(timeline, policy);
    CompositionMetadata {
        fps: fps.as_f64(),
        duration_in_frames: ms_to_frames_ceil(total_ms, fps).max(1),
    }
}

fn serialize_rate<S: Serializer>(fps: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if fps.is_finite() && fps.fract() == 0.0 {
        serializer.serialize_i64(*fps as i64)
    } else {
        serializer.serialize_f64(*fps)
    }
}

fn track_end<T: TimeSpan>(
    track: &str,
    items: &[T],
    scan: EndScan,
    end_of: impl Fn(&T) -> TimeMs,
) -> Option<TimeMs> {
    match scan {
        EndScan::LastEntry => {
            if !is_sorted_by_start(items) {
                warn!(
                    "Track '{}' is not sorted by start time; duration reads only its last entry",
                    track
                );
            }
            items.last().map(end_of)
        }
        EndScan::Maximum => items.iter().map(end_of).reduce(f64::max),
    }
}

fn is_sorted_by_start<T: TimeSpan>(items: &[T]) -> bool {
    items
        .windows(2)
        .all(|pair| pair[0].start_ms() <= pair[1].start_ms())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::captions::CharacterTrack;
    use crate::core::timeline::{AudioClip, MediaElement};

    fn fps30() -> Ratio {
        Ratio::fps(30)
    }

    #[test]
    fn test_empty_timeline_is_one_second() {
        let policy = DurationPolicy::default();
        let timeline = Timeline::new();

        assert_eq!(total_duration_ms(&timeline, &policy), 1000.0);
        let metadata = calculate_metadata(&timeline, fps30(), &policy);
        assert_eq!(metadata.fps, 30.0);
        assert_eq!(metadata.duration_in_frames, 30);
    }

    #[test]
    fn test_audio_only() {
        let mut timeline = Timeline::new();
        timeline.audio.push(AudioClip::new(0.0, 5000.0, "voice.mp3"));

        let metadata = calculate_metadata(&timeline, fps30(), &DurationPolicy::default());
        assert_eq!(metadata.duration_in_frames, 150);
    }

    #[test]
    fn test_caption_tail_buffer() {
        let mut timeline = Timeline::new();
        timeline.text.push(CaptionLine::timed(
            2000.0,
            CharacterTrack::from_text("ok", vec![0.0, 0.5], vec![0.5, 1.0]),
        ));

        // 2000 + 1000 + 500
        assert_eq!(total_duration_ms(&timeline, &DurationPolicy::default()), 3500.0);
    }

    #[test]
    fn test_caption_without_timestamps_uses_end() {
        let mut timeline = Timeline::new();
        timeline.text.push(CaptionLine::untimed(0.0, 4200.0));
        assert_eq!(total_duration_ms(&timeline, &DurationPolicy::default()), 4200.0);

        timeline.text[0].end_ms = None;
        assert_eq!(total_duration_ms(&timeline, &DurationPolicy::default()), 0.0);
    }

    #[test]
    fn test_caption_with_empty_timestamps_falls_back() {
        let mut timeline = Timeline::new();
        let mut line = CaptionLine::untimed(100.0, 900.0);
        line.timestamps = Some(CharacterTrack::default());
        timeline.text.push(line);

        assert_eq!(total_duration_ms(&timeline, &DurationPolicy::default()), 900.0);
    }

    #[test]
    fn test_max_across_tracks() {
        let mut timeline = Timeline::new();
        timeline.audio.push(AudioClip::new(0.0, 3000.0, "a.mp3"));
        timeline.elements.push(MediaElement::image(0.0, 7000.0, "b.png"));
        timeline.text.push(CaptionLine::untimed(0.0, 5000.0));

        assert_eq!(total_duration_ms(&timeline, &DurationPolicy::default()), 7000.0);
    }

    #[test]
    fn test_last_entry_scan_trusts_order() {
        let mut timeline = Timeline::new();
        timeline.elements.push(MediaElement::image(4000.0, 9000.0, "late.png"));
        timeline.elements.push(MediaElement::image(0.0, 2000.0, "early.png"));

        let last_entry = DurationPolicy::default();
        let maximum = DurationPolicy {
            end_scan: EndScan::Maximum,
            ..DurationPolicy::default()
        };

        assert_eq!(total_duration_ms(&timeline, &last_entry), 2000.0);
        assert_eq!(total_duration_ms(&timeline, &maximum), 9000.0);
    }

    #[test]
    fn test_adding_later_entity_never_decreases_duration() {
        for end_scan in [EndScan::LastEntry, EndScan::Maximum] {
            let policy = DurationPolicy {
                end_scan,
                ..DurationPolicy::default()
            };
            let mut timeline = Timeline::new();
            timeline.audio.push(AudioClip::new(0.0, 2000.0, "a.mp3"));
            timeline.elements.push(MediaElement::image(0.0, 3000.0, "b.png"));
            let before = total_duration_ms(&timeline, &policy);

            timeline.audio.push(AudioClip::new(2000.0, 2500.0, "c.mp3"));
            let after_audio = total_duration_ms(&timeline, &policy);
            assert!(after_audio >= before);

            timeline.elements.push(MediaElement::image(3000.0, 8000.0, "d.png"));
            let after_element = total_duration_ms(&timeline, &policy);
            assert!(after_element >= after_audio);
            assert_eq!(after_element, 8000.0);
        }
    }

    #[test]
    fn test_end_scan_serialization() {
        assert_eq!(serde_json::to_string(&EndScan::LastEntry).unwrap(), "\"lastEntry\"");
        assert_eq!(serde_json::to_string(&EndScan::Maximum).unwrap(), "\"maximum\"");
    }

    #[test]
    fn test_metadata_serialization() {
        let metadata = CompositionMetadata {
            fps: 30.0,
            duration_in_frames: 150,
        };
        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(json, r#"{"fps":30,"durationInFrames":150}"#);

        let ntsc = CompositionMetadata {
            fps: 30000.0 / 1001.0,
            duration_in_frames: 150,
        };
        let json = serde_json::to_string(&ntsc).unwrap();
        assert!(json.starts_with(r#"{"fps":29.97"#));
    }

    #[test]
    fn test_zero_length_entries_still_get_one_frame() {
        let policy = DurationPolicy::default();

        let mut timeline = Timeline::new();
        timeline.audio.push(AudioClip::new(0.0, 0.0, "silence.mp3"));
        assert_eq!(total_duration_ms(&timeline, &policy), 0.0);
        assert_eq!(calculate_metadata(&timeline, fps30(), &policy).duration_in_frames, 1);

        let mut timeline = Timeline::new();
        let mut line = CaptionLine::untimed(0.0, 0.0);
        line.end_ms = None;
        timeline.text.push(line);
        assert_eq!(calculate_metadata(&timeline, fps30(), &policy).duration_in_frames, 1);
    }
}
