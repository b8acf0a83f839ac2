//! Playback-instant queries over a render schedule.

use serde::Serialize;

use super::RenderSchedule;
use crate::core::{frame_to_ms, Frame, TimeMs};

/// A media element visible at a frame
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveElement {
    pub index: usize,
    pub url: String,
    pub local_frame: Frame,
    pub scale: f64,
}

/// An audio clip audible at a frame
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveAudio {
    pub index: usize,
    pub url: String,
    pub local_frame: Frame,
    pub volume: f64,
}

/// The caption page on screen at a frame
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveCaption {
    pub index: usize,
    pub text: String,
    /// Token being spoken, if any; pauses between words have none
    pub active_token: Option<usize>,
    /// One highlight flag per token of the page
    pub token_states: Vec<bool>,
}

/// What the render host draws at one frame
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameState {
    pub frame: Frame,
    pub time_ms: TimeMs,
    pub elements: Vec<ActiveElement>,
    pub audio: Vec<ActiveAudio>,
    pub caption: Option<ActiveCaption>,
}

impl RenderSchedule {
    /// Resolves everything active at composition `frame`
    pub fn frame_state(&self, frame: Frame) -> FrameState {
        let time_ms = frame_to_ms(frame, self.fps());

        let elements = self
            .elements
            .iter()
            .filter(|s| s.window.contains(frame))
            .map(|s| {
                let local_frame = s.window.local_frame(frame);
                ActiveElement {
                    index: s.index,
                    url: s.element.source.url().to_string(),
                    local_frame,
                    scale: s.element.scale_at(local_frame, s.window.duration_frames),
                }
            })
            .collect();

        let audio = self
            .audio
            .iter()
            .filter(|s| s.window.contains(frame))
            .map(|s| ActiveAudio {
                index: s.index,
                url: s.clip.audio_url.clone(),
                local_frame: s.window.local_frame(frame),
                volume: s.volume_at(frame, self.audio_fade()),
            })
            .collect();

        let caption = self
            .captions
            .iter()
            .find(|s| s.window.contains(frame))
            .map(|s| ActiveCaption {
                index: s.index,
                text: s.text.clone(),
                active_token: s.page.tokens.iter().position(|t| t.is_active_at(time_ms)),
                token_states: s.page.token_states_at(time_ms),
            });

        FrameState {
            frame,
            time_ms,
            elements,
            audio,
            caption,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
