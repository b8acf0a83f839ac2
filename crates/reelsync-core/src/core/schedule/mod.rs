//! Schedule Mapper
//!
//! Converts timed entities into frame-indexed windows for the render host.
//!
//! Every window is `{ startFrame, durationFrames }`. A window whose duration is
//! zero or negative is dropped from the render set instead of being reported as
//! an error.

mod animation;

pub use animation::{interpolate_clamped, FadeEnvelope};

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::captions::CaptionPage;
use crate::core::timeline::{AudioClip, MediaElement, TimeSpan};
use crate::core::{ms_to_frame, Frame, Ratio, TimeMs};

/// Frames a final caption page lingers after its last word
pub const DEFAULT_TAIL_PADDING_FRAMES: Frame = 15;

// =============================================================================
// Schedule Window
// =============================================================================

/// Frame range in which an entity is visible or audible
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleWindow {
    pub start_frame: Frame,
    pub duration_frames: Frame,
}

impl ScheduleWindow {
    /// Builds a window from `[start, end)`; `None` when it would be empty
    pub fn from_frames(start_frame: Frame, end_frame: Frame) -> Option<Self> {
        let duration_frames = end_frame - start_frame;
        if duration_frames <= 0 {
            return None;
        }
        Some(Self {
            start_frame,
            duration_frames,
        })
    }

    /// First frame after the window
    pub fn end_frame(&self) -> Frame {
        self.start_frame + self.duration_frames
    }

    /// Returns true if `frame` falls inside the window
    pub fn contains(&self, frame: Frame) -> bool {
        frame >= self.start_frame && frame < self.end_frame()
    }

    /// Converts a composition frame to a frame relative to the window start
    pub fn local_frame(&self, frame: Frame) -> Frame {
        frame - self.start_frame
    }
}

// =============================================================================
// Scheduled Entries
// =============================================================================

/// A media element with its window
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledElement {
    /// Position in the input `elements` track
    pub index: usize,
    pub window: ScheduleWindow,
    pub element: MediaElement,
}

/// An audio clip with its window
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledAudio {
    /// Position in the input `audio` track
    pub index: usize,
    pub window: ScheduleWindow,
    pub clip: AudioClip,
}

impl ScheduledAudio {
    /// Effective gain at composition `frame`: envelope times clip volume
    pub fn volume_at(&self, frame: Frame, envelope: &FadeEnvelope) -> f64 {
        let local = self.window.local_frame(frame);
        envelope.volume_at(local, self.window.duration_frames) * self.clip.volume.unwrap_or(1.0)
    }
}

/// A caption page with its window
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPage {
    /// Position in the segmented page list
    pub index: usize,
    pub window: ScheduleWindow,
    pub text: String,
    pub page: CaptionPage,
}

// =============================================================================
// Schedule Mapper
// =============================================================================

/// Maps milliseconds to frames at a fixed output rate
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduleMapper {
    fps: Ratio,
    tail_padding_frames: Frame,
    max_page_duration_ms: Option<TimeMs>,
}

impl ScheduleMapper {
    pub fn new(fps: Ratio) -> Self {
        Self {
            fps,
            tail_padding_frames: DEFAULT_TAIL_PADDING_FRAMES,
            max_page_duration_ms: None,
        }
    }

    /// Sets how long the final caption page stays after its last word
    pub fn with_tail_padding(mut self, frames: Frame) -> Self {
        self.tail_padding_frames = frames;
        self
    }

    /// Caps how long any caption page may stay on screen
    pub fn with_max_page_duration(mut self, max_ms: Option<TimeMs>) -> Self {
        self.max_page_duration_ms = max_ms;
        self
    }

    pub fn fps(&self) -> Ratio {
        self.fps
    }

    /// Window for any entity with an explicit end
    pub fn window_for(&self, span: &impl TimeSpan) -> Option<ScheduleWindow> {
        ScheduleWindow::from_frames(
            ms_to_frame(span.start_ms(), self.fps),
            ms_to_frame(span.end_ms(), self.fps),
        )
    }

    /// Schedules media elements, dropping degenerate windows and elements
    /// without a source
    pub fn map_elements(&self, elements: &[MediaElement]) -> Vec<ScheduledElement> {
        elements
            .iter()
            .enumerate()
            .filter(|(index, element)| {
                if element.source.is_missing() {
                    warn!("Dropping media element {}: no imageUrl or videoUrl", index);
                    return false;
                }
                true
            })
            .filter_map(|(index, element)| match self.window_for(element) {
                Some(window) => Some(ScheduledElement {
                    index,
                    window,
                    element: element.clone(),
                }),
                None => {
                    debug!("Dropping media element {}: empty window", index);
                    None
                }
            })
            .collect()
    }

    /// Schedules audio clips, dropping degenerate windows
    pub fn map_audio(&self, clips: &[AudioClip]) -> Vec<ScheduledAudio> {
        clips
            .iter()
            .enumerate()
            .filter_map(|(index, clip)| match self.window_for(clip) {
                Some(window) => Some(ScheduledAudio {
                    index,
                    window,
                    clip: clip.clone(),
                }),
                None => {
                    debug!("Dropping audio clip {}: empty window", index);
                    None
                }
            })
            .collect()
    }

    /// Window for one page given the page that follows it
    ///
    /// A page ends where the next one starts; the last page ends at its final
    /// token plus the tail padding.
    pub fn page_window(&self, page: &CaptionPage, next: Option<&CaptionPage>) -> Option<ScheduleWindow> {
        let start_frame = ms_to_frame(page.start_ms, self.fps);
        let mut end_frame = match next {
            Some(next) => ms_to_frame(next.start_ms, self.fps),
            None => ms_to_frame(page.spoken_end_ms(), self.fps) + self.tail_padding_frames,
        };
        if let Some(max_ms) = self.max_page_duration_ms {
            let max_frames = ms_to_frame(max_ms, self.fps).max(1);
            end_frame = end_frame.min(start_frame + max_frames);
        }
        ScheduleWindow::from_frames(start_frame, end_frame)
    }

    /// Schedules caption pages, dropping degenerate windows
    pub fn map_pages(&self, pages: &[CaptionPage]) -> Vec<ScheduledPage> {
        pages
            .iter()
            .enumerate()
            .filter_map(|(index, page)| {
                match self.page_window(page, pages.get(index + 1)) {
                    Some(window) => Some(ScheduledPage {
                        index,
                        window,
                        text: page.text(),
                        page: page.clone(),
                    }),
                    None => {
                        debug!("Dropping caption page {}: empty window", index);
                        None
                    }
                }
            })
            .collect()
    }
}

impl Default for ScheduleMapper {
    fn default() -> Self {
        Self::new(Ratio::default())
    }
}

// =============================================================================
// Tests
// =============================================================================
