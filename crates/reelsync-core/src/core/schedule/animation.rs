//! Per-frame animation values evaluated inside a schedule window.

use serde::{Deserialize, Serialize};

use crate::core::timeline::{ElementAnimation, MediaElement};
use crate::core::Frame;

/// Linear interpolation with both ends clamped
///
/// A zero-width input range acts as a step at `input[0]`.
pub fn interpolate_clamped(value: f64, input: [f64; 2], output: [f64; 2]) -> f64 {
    let [in_start, in_end] = input;
    let [out_start, out_end] = output;
    if in_end == in_start {
        return if value < in_start { out_start } else { out_end };
    }
    let progress = ((value - in_start) / (in_end - in_start)).clamp(0.0, 1.0);
    out_start + (out_end - out_start) * progress
}

impl MediaElement {
    /// Scale factor at `local_frame` frames into a window of `duration_frames`
    ///
    /// Uses the first `scale` animation; elements without one stay at 1.0.
    pub fn scale_at(&self, local_frame: Frame, duration_frames: Frame) -> f64 {
        let Some((from, to)) = self.animations.iter().find_map(|a| match a {
            ElementAnimation::Scale { from, to } => Some((*from, *to)),
            ElementAnimation::Unsupported => None,
        }) else {
            return 1.0;
        };
        if duration_frames <= 0 {
            return from;
        }
        let progress = local_frame as f64 / duration_frames as f64;
        interpolate_clamped(progress, [0.0, 1.0], [from, to])
    }
}

/// Volume ramp applied to every scheduled audio clip
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FadeEnvelope {
    #[serde(default)]
    pub fade_in_frames: Frame,
    #[serde(default)]
    pub fade_out_frames: Frame,
    #[serde(default = "default_volume")]
    pub volume: f64,
}

fn default_volume() -> f64 {
    1.0
}

impl Default for FadeEnvelope {
    fn default() -> Self {
        Self {
            fade_in_frames: 0,
            fade_out_frames: 0,
            volume: default_volume(),
        }
    }
}

impl FadeEnvelope {
    /// Background music bed: quick fade in, longer fade out, ducked to 25%
    pub fn music() -> Self {
        Self {
            fade_in_frames: 10,
            fade_out_frames: 20,
            volume: 0.25,
        }
    }

    /// Volume at `local_frame` frames into a window of `duration_frames`
    pub fn volume_at(&self, local_frame: Frame, duration_frames: Frame) -> f64 {
        let frame = local_frame as f64;
        let fade_in = if self.fade_in_frames > 0 {
            interpolate_clamped(frame, [0.0, self.fade_in_frames as f64], [0.0, 1.0])
        } else {
            1.0
        };
        let fade_out = if self.fade_out_frames > 0 {
            let end = duration_frames as f64;
            interpolate_clamped(frame, [end - self.fade_out_frames as f64, end], [1.0, 0.0])
        } else {
            1.0
        };
        fade_in * fade_out * self.volume
    }

    /// Clamps to usable values
    pub fn normalize(&mut self) {
        self.fade_in_frames = self.fade_in_frames.max(0);
        self.fade_out_frames = self.fade_out_frames.max(0);
        self.volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 2.0)
        } else {
            default_volume()
        };
    }
}

// =============================================================================
// Tests
// =============================================================================
