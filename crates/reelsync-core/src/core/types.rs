//! reelsync Core Type Definitions
//!
//! Defines fundamental time and rate types used throughout the engine.

use serde::{Deserialize, Serialize};
use tracing::warn;

// =============================================================================
// Time Types
// =============================================================================

/// Time in milliseconds on the global timeline (floating point)
pub type TimeMs = f64;

/// Time in frames (integer)
pub type Frame = i64;

/// Default output frame rate
pub const DEFAULT_FPS: i32 = 30;

/// Ratio (for fps)
///
/// Deserializes from `{ "num": 30000, "den": 1001 }` or a plain integer rate (`30`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RatioRepr")]
pub struct Ratio {
    /// Numerator
    pub num: i32,
    /// Denominator
    pub den: i32,
}

impl Ratio {
    /// Creates a new ratio with validation
    pub fn new(num: i32, den: i32) -> Self {
        if den == 0 {
            warn!("Ratio created with zero denominator, defaulting to 1");
            return Self { num, den: 1 };
        }
        Self { num, den }
    }

    /// Creates an integer frame rate (e.g. `Ratio::fps(30)`)
    pub fn fps(num: i32) -> Self {
        Self::new(num, 1)
    }

    /// Converts to floating point value
    pub fn as_f64(&self) -> f64 {
        if self.den == 0 {
            return 0.0;
        }
        self.num as f64 / self.den as f64
    }

    /// Returns true if this ratio can be used as a frame rate
    pub fn is_valid_rate(&self) -> bool {
        self.den != 0 && self.as_f64() > 0.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RatioRepr {
    Whole(i32),
    Fraction { num: i32, den: i32 },
}

impl From<RatioRepr> for Ratio {
    fn from(repr: RatioRepr) -> Self {
        match repr {
            RatioRepr::Whole(num) => Self { num, den: 1 },
            RatioRepr::Fraction { num, den } => Self { num, den },
        }
    }
}

impl Default for Ratio {
    fn default() -> Self {
        Self {
            num: DEFAULT_FPS,
            den: 1,
        } // Default 30fps
    }
}

// =============================================================================
// Unit Conversion
// =============================================================================

/// Converts milliseconds to a fractional frame position
pub fn ms_to_frames_exact(ms: TimeMs, fps: Ratio) -> f64 {
    ms / 1000.0 * fps.as_f64()
}

/// Converts milliseconds to the nearest frame index
pub fn ms_to_frame(ms: TimeMs, fps: Ratio) -> Frame {
    ms_to_frames_exact(ms, fps).round() as Frame
}

/// Converts milliseconds to a frame count, rounding up so no time is cut off
pub fn ms_to_frames_ceil(ms: TimeMs, fps: Ratio) -> Frame {
    ms_to_frames_exact(ms, fps).ceil() as Frame
}

/// Converts a frame index to the playback instant it represents
pub fn frame_to_ms(frame: Frame, fps: Ratio) -> TimeMs {
    let rate = fps.as_f64();
    if rate <= 0.0 {
        return 0.0;
    }
    frame as f64 / rate * 1000.0
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_default_is_30fps() {
        let fps = Ratio::default();
        assert_eq!(fps, Ratio::fps(30));
        assert_eq!(fps.as_f64(), 30.0);
    }

    #[test]
    fn test_ratio_zero_denominator() {
        let r = Ratio::new(24, 0);
        assert_eq!(r.den, 1);
        assert!(r.is_valid_rate());
        assert!(!Ratio { num: 0, den: 1 }.is_valid_rate());
    }

    #[test]
    fn test_ntsc_rate() {
        let ntsc = Ratio::new(30000, 1001);
        assert!((ntsc.as_f64() - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_ratio_deserializes_integer_or_fraction() {
        let whole: Ratio = serde_json::from_str("25").unwrap();
        assert_eq!(whole, Ratio::fps(25));

        let ntsc: Ratio = serde_json::from_str(r#"{"num":30000,"den":1001}"#).unwrap();
        assert_eq!(ntsc, Ratio::new(30000, 1001));

        // Always written back as a fraction
        assert_eq!(serde_json::to_string(&whole).unwrap(), r#"{"num":25,"den":1}"#);
        assert!(serde_json::from_str::<Ratio>(r#""fast""#).is_err());
    }

    #[test]
    fn test_ms_to_frame_rounds() {
        let fps = Ratio::fps(30);
        assert_eq!(ms_to_frame(1000.0, fps), 30);
        assert_eq!(ms_to_frame(1016.0, fps), 30); // 30.48
        assert_eq!(ms_to_frame(1017.0, fps), 31); // 30.51
    }

    #[test]
    fn test_ms_to_frames_ceil() {
        let fps = Ratio::fps(30);
        assert_eq!(ms_to_frames_ceil(5000.0, fps), 150);
        assert_eq!(ms_to_frames_ceil(1001.0, fps), 31);
    }

    #[test]
    fn test_frame_to_ms() {
        let fps = Ratio::fps(30);
        assert_eq!(frame_to_ms(30, fps), 1000.0);
        assert_eq!(frame_to_ms(0, fps), 0.0);
        assert_eq!(frame_to_ms(10, Ratio { num: 0, den: 1 }), 0.0);
    }
}
