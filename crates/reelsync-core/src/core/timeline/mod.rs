//! Timeline Module
//!
//! Input timeline models and the duration aggregator.

mod duration;
mod models;

pub use duration::{
    calculate_metadata, total_duration_ms, CompositionMetadata, DurationPolicy, EndScan,
    DEFAULT_MINIMUM_DURATION_MS, DEFAULT_TAIL_BUFFER_MS,
};
pub use models::{
    AudioClip, CaptionLine, ElementAnimation, EntityKind, MediaElement, MediaSource, TimeSpan,
    Timeline, TimelineDocument, TimelineEntity,
};
