//! reelsync Core Library
//!
//! Timeline synchronization and caption segmentation engine.
//! Turns a character-timed transcript plus media and audio cues into word tokens,
//! caption pages and a frame-accurate render schedule.
//!
//! Everything in this crate is a pure transform from an immutable timeline snapshot
//! to an immutable result. The only I/O lives in [`core::settings`] (config files)
//! and [`core::fonts`] (font file probing).

pub mod core;

pub use crate::core::{
    build_schedule, CompositionMetadata, CompositionPreset, CoreError, CoreResult,
    EngineSettings, RenderSchedule, Timeline, TimelineDocument,
};
