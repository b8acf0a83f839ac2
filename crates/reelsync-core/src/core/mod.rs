//! reelsync Core Engine
//!
//! Tokenizer, page segmenter, duration aggregator and schedule mapper, plus the
//! composition pipeline and configuration that tie them together.

pub mod captions;
pub mod composition;
pub mod fonts;
pub mod schedule;
pub mod settings;
pub mod timeline;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;

pub use composition::{build_schedule, CompositionPreset, FrameState, RenderSchedule};
pub use settings::EngineSettings;
pub use timeline::{CompositionMetadata, Timeline, TimelineDocument};
