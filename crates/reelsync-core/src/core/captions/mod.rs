//! Caption System Module
//!
//! Provides the caption side of the engine:
//! - Caption data models (CharacterTrack, WordToken, CaptionPage)
//! - Word tokenization from per-character timestamps
//! - Page segmentation by inter-token gap
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Caption System                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  models.rs     - Data structures (CharacterTrack, Token, Page)  │
//! │  tokenizer.rs  - Characters -> word tokens                      │
//! │  pages.rs      - Word tokens -> caption pages                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use reelsync_core::core::captions::{create_pages, tokenize_lines, PHRASE_GAP_MS};
//!
//! let tokens = tokenize_lines(&timeline.text);
//! let pages = create_pages(&tokens, PHRASE_GAP_MS);
//! for page in &pages {
//!     println!("{} @ {}ms", page.text(), page.start_ms);
//! }
//! ```

mod models;
mod pages;
mod tokenizer;

// Re-export models
pub use models::{CaptionPage, CharacterTrack, WordToken};

// Re-export pipeline functions
pub use pages::{create_pages, PHRASE_GAP_MS, WORD_BY_WORD_GAP_MS};
pub use tokenizer::{tokenize_line, tokenize_lines, tokenize_track};
