//! Caption Data Models
//!
//! Defines the character-timed transcript block, word tokens and caption pages.
//!
//! # Overview
//!
//! Caption data moves through three shapes:
//! - [`CharacterTrack`]: one entry per character, with start/end times in seconds
//!   relative to the owning caption line
//! - [`WordToken`]: a word (or a single space) with absolute millisecond timing
//! - [`CaptionPage`]: a contiguous run of tokens shown together on screen

use serde::{Deserialize, Serialize};

use crate::core::{CoreError, CoreResult, TimeMs};

// =============================================================================
// Character Track
// =============================================================================

/// Per-character timestamps for one caption line
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterTrack {
    /// Characters in display order (each entry is one character)
    #[serde(default)]
    pub characters: Vec<String>,
    /// Start time of each character, seconds from the line start
    #[serde(default)]
    pub character_start_times_seconds: Vec<f64>,
    /// End time of each character, seconds from the line start
    #[serde(default)]
    pub character_end_times_seconds: Vec<f64>,
}

impl CharacterTrack {
    /// Creates a track from parallel arrays
    pub fn new(characters: Vec<String>, starts: Vec<f64>, ends: Vec<f64>) -> Self {
        Self {
            characters,
            character_start_times_seconds: starts,
            character_end_times_seconds: ends,
        }
    }

    /// Creates a track by splitting `text` into characters
    pub fn from_text(text: &str, starts: Vec<f64>, ends: Vec<f64>) -> Self {
        Self::new(text.chars().map(String::from).collect(), starts, ends)
    }

    /// Returns the number of characters
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    /// Returns true if the track has no characters
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Checks that the three arrays line up
    pub fn validate(&self) -> CoreResult<()> {
        let characters = self.characters.len();
        let starts = self.character_start_times_seconds.len();
        let ends = self.character_end_times_seconds.len();
        if starts != characters || ends != characters {
            return Err(CoreError::TimestampLengthMismatch {
                characters,
                starts,
                ends,
            });
        }
        Ok(())
    }

    /// End time of the final character, seconds from the line start
    pub fn last_end_seconds(&self) -> Option<f64> {
        self.character_end_times_seconds.last().copied()
    }

    /// Reassembles the character sequence into a string
    pub fn text(&self) -> String {
        self.characters.concat()
    }
}

// =============================================================================
// Word Token
// =============================================================================

/// A word or single-space unit with absolute timing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordToken {
    pub text: String,
    /// Start time on the global timeline
    pub start_ms: TimeMs,
    /// End time on the global timeline
    pub end_ms: TimeMs,
    /// Always 1.0; no uncertainty modeling
    pub confidence: f64,
    /// Same as `start_ms`
    pub timestamp_ms: TimeMs,
}

impl WordToken {
    /// Creates a token with full confidence
    pub fn new(text: impl Into<String>, start_ms: TimeMs, end_ms: TimeMs) -> Self {
        Self {
            text: text.into(),
            start_ms,
            end_ms,
            confidence: 1.0,
            timestamp_ms: start_ms,
        }
    }

    /// Returns the duration of this token in milliseconds
    pub fn duration_ms(&self) -> TimeMs {
        self.end_ms - self.start_ms
    }

    /// Returns true if this token is the one being spoken at `time_ms`
    pub fn is_active_at(&self, time_ms: TimeMs) -> bool {
        self.start_ms <= time_ms && time_ms < self.end_ms
    }

    /// Returns true for the single-space separator tokens
    pub fn is_space(&self) -> bool {
        self.text == " "
    }
}

// =============================================================================
// Caption Page
// =============================================================================

/// A run of tokens displayed together as one caption screen
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionPage {
    /// Start of the first token
    pub start_ms: TimeMs,
    pub tokens: Vec<WordToken>,
}

impl CaptionPage {
    /// Opens a page with its first token
    pub fn starting_with(token: WordToken) -> Self {
        Self {
            start_ms: token.start_ms,
            tokens: vec![token],
        }
    }

    /// Page text; space tokens already carry their own whitespace
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Returns the last token on the page
    pub fn last_token(&self) -> Option<&WordToken> {
        self.tokens.last()
    }

    /// End of the last token's speech
    pub fn spoken_end_ms(&self) -> TimeMs {
        self.last_token().map(|t| t.end_ms).unwrap_or(self.start_ms)
    }

    /// Display end: the next page's start, or the last token's end plus padding
    pub fn implicit_end_ms(&self, next: Option<&CaptionPage>, tail_padding_ms: TimeMs) -> TimeMs {
        match next {
            Some(next) => next.start_ms,
            None => self.spoken_end_ms() + tail_padding_ms,
        }
    }

    /// Returns the token being spoken at `time_ms`, if any
    pub fn active_token_at(&self, time_ms: TimeMs) -> Option<&WordToken> {
        self.tokens.iter().find(|t| t.is_active_at(time_ms))
    }

    /// Active/inactive flag for every token at `time_ms`
    pub fn token_states_at(&self, time_ms: TimeMs) -> Vec<bool> {
        self.tokens.iter().map(|t| t.is_active_at(time_ms)).collect()
    }

    /// Returns the number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the page has no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
