//! Word Tokenizer
//!
//! Turns per-character timestamps into word-level tokens.
//!
//! Spaces are never merged into words: every space becomes its own one-character
//! token so the gap between two words keeps its original timing.
//!
//! ```text
//! characters:  h   i   ␠   t   h   e   r   e
//! tokens:     [ hi  ] [␠] [    there        ]
//! ```

use tracing::warn;

use super::{CharacterTrack, WordToken};
use crate::core::timeline::CaptionLine;
use crate::core::{CoreResult, TimeMs};

/// Tokenizes one character track anchored at `line_start_ms`
///
/// Fails only when the parallel timestamp arrays do not line up.
pub fn tokenize_track(track: &CharacterTrack, line_start_ms: TimeMs) -> CoreResult<Vec<WordToken>> {
    track.validate()?;

    let starts = &track.character_start_times_seconds;
    let ends = &track.character_end_times_seconds;
    let to_ms = |seconds: f64| seconds * 1000.0 + line_start_ms;

    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut word_start = 0;

    for (i, ch) in track.characters.iter().enumerate() {
        if ch == " " {
            if !word.is_empty() {
                // word is non-empty, so i >= 1
                tokens.push(WordToken::new(
                    std::mem::take(&mut word),
                    to_ms(starts[word_start]),
                    to_ms(ends[i - 1]),
                ));
            }
            tokens.push(WordToken::new(" ", to_ms(starts[i]), to_ms(ends[i])));
        } else {
            if word.is_empty() {
                word_start = i;
            }
            word.push_str(ch);
        }
    }

    if !word.is_empty() {
        if let Some(&last_end) = ends.last() {
            tokens.push(WordToken::new(word, to_ms(starts[word_start]), to_ms(last_end)));
        }
    }

    Ok(tokens)
}

/// Tokenizes a caption line; a line without timestamps has no tokens
pub fn tokenize_line(line: &CaptionLine) -> CoreResult<Vec<WordToken>> {
    match &line.timestamps {
        Some(track) => tokenize_track(track, line.start_ms),
        None => Ok(Vec::new()),
    }
}

/// Tokenizes every line in order into one flat token sequence
///
/// A malformed line is logged and skipped; the remaining lines still produce tokens.
pub fn tokenize_lines(lines: &[CaptionLine]) -> Vec<WordToken> {
    let mut tokens = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        match tokenize_line(line) {
            Ok(line_tokens) => tokens.extend(line_tokens),
            Err(e) => warn!("Skipping caption line {}: {}", index, e),
        }
    }
    tokens
}

// =============================================================================
// Tests
// =============================================================================
