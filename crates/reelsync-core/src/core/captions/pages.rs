//! Page Segmenter
//!
//! Groups a flat token sequence into caption pages. A new page starts whenever
//! the silence between two adjacent tokens exceeds the gap threshold.

use super::{CaptionPage, WordToken};
use crate::core::TimeMs;

/// Gap threshold that reveals captions one word at a time
pub const WORD_BY_WORD_GAP_MS: TimeMs = 1.0;

/// Gap threshold that reveals captions as short phrases
pub const PHRASE_GAP_MS: TimeMs = 1200.0;

/// Splits `tokens` into pages
///
/// Every token lands on exactly one page, in order. Tokens on the same page are
/// separated by at most `gap_threshold_ms`; a larger gap always starts a new page.
/// Zero tokens yield zero pages.
pub fn create_pages(tokens: &[WordToken], gap_threshold_ms: TimeMs) -> Vec<CaptionPage> {
    let mut pages: Vec<CaptionPage> = Vec::new();

    for token in tokens {
        let starts_new_page = match pages.last().and_then(CaptionPage::last_token) {
            Some(prev) => token.start_ms - prev.end_ms > gap_threshold_ms,
            None => true,
        };
        if starts_new_page {
            pages.push(CaptionPage::starting_with(token.clone()));
        } else if let Some(page) = pages.last_mut() {
            page.tokens.push(token.clone());
        }
    }

    pages
}

// =============================================================================
// Tests
// =============================================================================
