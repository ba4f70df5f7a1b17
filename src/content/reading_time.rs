//! Reading-time estimate for post content

use serde::Serialize;

use super::RawContentBlock;

/// Reading speed used for the estimate
pub const WORDS_PER_MINUTE: usize = 200;

/// Word count and estimated reading minutes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadingTime {
    pub words: usize,
    pub minutes: usize,
}

impl ReadingTime {
    pub fn from_words(words: usize) -> Self {
        Self {
            words,
            minutes: words.div_ceil(WORDS_PER_MINUTE),
        }
    }
}

/// Whitespace-delimited word count
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Estimate reading time. Each block contributes the words of its heading
/// plus the words of every body fragment.
pub fn estimate(blocks: &[RawContentBlock]) -> ReadingTime {
    let words = blocks
        .iter()
        .map(|block| {
            let heading = block
                .heading
                .as_ref()
                .map(|h| count_words(&h.as_text()))
                .unwrap_or(0);
            let body: usize = block
                .body
                .blocks()
                .iter()
                .map(|fragment| count_words(&fragment.text))
                .sum();
            heading + body
        })
        .sum();

    ReadingTime::from_words(words)
}
