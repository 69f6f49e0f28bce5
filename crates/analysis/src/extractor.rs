//! Metric extraction from loosely structured content descriptions.

use learnpulse_core::ContentMetrics;
use serde::{Deserialize, Serialize};

/// Assumed reading rate for the duration estimate, words per minute.
pub const READING_RATE_WPM: f64 = 200.0;

/// Time allowance per interactive block, in minutes.
pub const MINUTES_PER_INTERACTION: f64 = 0.5;

/// Block kinds counted as interactive.
pub const INTERACTIVE_KINDS: &[&str] = &[
    "quiz",
    "drag_and_drop",
    "hotspot",
    "flashcard",
    "matching",
];

/// One typed block of authored content.
///
/// Fields default when absent; authoring output is loosely structured and
/// extraction must not fail on missing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContentBlock {
    /// Declared block kind, e.g. `text`, `quiz`, `image`
    #[serde(default)]
    pub kind: String,

    /// Display name, if the author gave one
    #[serde(default)]
    pub name: Option<String>,
}

impl ContentBlock {
    /// Create a block of the given kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: None,
        }
    }

    /// Whether this block counts as interactive.
    pub fn is_interactive(&self) -> bool {
        let kind = self.kind.to_ascii_lowercase();
        INTERACTIVE_KINDS.contains(&kind.as_str())
    }
}

/// Loosely structured description of one piece of learning content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContentDescription {
    /// Free text of the content
    #[serde(default)]
    pub text: Option<String>,

    /// Ordered content blocks
    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
}

/// Derive normalized metrics from a content description.
///
/// Pure and total: absent text yields a word count of 0, absent blocks yield
/// block and interaction counts of 0.
pub fn extract(content: &ContentDescription) -> ContentMetrics {
    let word_count = content
        .text
        .as_deref()
        .map(|t| t.trim().split_whitespace().count() as u32)
        .unwrap_or(0);

    let block_count = content.blocks.len() as u32;
    let interaction_count = content
        .blocks
        .iter()
        .filter(|b| b.is_interactive())
        .count() as u32;

    let estimated_duration_min = f64::from(word_count) / READING_RATE_WPM
        + f64::from(interaction_count) * MINUTES_PER_INTERACTION;

    ContentMetrics {
        word_count,
        interaction_count,
        block_count,
        estimated_duration_min,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_yields_zero_metrics() {
        let metrics = extract(&ContentDescription::default());
        assert_eq!(metrics.word_count, 0);
        assert_eq!(metrics.interaction_count, 0);
        assert_eq!(metrics.block_count, 0);
        assert_eq!(metrics.estimated_duration_min, 0.0);
    }

    #[test]
    fn word_count_splits_on_whitespace_after_trim() {
        let content = ContentDescription {
            text: Some("  one two\tthree\nfour  ".to_string()),
            blocks: Vec::new(),
        };
        assert_eq!(extract(&content).word_count, 4);
    }

    #[test]
    fn interaction_count_matches_interactive_kinds_only() {
        let content = ContentDescription {
            text: None,
            blocks: vec![
                ContentBlock::new("text"),
                ContentBlock::new("quiz"),
                ContentBlock::new("Hotspot"),
                ContentBlock::new("image"),
            ],
        };
        let metrics = extract(&content);
        assert_eq!(metrics.block_count, 4);
        assert_eq!(metrics.interaction_count, 2);
    }

    #[test]
    fn duration_combines_reading_and_interaction_time() {
        let content = ContentDescription {
            text: Some("word ".repeat(400).trim().to_string()),
            blocks: vec![ContentBlock::new("quiz"), ContentBlock::new("quiz")],
        };
        let metrics = extract(&content);
        // 400 words at 200 wpm = 2 min, plus 2 interactions at 0.5 min
        assert!((metrics.estimated_duration_min - 3.0).abs() < 1e-9);
    }
}
