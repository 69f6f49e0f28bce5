//! Content metrics derived from one analysis pass.

use serde::{Deserialize, Serialize};

/// Normalized metrics for one piece of learning content.
///
/// Created fresh each time the content changes and never mutated; a new
/// analysis pass supersedes the previous record wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ContentMetrics {
    /// Number of whitespace-separated words in the content text
    pub word_count: u32,

    /// Number of interactive blocks (quiz, drag-and-drop, hotspot, ...)
    pub interaction_count: u32,

    /// Total number of content blocks
    pub block_count: u32,

    /// Estimated time to work through the content, in minutes
    pub estimated_duration_min: f64,
}
