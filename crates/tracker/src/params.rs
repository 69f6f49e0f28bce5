//! Parameter bundles for tracker calls.

use serde::{Deserialize, Serialize};

/// An assessment answer and its timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerParams {
    /// Block the question belongs to
    pub block_id: String,

    /// Block display name
    pub block_name: String,

    /// Interaction kind, e.g. `choice`, `fill-in`
    pub interaction_type: String,

    /// Learner response, verbatim
    pub response: String,

    /// Whether the response was correct
    pub correct: bool,

    /// Time from prompt to answer, in milliseconds
    pub duration_ms: u64,

    /// Scaled score in [0, 1], if graded
    pub score: Option<f64>,

    /// 1-based attempt number, if tracked
    pub attempt: Option<u32>,
}

/// Completion of a content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionParams {
    /// Completed block
    pub block_id: String,

    /// Block display name
    pub block_name: String,

    /// Scaled score in [0, 1], if graded
    pub score: Option<f64>,

    /// Whether completion counts as success
    pub success: Option<bool>,
}

/// A free-form learner interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionParams {
    /// Interaction target
    pub target_id: String,

    /// Target display name
    pub target_name: String,

    /// Interaction kind, e.g. `click`, `hover`, `expand`
    pub interaction_type: String,
}

/// What happened to the media element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum MediaEvent {
    Played,
    Paused,
    Completed,
}

/// A media playback event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaParams {
    /// Media element id
    pub media_id: String,

    /// Media display name
    pub media_name: String,

    /// What happened
    pub event: MediaEvent,

    /// Playhead position in seconds
    pub current_time_s: f64,

    /// Total media duration in seconds, if known
    pub duration_s: Option<f64>,
}

/// Outcome of a suggested break.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakParams {
    /// Whether the learner accepted the suggestion
    pub accepted: bool,

    /// Estimated fatigue level, 0-100
    pub fatigue_level: u8,

    /// Suggested break length in minutes
    pub suggested_minutes: u32,
}
