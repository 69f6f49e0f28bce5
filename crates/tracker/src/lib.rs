//! Learnpulse tracker orchestrator.
//!
//! The one component application code calls. Maps high-level learner actions
//! to learning-event statements, enriches them with cognitive-load and
//! fluency context, and pushes them through the telemetry channel. Owns the
//! per-session snapshot and autosave timers.

#![warn(missing_docs)]

mod params;
mod tracker;

pub use params::{
    AnswerParams, BreakParams, CompletionParams, InteractionParams, MediaEvent, MediaParams,
};
pub use tracker::{
    Tracker, TrackerConfig, ASSESSMENT_ACTIVITY_TYPE, COGNITIVE_LOAD_ACTIVITY_ID,
    COURSE_ACTIVITY_TYPE, MEDIA_ACTIVITY_TYPE,
};
