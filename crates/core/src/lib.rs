//! Learnpulse core data models.
//!
//! This crate defines the fundamental data structures of the learner
//! cognitive-telemetry pipeline: learning-event statements, content metrics,
//! cognitive-load results, fluency zones, and resumable session state.

#![warn(missing_docs)]

// Core identities
mod id;

// Event stream
mod builder;
mod extensions;
mod statement;

// Analysis results
mod fluency;
mod load;
mod metrics;

// Resume state
mod session;

// Re-exports
pub use id::*;

pub use builder::{BuildError, StatementBuilder};
pub use extensions::Extensions;
pub use statement::{Activity, Actor, Statement, StatementContext, StatementResult, Verb};

pub use fluency::FluencyZone;
pub use load::{
    CognitiveLoadResult, CurriculumStage, LoadLevel, Recommendation, RecommendationPriority,
};
pub use metrics::ContentMetrics;

pub use session::SessionState;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
