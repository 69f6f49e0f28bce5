//! Learnpulse content analysis.
//!
//! Pure computation over core types: metric extraction from authored
//! content, cognitive load estimation, and response-fluency classification.
//! Nothing here performs I/O or fails; all functions are total over their
//! input domains.

#![warn(missing_docs)]

mod estimator;
mod extractor;
mod fluency;

pub use estimator::{EstimatorConfig, LoadEstimator, DISPLAY_RECOMMENDATION_CAP};
pub use extractor::{
    extract, ContentBlock, ContentDescription, INTERACTIVE_KINDS, MINUTES_PER_INTERACTION,
    READING_RATE_WPM,
};
pub use fluency::{classify, classify_with, FluencyThresholds};
