//! Cognitive load model - scores, levels, and recommendations.

use crate::extensions::Extensions;
use serde::{Deserialize, Serialize};

/// Externally defined instructional phase, used to select load targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurriculumStage {
    /// First exposure to a topic
    Foundation,
    /// Building on known fundamentals
    Developing,
    /// Consolidating and applying
    Proficient,
    /// Transfer and synthesis
    Advanced,
}

/// Overall load classification, monotonic in the load ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum LoadLevel {
    Low,
    Optimal,
    High,
    Overload,
}

/// Display priority of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum RecommendationPriority {
    High,
    Medium,
    Low,
}

/// One actionable content-design suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Stable identifier, e.g. `reduce-extraneous-load`
    pub id: String,

    /// Human-readable message
    pub message: String,

    /// Display priority
    pub priority: RecommendationPriority,

    /// Suggested concrete action, if one applies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Immutable result of one cognitive-load analysis pass.
///
/// Consumers replace the whole value atomically; no field is ever updated in
/// place, so a reader can never observe components from different passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitiveLoadResult {
    /// Load inherent to the material (concept density), 0-100
    pub intrinsic: u8,

    /// Load from avoidable friction in presentation, 0-100
    pub extraneous: u8,

    /// Load from productive effort, 0-100
    pub germane: u8,

    /// Weighted combination of the three components, 0-100
    pub total: u8,

    /// `total` divided by the stage-specific optimal target
    pub ratio: f64,

    /// Classification of `ratio`
    pub level: LoadLevel,

    /// Suggestions sorted by priority (high first)
    pub recommendations: Vec<Recommendation>,
}

impl CognitiveLoadResult {
    /// Flatten the result into namespaced statement extensions, for carrying
    /// a load snapshot on an `experienced` statement.
    pub fn to_extensions(&self) -> Extensions {
        Extensions::new()
            .with("https://learnpulse.dev/ext/load/intrinsic", self.intrinsic)
            .with("https://learnpulse.dev/ext/load/extraneous", self.extraneous)
            .with("https://learnpulse.dev/ext/load/germane", self.germane)
            .with("https://learnpulse.dev/ext/load/total", self.total)
            .with("https://learnpulse.dev/ext/load/ratio", self.ratio)
            .with(
                "https://learnpulse.dev/ext/load/level",
                serde_json::to_value(self.level).unwrap_or(serde_json::Value::Null),
            )
    }
}
