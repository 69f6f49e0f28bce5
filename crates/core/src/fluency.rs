//! Fluency zones - discrete response-speed classification.

use serde::{Deserialize, Serialize};

/// How quickly a learner responded, as a proxy for engagement/difficulty.
///
/// Zones are ordered: `TooFast < Fluency < Thinking < Struggle`. The derived
/// `Ord` follows variant order, which classification relies on for its
/// monotonicity guarantee.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FluencyZone {
    /// Answered faster than plausible deliberate reading
    TooFast,
    /// Prompt, confident response
    Fluency,
    /// Deliberate consideration
    Thinking,
    /// Prolonged hesitation
    Struggle,
}

impl FluencyZone {
    /// Short token used in statement extensions.
    pub fn as_str(&self) -> &'static str {
        match self {
            FluencyZone::TooFast => "too_fast",
            FluencyZone::Fluency => "fluency",
            FluencyZone::Thinking => "thinking",
            FluencyZone::Struggle => "struggle",
        }
    }
}

impl std::fmt::Display for FluencyZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
