//! Latency-to-zone fluency classification.

use learnpulse_core::FluencyZone;

/// Ordered latency thresholds in milliseconds.
///
/// Invariant: `too_fast_below_ms < thinking_from_ms < struggle_from_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FluencyThresholds {
    /// Latencies below this are `TooFast`
    pub too_fast_below_ms: u64,
    /// Latencies at or above this are `Thinking`
    pub thinking_from_ms: u64,
    /// Latencies at or above this are `Struggle`
    pub struggle_from_ms: u64,
}

impl Default for FluencyThresholds {
    fn default() -> Self {
        Self {
            too_fast_below_ms: 1_000,
            thinking_from_ms: 10_000,
            struggle_from_ms: 30_000,
        }
    }
}

/// Map one response latency to a fluency zone.
///
/// Total over all inputs: negative latencies are treated as 0. Monotonic by
/// construction; increasing latency never moves backward through the zone
/// order.
pub fn classify_with(latency_ms: i64, thresholds: &FluencyThresholds) -> FluencyZone {
    let latency = latency_ms.max(0) as u64;
    if latency < thresholds.too_fast_below_ms {
        FluencyZone::TooFast
    } else if latency < thresholds.thinking_from_ms {
        FluencyZone::Fluency
    } else if latency < thresholds.struggle_from_ms {
        FluencyZone::Thinking
    } else {
        FluencyZone::Struggle
    }
}

/// [`classify_with`] using the default thresholds.
pub fn classify(latency_ms: i64) -> FluencyZone {
    classify_with(latency_ms, &FluencyThresholds::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_second_is_too_fast() {
        assert_eq!(classify(400), FluencyZone::TooFast);
    }

    #[test]
    fn five_seconds_is_fluent() {
        assert_eq!(classify(5_000), FluencyZone::Fluency);
    }

    #[test]
    fn forty_five_seconds_is_struggle() {
        assert_eq!(classify(45_000), FluencyZone::Struggle);
    }

    #[test]
    fn negative_latency_is_clamped_to_zero() {
        assert_eq!(classify(-250), FluencyZone::TooFast);
    }

    #[test]
    fn boundaries_belong_to_the_later_zone() {
        assert_eq!(classify(999), FluencyZone::TooFast);
        assert_eq!(classify(1_000), FluencyZone::Fluency);
        assert_eq!(classify(9_999), FluencyZone::Fluency);
        assert_eq!(classify(10_000), FluencyZone::Thinking);
        assert_eq!(classify(29_999), FluencyZone::Thinking);
        assert_eq!(classify(30_000), FluencyZone::Struggle);
    }

    #[test]
    fn classification_is_monotonic() {
        let latencies = [-100, 0, 500, 999, 1_000, 4_000, 9_999, 10_000, 29_000, 30_000, 90_000];
        let zones: Vec<_> = latencies.iter().map(|&l| classify(l)).collect();
        for pair in zones.windows(2) {
            assert!(pair[0] <= pair[1], "{:?} regressed to {:?}", pair[0], pair[1]);
        }
    }
}
