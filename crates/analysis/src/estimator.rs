//! Cognitive load estimation.
//!
//! Scores a piece of content on the three classic load components
//! (intrinsic, extraneous, germane), combines them into a stage-relative
//! total, and derives ranked content-design recommendations. Every weight,
//! target, and boundary is a named field of [`EstimatorConfig`] so deployments
//! can tune them without code changes.

use learnpulse_core::{
    CognitiveLoadResult, ContentMetrics, CurriculumStage, LoadLevel, Recommendation,
    RecommendationPriority,
};

/// How many recommendations UIs are expected to show. The estimator always
/// returns the full list; this is the advisory display cap.
pub const DISPLAY_RECOMMENDATION_CAP: usize = 3;

/// Tunable constants of the load model.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    /// Weight of the intrinsic component in the total (weights sum to 1)
    pub intrinsic_weight: f64,
    /// Weight of the extraneous component in the total
    pub extraneous_weight: f64,
    /// Weight of the germane component in the total
    pub germane_weight: f64,

    /// Words contributing one intrinsic point
    pub words_per_intrinsic_point: f64,
    /// Intrinsic points per content block (distinct-concept proxy)
    pub intrinsic_points_per_block: f64,

    /// Expected interactions per 100 words; density above this is friction
    pub expected_interactions_per_100_words: f64,
    /// Extraneous points per interaction per 100 words above the expectation
    pub extraneous_points_per_excess: f64,

    /// Germane points per unit of interaction share (interactions / blocks)
    pub germane_points_per_share: f64,

    /// Optimal total load per curriculum stage
    pub optimal_foundation: f64,
    /// Optimal total for the developing stage
    pub optimal_developing: f64,
    /// Optimal total for the proficient stage
    pub optimal_proficient: f64,
    /// Optimal total for the advanced stage
    pub optimal_advanced: f64,

    /// Ratio below which the level is `Low`
    pub low_below: f64,
    /// Ratio above which the level is `High`
    pub high_above: f64,
    /// Ratio above which the level is `Overload`
    pub overload_above: f64,

    /// Target extraneous score; scores within the band raise no flag
    pub extraneous_target: f64,
    /// Half-width of the acceptable extraneous band
    pub extraneous_deviation: f64,

    /// Intrinsic score below which content is flagged as under-challenging
    pub under_challenge_below: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            intrinsic_weight: 0.5,
            extraneous_weight: 0.3,
            germane_weight: 0.2,

            words_per_intrinsic_point: 15.0,
            intrinsic_points_per_block: 3.0,

            expected_interactions_per_100_words: 5.0,
            extraneous_points_per_excess: 2.5,

            germane_points_per_share: 60.0,

            optimal_foundation: 45.0,
            optimal_developing: 55.0,
            optimal_proficient: 65.0,
            optimal_advanced: 75.0,

            low_below: 0.7,
            high_above: 1.15,
            overload_above: 1.6,

            extraneous_target: 25.0,
            extraneous_deviation: 15.0,

            under_challenge_below: 15.0,
        }
    }
}

impl EstimatorConfig {
    /// Optimal total load for a curriculum stage.
    pub fn optimal_for(&self, stage: CurriculumStage) -> f64 {
        match stage {
            CurriculumStage::Foundation => self.optimal_foundation,
            CurriculumStage::Developing => self.optimal_developing,
            CurriculumStage::Proficient => self.optimal_proficient,
            CurriculumStage::Advanced => self.optimal_advanced,
        }
    }
}

/// Cognitive load estimator.
#[derive(Debug, Clone, Default)]
pub struct LoadEstimator {
    config: EstimatorConfig,
}

impl LoadEstimator {
    /// Estimator with the default model constants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Estimator with custom constants.
    pub fn with_config(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Score content metrics against a curriculum stage.
    ///
    /// Total function: never fails, out-of-range intermediate values are
    /// clipped into [0, 100].
    pub fn estimate(&self, metrics: &ContentMetrics, stage: CurriculumStage) -> CognitiveLoadResult {
        let cfg = &self.config;
        let words = f64::from(metrics.word_count);
        let blocks = f64::from(metrics.block_count);
        let interactions = f64::from(metrics.interaction_count);

        // Intrinsic: concept density from text volume and block count.
        let intrinsic = clip(
            words / cfg.words_per_intrinsic_point + blocks * cfg.intrinsic_points_per_block,
        );

        // Extraneous: interactions in excess of what the text length warrants.
        let density_per_100 = interactions / words.max(1.0) * 100.0;
        let excess = (density_per_100 - cfg.expected_interactions_per_100_words).max(0.0);
        let extraneous = clip(excess * cfg.extraneous_points_per_excess);

        // Germane: share of blocks that ask for productive effort.
        let share = interactions / blocks.max(1.0);
        let germane = clip(share * cfg.germane_points_per_share);

        let total = clip(
            intrinsic * cfg.intrinsic_weight
                + extraneous * cfg.extraneous_weight
                + germane * cfg.germane_weight,
        );

        let ratio = total / cfg.optimal_for(stage);
        let level = self.level_for(ratio);

        let mut recommendations =
            self.recommend(intrinsic, extraneous, germane, level, metrics);
        recommendations.sort_by_key(|r| r.priority);

        CognitiveLoadResult {
            intrinsic: intrinsic.round() as u8,
            extraneous: extraneous.round() as u8,
            germane: germane.round() as u8,
            total: total.round() as u8,
            ratio,
            level,
            recommendations,
        }
    }

    fn level_for(&self, ratio: f64) -> LoadLevel {
        let cfg = &self.config;
        if ratio < cfg.low_below {
            LoadLevel::Low
        } else if ratio <= cfg.high_above {
            LoadLevel::Optimal
        } else if ratio <= cfg.overload_above {
            LoadLevel::High
        } else {
            LoadLevel::Overload
        }
    }

    fn recommend(
        &self,
        intrinsic: f64,
        extraneous: f64,
        germane: f64,
        level: LoadLevel,
        metrics: &ContentMetrics,
    ) -> Vec<Recommendation> {
        let cfg = &self.config;
        let mut out = Vec::new();

        if extraneous > cfg.extraneous_target + cfg.extraneous_deviation {
            // Name the likely cause so authors know where to cut.
            let cause = if metrics.interaction_count > metrics.word_count / 25 {
                "too many interactive blocks for the amount of text"
            } else {
                "too little explanatory text around the interactions"
            };
            out.push(Recommendation {
                id: "reduce-extraneous-load".to_string(),
                message: format!("Extraneous load is elevated: {cause}"),
                priority: RecommendationPriority::High,
                action: Some("Remove or consolidate interactive blocks".to_string()),
            });
        }

        if level == LoadLevel::Overload {
            out.push(Recommendation {
                id: "split-content".to_string(),
                message: "Total load exceeds the overload boundary for this stage".to_string(),
                priority: RecommendationPriority::High,
                action: Some("Split the unit into smaller lessons".to_string()),
            });
        }

        if germane < 10.0 && intrinsic > 50.0 {
            out.push(Recommendation {
                id: "add-practice".to_string(),
                message: "Dense content with little productive effort; learners may read passively"
                    .to_string(),
                priority: RecommendationPriority::Medium,
                action: Some("Add retrieval-practice blocks".to_string()),
            });
        }

        if intrinsic < cfg.under_challenge_below {
            out.push(Recommendation {
                id: "under-challenging".to_string(),
                message: "Content may be under-challenging for this stage".to_string(),
                priority: RecommendationPriority::Low,
                action: None,
            });
        }

        out
    }
}

fn clip(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(words: u32, interactions: u32, blocks: u32) -> ContentMetrics {
        ContentMetrics {
            word_count: words,
            interaction_count: interactions,
            block_count: blocks,
            estimated_duration_min: 0.0,
        }
    }

    #[test]
    fn default_weights_sum_to_one() {
        let cfg = EstimatorConfig::default();
        let sum = cfg.intrinsic_weight + cfg.extraneous_weight + cfg.germane_weight;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn scores_stay_in_range_for_extreme_inputs() {
        let estimator = LoadEstimator::new();
        for m in [
            metrics(0, 0, 0),
            metrics(u32::MAX, 0, 0),
            metrics(0, u32::MAX, u32::MAX),
            metrics(1, 10_000, 1),
        ] {
            let result = estimator.estimate(&m, CurriculumStage::Foundation);
            assert!(result.intrinsic <= 100);
            assert!(result.extraneous <= 100);
            assert!(result.germane <= 100);
            assert!(result.total <= 100);
            assert!(result.ratio >= 0.0);
        }
    }

    #[test]
    fn sparse_text_only_content_reads_as_low() {
        let estimator = LoadEstimator::new();
        let result = estimator.estimate(&metrics(50, 0, 1), CurriculumStage::Foundation);

        assert!(result.intrinsic < 20, "intrinsic was {}", result.intrinsic);
        assert!(result.extraneous <= 5, "extraneous was {}", result.extraneous);
        assert_eq!(result.level, LoadLevel::Low);
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.id == "under-challenging"));
    }

    #[test]
    fn interaction_heavy_content_reads_as_high() {
        let estimator = LoadEstimator::new();
        let result = estimator.estimate(&metrics(50, 20, 20), CurriculumStage::Foundation);

        assert!(result.extraneous > 60, "extraneous was {}", result.extraneous);
        assert!(
            matches!(result.level, LoadLevel::High | LoadLevel::Overload),
            "level was {:?}",
            result.level
        );
        let rec = result
            .recommendations
            .iter()
            .find(|r| r.id == "reduce-extraneous-load")
            .expect("expected an extraneous-load recommendation");
        assert_eq!(rec.priority, RecommendationPriority::High);
        assert!(rec.message.contains("interactive blocks"));
    }

    #[test]
    fn recommendations_are_sorted_high_first() {
        let estimator = LoadEstimator::new();
        let result = estimator.estimate(&metrics(50, 20, 20), CurriculumStage::Foundation);
        let priorities: Vec<_> = result.recommendations.iter().map(|r| r.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
    }

    #[test]
    fn later_stages_tolerate_more_load() {
        let estimator = LoadEstimator::new();
        let m = metrics(800, 4, 10);
        let foundation = estimator.estimate(&m, CurriculumStage::Foundation);
        let advanced = estimator.estimate(&m, CurriculumStage::Advanced);
        assert!(foundation.ratio > advanced.ratio);
    }

    #[test]
    fn level_boundaries_follow_the_configured_ratios() {
        let estimator = LoadEstimator::new();
        assert_eq!(estimator.level_for(0.69), LoadLevel::Low);
        assert_eq!(estimator.level_for(0.7), LoadLevel::Optimal);
        assert_eq!(estimator.level_for(1.15), LoadLevel::Optimal);
        assert_eq!(estimator.level_for(1.16), LoadLevel::High);
        assert_eq!(estimator.level_for(1.6), LoadLevel::High);
        assert_eq!(estimator.level_for(1.61), LoadLevel::Overload);
    }

    #[test]
    fn custom_config_shifts_the_level() {
        let estimator = LoadEstimator::with_config(EstimatorConfig {
            optimal_foundation: 2.0,
            ..Default::default()
        });
        let result = estimator.estimate(&metrics(50, 0, 1), CurriculumStage::Foundation);
        assert_ne!(result.level, LoadLevel::Low);
    }
}
