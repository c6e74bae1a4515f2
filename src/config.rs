use serde::Deserialize;

use crate::models::LearningStyle;

/// Relative weights for the four scoring factors. They need not sum to one;
/// the combined score is a ranking signal, not a probability.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub unlock_impact: f64,
    pub style_match: f64,
    pub ease: f64,
    pub success_rate: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            unlock_impact: 1.0,
            style_match: 0.6,
            ease: 0.4,
            success_rate: 1.0,
        }
    }
}

/// One compatible learning-style pairing and its partial-match value.
/// Lookups are symmetric; an exact style match always scores 1.0.
#[derive(Debug, Clone, Deserialize)]
pub struct StyleAffinity {
    pub first: LearningStyle,
    pub second: LearningStyle,
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub weights: ScoreWeights,
    pub style_affinities: Vec<StyleAffinity>,
    /// Upper bound of the difficulty rating scale.
    pub difficulty_scale: f64,
    /// Mean term difficulty below this is Low risk.
    pub low_difficulty_below: f64,
    /// Mean term difficulty below this is Medium risk; High at or above.
    pub medium_difficulty_below: f64,
    /// Typical credit weight of one course slot.
    pub credits_per_slot: u32,
    /// Hard per-term credit cap, regardless of slot count.
    pub max_term_credits: u32,
    /// Every this many weekly work hours removes one course slot.
    pub work_hours_per_slot_reduction: u32,
    /// Slot cap applied to Summer terms.
    pub summer_slot_cap: u32,
    /// Consecutive High-difficulty terms needed to flag a cluster.
    pub difficulty_cluster_run: usize,
    /// Style-match sub-scores under this count as mismatched.
    pub style_mismatch_threshold: f64,
    /// Prerequisite chains deeper than this are flagged as bottlenecks.
    pub bottleneck_depth: usize,
    /// Maximum courses returned by next-term recommendations.
    pub recommendation_limit: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            weights: ScoreWeights::default(),
            style_affinities: vec![
                StyleAffinity {
                    first: LearningStyle::Visual,
                    second: LearningStyle::Kinesthetic,
                    value: 0.5,
                },
                StyleAffinity {
                    first: LearningStyle::Auditory,
                    second: LearningStyle::ReadingWriting,
                    value: 0.5,
                },
            ],
            difficulty_scale: 5.0,
            low_difficulty_below: 2.0,
            medium_difficulty_below: 3.5,
            credits_per_slot: 4,
            max_term_credits: 18,
            work_hours_per_slot_reduction: 20,
            summer_slot_cap: 2,
            difficulty_cluster_run: 2,
            style_mismatch_threshold: 0.5,
            bottleneck_depth: 3,
            recommendation_limit: 5,
        }
    }
}

impl PlannerConfig {
    /// Match value for a student/course style pairing.
    pub fn style_affinity(&self, student: LearningStyle, course: LearningStyle) -> f64 {
        if student == course {
            return 1.0;
        }
        self.style_affinities
            .iter()
            .find(|a| {
                (a.first == student && a.second == course)
                    || (a.first == course && a.second == student)
            })
            .map(|a| a.value)
            .unwrap_or(0.0)
    }

    /// Course slots available in one term after the work-hour reduction.
    /// Never drops below one slot.
    pub fn slot_ceiling(&self, preferred_load: u32, work_hours_per_week: u32) -> u32 {
        let reduction = work_hours_per_week / self.work_hours_per_slot_reduction.max(1);
        preferred_load.saturating_sub(reduction).max(1)
    }
}
