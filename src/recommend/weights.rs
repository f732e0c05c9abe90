use serde::{Deserialize, Serialize};

/// Every constant the recommendation score depends on. Defaults are the
/// documented ranking behaviour; override through config to pin tests or
/// experiment without touching the algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub activity: f64,
    pub preference: f64,
    pub similarity: f64,
    pub intrinsic: f64,
    pub activity_factors: ActivityWeights,
    pub similarity_factors: SimilarityWeights,
    pub intrinsic_factors: IntrinsicWeights,
    pub thresholds: RationaleThresholds,
    pub task: TaskWeights,
    /// Interaction count at which the data-volume half of confidence saturates.
    pub confidence_interaction_ceiling: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            activity: 0.4,
            preference: 0.3,
            similarity: 0.2,
            intrinsic: 0.1,
            activity_factors: ActivityWeights::default(),
            similarity_factors: SimilarityWeights::default(),
            intrinsic_factors: IntrinsicWeights::default(),
            thresholds: RationaleThresholds::default(),
            task: TaskWeights::default(),
            confidence_interaction_ceiling: 50.0,
        }
    }
}

impl ScoringWeights {
    pub fn top_level_sum(&self) -> f64 {
        self.activity + self.preference + self.similarity + self.intrinsic
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityWeights {
    pub direct_views: f64,
    pub searches: f64,
    pub favorite: f64,
    pub comparisons: f64,
    pub similar_views: f64,
}

impl Default for ActivityWeights {
    fn default() -> Self {
        Self {
            direct_views: 0.3,
            searches: 0.2,
            favorite: 0.3,
            comparisons: 0.1,
            similar_views: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityWeights {
    pub provider: f64,
    pub category: f64,
    pub parameters: f64,
    pub capabilities: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            provider: 0.3,
            category: 0.3,
            parameters: 0.2,
            capabilities: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntrinsicWeights {
    pub parameters: f64,
    pub context_window: f64,
    pub recency: f64,
    pub capability_density: f64,
}

impl Default for IntrinsicWeights {
    fn default() -> Self {
        Self {
            parameters: 0.3,
            context_window: 0.25,
            recency: 0.25,
            capability_density: 0.2,
        }
    }
}

/// Sub-score levels at which a rationale string is emitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RationaleThresholds {
    pub direct_views: f64,
    pub preference: f64,
    pub intrinsic: f64,
    pub similarity: f64,
}

impl Default for RationaleThresholds {
    fn default() -> Self {
        Self {
            direct_views: 0.5,
            preference: 0.75,
            intrinsic: 0.6,
            similarity: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskWeights {
    pub capabilities: f64,
    pub category: f64,
    pub bonus_cap: f64,
}

impl Default for TaskWeights {
    fn default() -> Self {
        Self {
            capabilities: 0.6,
            category: 0.4,
            bonus_cap: 0.2,
        }
    }
}
