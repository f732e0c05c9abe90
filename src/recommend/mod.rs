//! Personalized recommendation scoring
//!
//! A candidate's score is `activity·w₁ + preference·w₂ + similarity·w₃ +
//! intrinsic·w₄` with the weights taken from [`ScoringWeights`]. Every
//! sub-score is clamped to `[0, 1]` before weighting, so the composite is too.
//! Scores are a pure function of the [`RecommendationContext`]; recency is
//! measured against `context.as_of` rather than the wall clock.
pub mod context;
pub mod factors;
pub mod rationale;
pub mod task;
pub mod weights;

pub use context::{RecommendationContext, UserActivity, UserPreferences, UserProfile};
pub use weights::{
    ActivityWeights, IntrinsicWeights, RationaleThresholds, ScoringWeights, SimilarityWeights,
    TaskWeights,
};

use crate::catalog::{CatalogItem, TaskType};
use crate::metrics::Metrics;
use factors::ScoringFrame;
use log::debug;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;

/// The sub-scores behind a recommendation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub activity: f64,
    pub preference: f64,
    pub similarity: f64,
    pub intrinsic: f64,
    pub task_bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationScore {
    pub item_id: String,
    pub score: f64,
    pub reasons: Vec<String>,
    pub confidence: f64,
    pub breakdown: ScoreBreakdown,
}

pub struct RecommendationEngine {
    weights: ScoringWeights,
    metrics: Arc<Metrics>,
}

impl RecommendationEngine {
    pub fn new(weights: ScoringWeights, metrics: Arc<Metrics>) -> Self {
        let sum = weights.top_level_sum();
        if (sum - 1.0).abs() > 1e-9 {
            debug!("Recommendation weights sum to {sum:.4}, scores stay clamped to [0, 1]");
        }
        Self { weights, metrics }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Scores one item. Applies the task overlay when the context carries a task.
    pub fn score(&self, item: &CatalogItem, context: &RecommendationContext) -> RecommendationScore {
        let frame = ScoringFrame::new(context);
        self.score_in_frame(item, context, &frame)
    }

    fn score_in_frame(
        &self,
        item: &CatalogItem,
        context: &RecommendationContext,
        frame: &ScoringFrame,
    ) -> RecommendationScore {
        self.metrics.recommendations_scored.inc();
        let w = &self.weights;

        let activity = factors::activity(item, context, frame, &w.activity_factors);
        let preference = factors::preference(item, context);
        let similarity = factors::similarity(item, frame, &w.similarity_factors);
        let intrinsic = factors::intrinsic(item, context, &w.intrinsic_factors);

        let base = (w.activity * activity
            + w.preference * preference
            + w.similarity * similarity
            + w.intrinsic * intrinsic)
            .clamp(0.0, 1.0);

        let signals = rationale::Signals {
            direct_views: factors::direct_views(item, context, frame),
            preference,
            intrinsic,
            similarity,
        };
        let mut reasons = rationale::reasons(item, context, frame, signals, &w.thresholds);

        let task_bonus = context
            .task
            .map(|t| task::bonus(item, t, &w.task))
            .unwrap_or(0.0);
        if let Some(t) = context.task.filter(|_| task_bonus > 0.0) {
            if reasons.len() == 1 && reasons[0] == rationale::DEFAULT_REASON {
                reasons.clear();
            }
            reasons.truncate(rationale::MAX_REASONS - 1);
            reasons.push(task::reason(t));
        }

        RecommendationScore {
            item_id: item.id.clone(),
            score: (base + task_bonus).clamp(0.0, 1.0),
            reasons,
            confidence: factors::confidence(
                activity,
                preference,
                frame,
                w.confidence_interaction_ceiling,
            ),
            breakdown: ScoreBreakdown {
                activity,
                preference,
                similarity,
                intrinsic,
                task_bonus,
            },
        }
    }

    /// Scores every candidate and returns the best `limit`, highest first.
    /// Equal scores keep candidate order.
    pub fn recommend(&self, context: &RecommendationContext, limit: usize) -> Vec<RecommendationScore> {
        let frame = ScoringFrame::new(context);
        let mut scored: Vec<RecommendationScore> = context
            .candidates
            .par_iter()
            .map(|item| self.score_in_frame(item, context, &frame))
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);
        debug!(
            "Scored {} candidates, returning {}",
            context.candidates.len(),
            scored.len()
        );
        scored
    }

    pub fn recommend_for_task(
        &self,
        task: TaskType,
        context: &RecommendationContext,
        limit: usize,
    ) -> Vec<RecommendationScore> {
        let context = context.clone().with_task(task);
        self.recommend(&context, limit)
    }
}
