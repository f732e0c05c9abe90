use crate::catalog::CatalogItem;
use crate::recommend::context::RecommendationContext;
use crate::recommend::factors::ScoringFrame;
use crate::recommend::weights::RationaleThresholds;

pub const MAX_REASONS: usize = 3;
pub const DEFAULT_REASON: &str = "Popular choice among similar users";

/// Sub-scores the rationale rules look at.
#[derive(Debug, Clone, Copy)]
pub struct Signals {
    pub direct_views: f64,
    pub preference: f64,
    pub intrinsic: f64,
    pub similarity: f64,
}

fn times(count: u32) -> &'static str {
    if count == 1 {
        "time"
    } else {
        "times"
    }
}

/// Reasons in fixed priority order, capped at `MAX_REASONS`.
pub fn reasons(
    item: &CatalogItem,
    context: &RecommendationContext,
    frame: &ScoringFrame,
    signals: Signals,
    thresholds: &RationaleThresholds,
) -> Vec<String> {
    let mut out = Vec::with_capacity(MAX_REASONS);

    if context.activity.favorites.contains(&item.id) {
        out.push("In your favorites".to_string());
    }

    let views = context.activity.views_of(&item.id);
    if views > 0 && signals.direct_views >= thresholds.direct_views {
        out.push(format!("You've viewed this {} {}", views, times(views)));
    }

    if context.preferences.declared_count() > 0 && signals.preference >= thresholds.preference {
        out.push("Matches your preferences".to_string());
    }

    if signals.intrinsic >= thresholds.intrinsic {
        out.push("Strong capabilities and recent release".to_string());
    }

    if !frame.favorites.is_empty() && signals.similarity >= thresholds.similarity {
        out.push("Similar to models you like".to_string());
    }

    out.truncate(MAX_REASONS);
    if out.is_empty() {
        out.push(DEFAULT_REASON.to_string());
    }
    out
}
