//! Task overlay: a bounded bonus for items suited to a declared task.
use crate::catalog::{CatalogItem, TaskType};
use crate::recommend::weights::TaskWeights;

/// Capabilities and categories that mark an item as a fit for a task.
#[derive(Debug, Clone, Copy)]
pub struct TaskProfile {
    pub capabilities: &'static [&'static str],
    pub categories: &'static [&'static str],
}

pub fn profile(task: TaskType) -> TaskProfile {
    match task {
        TaskType::Embedding => TaskProfile {
            capabilities: &["embeddings", "retrieval", "semantic-search"],
            categories: &["embedding", "embeddings"],
        },
        TaskType::Multimodal => TaskProfile {
            capabilities: &["vision", "image-understanding", "chat"],
            categories: &["multimodal", "vision"],
        },
        TaskType::CodeGeneration => TaskProfile {
            capabilities: &["code", "function-calling", "reasoning"],
            categories: &["code", "coding"],
        },
        TaskType::Conversational => TaskProfile {
            capabilities: &["chat", "instruction-following", "function-calling"],
            categories: &["chat", "conversational", "assistant"],
        },
        TaskType::Audio => TaskProfile {
            capabilities: &["audio", "speech-to-text", "text-to-speech"],
            categories: &["audio", "speech"],
        },
        TaskType::TextGeneration => TaskProfile {
            capabilities: &["completion", "summarization", "chat"],
            categories: &["text", "text-generation", "llm"],
        },
    }
}

/// Fraction of the task's capabilities the item carries.
pub fn coverage(item: &CatalogItem, profile: &TaskProfile) -> f64 {
    if profile.capabilities.is_empty() {
        return 0.0;
    }
    let found = profile
        .capabilities
        .iter()
        .filter(|c| item.has_capability(c))
        .count();
    found as f64 / profile.capabilities.len() as f64
}

fn category_match(item: &CatalogItem, task: TaskType, profile: &TaskProfile) -> bool {
    item.effective_task_type() == task
        || profile
            .categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(item.category.trim()))
}

/// Bonus in `[0, weights.bonus_cap]`.
pub fn bonus(item: &CatalogItem, task: TaskType, weights: &TaskWeights) -> f64 {
    let profile = profile(task);
    let fit = weights.capabilities * coverage(item, &profile)
        + weights.category * if category_match(item, task, &profile) { 1.0 } else { 0.0 };
    let cap = weights.bonus_cap.max(0.0);
    (cap * fit).clamp(0.0, cap)
}

pub fn reason(task: TaskType) -> String {
    format!("Well suited for {}", task.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bonus_is_capped() {
        let weights = TaskWeights::default();
        let coder = CatalogItem::new("c", "Codestral", "mistral", "code")
            .with_capabilities(&["code", "function-calling", "reasoning"]);
        assert!((bonus(&coder, TaskType::CodeGeneration, &weights) - 0.2).abs() < 1e-9);

        let inflated = TaskWeights {
            capabilities: 3.0,
            category: 3.0,
            bonus_cap: 0.2,
        };
        assert!(bonus(&coder, TaskType::CodeGeneration, &inflated) <= 0.2);
    }

    #[test]
    fn test_partial_fit() {
        let weights = TaskWeights::default();
        let chat = CatalogItem::new("g", "GPT-4 Turbo", "openai", "general").with_capabilities(&["chat"]);
        // one of three capabilities, name infers conversational
        let expected = 0.2 * (0.6 / 3.0 + 0.4);
        assert!((bonus(&chat, TaskType::Conversational, &weights) - expected).abs() < 1e-9);
        assert_eq!(bonus(&chat, TaskType::Audio, &weights), 0.0);
    }

    #[test]
    fn test_reason_uses_label() {
        assert_eq!(reason(TaskType::Audio), "Well suited for audio processing");
    }
}
