//! Catalog snapshot types shared by every engine
use crate::error::{Result, ScoutError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

const SMALL_MODEL_CEILING: f64 = 10e9;
const LARGE_MODEL_FLOOR: f64 = 100e9;

/// A single model record from an already-fetched catalog snapshot.
///
/// Engines only ever borrow items; nothing in this crate mutates one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub category: String,
    pub description: String,
    pub capabilities: Vec<String>,
    pub accuracy: Option<f64>,
    pub speed: Option<f64>,
    pub cost: Option<f64>,
    pub popularity: Option<f64>,
    #[serde(alias = "parameter_count", alias = "parameterCount")]
    pub parameters: Option<f64>,
    #[serde(alias = "context_window")]
    pub context_window: Option<f64>,
    #[serde(alias = "released_at", alias = "releaseDate")]
    pub released_at: Option<String>,
    #[serde(alias = "updated_at", alias = "lastUpdated")]
    pub updated_at: Option<String>,
    pub available: Option<bool>,
    #[serde(alias = "task_type")]
    pub task_type: Option<String>,
}

impl CatalogItem {
    pub fn new(id: &str, name: &str, provider: &str, category: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            provider: provider.to_string(),
            category: category.to_string(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_capabilities(mut self, capabilities: &[&str]) -> Self {
        self.capabilities = capabilities.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    pub fn with_parameters(mut self, parameters: f64) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_context_window(mut self, tokens: f64) -> Self {
        self.context_window = Some(tokens);
        self
    }

    pub fn with_released_at(mut self, raw: &str) -> Self {
        self.released_at = Some(raw.to_string());
        self
    }

    pub fn with_updated_at(mut self, raw: &str) -> Self {
        self.updated_at = Some(raw.to_string());
        self
    }

    pub fn with_availability(mut self, available: bool) -> Self {
        self.available = Some(available);
        self
    }

    pub fn released(&self) -> Option<DateTime<Utc>> {
        self.released_at.as_deref().and_then(parse_timestamp)
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated_at.as_deref().and_then(parse_timestamp)
    }

    /// Most recent known timestamp, preferring the update date.
    pub fn freshest(&self) -> Option<DateTime<Utc>> {
        self.updated().or_else(|| self.released())
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities
            .iter()
            .any(|c| c.eq_ignore_ascii_case(capability))
    }

    pub fn size_bucket(&self) -> Option<SizeBucket> {
        self.parameters.and_then(SizeBucket::classify)
    }

    /// Declared task type, falling back to inference from the model name.
    pub fn effective_task_type(&self) -> TaskType {
        self.task_type
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_else(|| TaskType::infer(&self.name))
    }
}

/// Coarse model size used by stated preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeBucket {
    Small,
    Medium,
    Large,
}

impl SizeBucket {
    /// Buckets a raw parameter count; non-finite or non-positive counts are unknown.
    pub fn classify(parameters: f64) -> Option<Self> {
        if !parameters.is_finite() || parameters <= 0.0 {
            return None;
        }
        Some(if parameters < SMALL_MODEL_CEILING {
            SizeBucket::Small
        } else if parameters < LARGE_MODEL_FLOOR {
            SizeBucket::Medium
        } else {
            SizeBucket::Large
        })
    }
}

impl fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeBucket::Small => write!(f, "small"),
            SizeBucket::Medium => write!(f, "medium"),
            SizeBucket::Large => write!(f, "large"),
        }
    }
}

/// Task families a model can be recommended for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Embedding,
    Multimodal,
    CodeGeneration,
    Conversational,
    Audio,
    TextGeneration,
}

impl TaskType {
    pub const ALL: [TaskType; 6] = [
        TaskType::Embedding,
        TaskType::Multimodal,
        TaskType::CodeGeneration,
        TaskType::Conversational,
        TaskType::Audio,
        TaskType::TextGeneration,
    ];

    /// Classifies a model by keywords in its name. Checks run in a fixed
    /// order and the first hit wins; anything unrecognised is text generation.
    pub fn infer(model_name: &str) -> Self {
        let name = model_name.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| name.contains(n));

        if has(&["embed"]) {
            TaskType::Embedding
        } else if has(&["vision", "image", "vl", "multimodal"]) {
            TaskType::Multimodal
        } else if has(&["code", "coder", "codestral", "devstral", "programming"]) {
            TaskType::CodeGeneration
        } else if has(&["chat", "instruct", "gemini", "turbo", "conversation"]) {
            TaskType::Conversational
        } else if has(&["audio", "ast-", "clap"]) {
            TaskType::Audio
        } else {
            TaskType::TextGeneration
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskType::Embedding => "embeddings",
            TaskType::Multimodal => "multimodal work",
            TaskType::CodeGeneration => "code generation",
            TaskType::Conversational => "conversational use",
            TaskType::Audio => "audio processing",
            TaskType::TextGeneration => "text generation",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            TaskType::Embedding => "embedding",
            TaskType::Multimodal => "multimodal",
            TaskType::CodeGeneration => "code_generation",
            TaskType::Conversational => "conversational",
            TaskType::Audio => "audio",
            TaskType::TextGeneration => "text_generation",
        };
        write!(f, "{tag}")
    }
}

impl FromStr for TaskType {
    type Err = ScoutError;

    fn from_str(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_lowercase().replace(['-', ' '], "_");
        TaskType::ALL
            .into_iter()
            .find(|task| task.to_string() == normalized)
            .or(match normalized.as_str() {
                "code" | "coding" => Some(TaskType::CodeGeneration),
                "chat" => Some(TaskType::Conversational),
                "vision" => Some(TaskType::Multimodal),
                "text" => Some(TaskType::TextGeneration),
                _ => None,
            })
            .ok_or_else(|| ScoutError::UnknownTask(raw.to_string()))
    }
}

/// Parses the timestamp shapes the catalog produces: RFC 3339, naive
/// date-times and bare `YYYY-MM-DD` dates (taken as midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Formats a raw parameter count as `7B`, `1.5T`, `350M`.
pub fn format_parameter_count(parameters: f64) -> String {
    format_scaled(parameters, &[(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")])
}

/// Formats a token count as `128K`, `1M`.
pub fn format_token_count(tokens: f64) -> String {
    format_scaled(tokens, &[(1e6, "M"), (1e3, "K")])
}

fn format_scaled(value: f64, units: &[(f64, &str)]) -> String {
    for (scale, suffix) in units {
        if value >= *scale {
            let scaled = value / scale;
            return if (scaled - scaled.round()).abs() < 0.05 {
                format!("{}{suffix}", scaled.round())
            } else {
                format!("{scaled:.1}{suffix}")
            };
        }
    }
    format!("{value}")
}

/// Reads a catalog snapshot stored as a JSON array of items.
pub fn load_snapshot(path: &Path) -> Result<Vec<CatalogItem>> {
    let content = fs::read_to_string(path).map_err(|e| ScoutError::Snapshot {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;
    let items: Vec<CatalogItem> =
        serde_json::from_str(&content).map_err(|e| ScoutError::Snapshot {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
    log::debug!("Loaded {} catalog items from {}", items.len(), path.display());
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_shapes() {
        assert!(parse_timestamp("2024-03-01T12:00:00Z").is_some());
        assert!(parse_timestamp("2024-03-01T12:00:00").is_some());
        assert_eq!(
            parse_timestamp("2024-03-01"),
            parse_timestamp("2024-03-01T00:00:00Z")
        );
        assert!(parse_timestamp("last tuesday").is_none());
        assert!(parse_timestamp("   ").is_none());
    }

    #[test]
    fn test_size_buckets() {
        assert_eq!(SizeBucket::classify(7e9), Some(SizeBucket::Small));
        assert_eq!(SizeBucket::classify(70e9), Some(SizeBucket::Medium));
        assert_eq!(SizeBucket::classify(175e9), Some(SizeBucket::Large));
        assert_eq!(SizeBucket::classify(f64::NAN), None);
        assert_eq!(SizeBucket::classify(0.0), None);
    }

    #[test]
    fn test_task_inference() {
        assert_eq!(TaskType::infer("text-embedding-3-large"), TaskType::Embedding);
        assert_eq!(TaskType::infer("Qwen2-VL-7B"), TaskType::Multimodal);
        assert_eq!(TaskType::infer("deepseek-coder-33b"), TaskType::CodeGeneration);
        assert_eq!(TaskType::infer("gpt-3.5-turbo"), TaskType::Conversational);
        assert_eq!(TaskType::infer("llama-3-70b"), TaskType::TextGeneration);
    }

    #[test]
    fn test_task_parse() {
        assert_eq!("code".parse::<TaskType>().unwrap(), TaskType::CodeGeneration);
        assert_eq!(
            "Code-Generation".parse::<TaskType>().unwrap(),
            TaskType::CodeGeneration
        );
        assert!("cooking".parse::<TaskType>().is_err());
    }

    #[test]
    fn test_declared_task_type_wins() {
        let mut item = CatalogItem::new("m", "llama-3-70b", "meta", "llm");
        item.task_type = Some("code_generation".to_string());
        assert_eq!(item.effective_task_type(), TaskType::CodeGeneration);
    }

    #[test]
    fn test_format_counts() {
        assert_eq!(format_parameter_count(7e9), "7B");
        assert_eq!(format_parameter_count(1.5e12), "1.5T");
        assert_eq!(format_token_count(128_000.0), "128K");
        assert_eq!(format_token_count(1_000_000.0), "1M");
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{"id":"a","name":"GPT-4","provider":"openai","category":"llm",
            "contextWindow":128000,"releasedAt":"2023-03-14","capabilities":["chat"]}"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.context_window, Some(128000.0));
        assert!(item.released().is_some());
        assert!(item.has_capability("CHAT"));
        assert_eq!(item.cost, None);
    }
}
