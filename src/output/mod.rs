//! Text and JSON rendering for the command-line front end
use crate::catalog::{format_parameter_count, format_token_count, CatalogItem};
use crate::recommend::RecommendationScore;
use crate::search::{highlight, RankedResult, SearchField, Suggestion};
use crate::sort::FieldStats;
use colored::*;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy)]
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn format_search(&self, query: &str, results: &[RankedResult]) -> String {
        match self.format {
            OutputFormat::Json => pretty(&json!({
                "query": query,
                "total": results.len(),
                "results": results
                    .iter()
                    .map(|r| json!({
                        "id": r.item.id,
                        "name": r.item.name,
                        "provider": r.item.provider,
                        "score": r.score,
                        "matches": r.matches,
                    }))
                    .collect::<Vec<_>>(),
            })),
            OutputFormat::Text => {
                if results.is_empty() {
                    return format!("{}", "No matches found".yellow());
                }
                let mut out = vec![format!(
                    "{} {} {}",
                    "Found".green(),
                    results.len(),
                    "matches:".green()
                )];
                for r in results {
                    let name = match r.match_for(SearchField::Name) {
                        Some(m) => emphasize(&r.item.name, &m.matched),
                        None => r.item.name.clone(),
                    };
                    out.push(format!(
                        "  {:.3}  {} ({})",
                        r.score,
                        name,
                        r.item.provider.cyan()
                    ));
                }
                out.join("\n")
            }
        }
    }

    pub fn format_suggestions(&self, suggestions: &[Suggestion]) -> String {
        match self.format {
            OutputFormat::Json => pretty(&json!(suggestions)),
            OutputFormat::Text => {
                if suggestions.is_empty() {
                    return format!("{}", "No suggestions".yellow());
                }
                suggestions
                    .iter()
                    .map(|s| format!("  {} [{}] {}", s.term, s.kind.to_string().dimmed(), s.count))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
    }

    pub fn format_items(&self, items: &[&CatalogItem]) -> String {
        match self.format {
            OutputFormat::Json => pretty(&json!({ "total": items.len(), "items": items })),
            OutputFormat::Text => {
                if items.is_empty() {
                    return format!("{}", "No models".yellow());
                }
                items
                    .iter()
                    .map(|item| item_line(item))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
    }

    pub fn format_filter(&self, summary: &[String], items: &[&CatalogItem]) -> String {
        match self.format {
            OutputFormat::Json => pretty(&json!({
                "active_filters": summary,
                "total": items.len(),
                "items": items,
            })),
            OutputFormat::Text => {
                let mut out = Vec::new();
                if summary.is_empty() {
                    out.push(format!("{}", "No active filters".dimmed()));
                } else {
                    out.push(format!("{}", "Active filters:".bold()));
                    out.extend(summary.iter().map(|line| format!("  {line}")));
                }
                out.push(format!("{} {}", items.len().to_string().green(), "models match"));
                out.extend(items.iter().map(|item| item_line(item)));
                out.join("\n")
            }
        }
    }

    pub fn format_recommendations(
        &self,
        recommendations: &[RecommendationScore],
        items: &[CatalogItem],
    ) -> String {
        match self.format {
            OutputFormat::Json => pretty(&json!({ "recommendations": recommendations })),
            OutputFormat::Text => {
                if recommendations.is_empty() {
                    return format!("{}", "No candidates".yellow());
                }
                let mut out = Vec::new();
                for (rank, rec) in recommendations.iter().enumerate() {
                    let name = items
                        .iter()
                        .find(|i| i.id == rec.item_id)
                        .map(|i| i.name.as_str())
                        .unwrap_or(rec.item_id.as_str());
                    out.push(format!(
                        "{:>2}. {}  score {:.3}  confidence {:.2}",
                        rank + 1,
                        name.bold(),
                        rec.score,
                        rec.confidence
                    ));
                    out.extend(rec.reasons.iter().map(|r| format!("      - {r}")));
                }
                out.join("\n")
            }
        }
    }

    pub fn format_stats(&self, total: usize, stats: &[FieldStats], metrics: Option<&str>) -> String {
        match self.format {
            OutputFormat::Json => {
                let mut doc = json!({ "total": total, "fields": stats });
                if let Some(text) = metrics {
                    doc["metrics"] = Value::String(text.to_string());
                }
                pretty(&doc)
            }
            OutputFormat::Text => {
                let mut out = vec![format!("{} {}", total.to_string().green(), "models")];
                for s in stats {
                    let line = format!(
                        "  {:<15} {:>5}/{:<5} {:>5.1}%",
                        s.field.as_str(),
                        s.present,
                        s.total,
                        s.coverage * 100.0
                    );
                    out.push(if s.present == 0 {
                        line.dimmed().to_string()
                    } else {
                        line
                    });
                }
                if let Some(text) = metrics {
                    out.push(String::new());
                    out.push(text.trim_end().to_string());
                }
                out.join("\n")
            }
        }
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn emphasize(text: &str, matched: &str) -> String {
    highlight(text, matched)
        .into_iter()
        .map(|segment| {
            if segment.highlighted {
                segment.text.yellow().bold().to_string()
            } else {
                segment.text
            }
        })
        .collect()
}

fn item_line(item: &CatalogItem) -> String {
    let mut details = Vec::new();
    if let Some(cost) = item.cost {
        details.push(format!("${cost:.4}/1K"));
    }
    if let Some(accuracy) = item.accuracy {
        details.push(format!("{:.0}%", accuracy * 100.0));
    }
    if let Some(parameters) = item.parameters {
        details.push(format_parameter_count(parameters));
    }
    if let Some(tokens) = item.context_window {
        details.push(format!("{} ctx", format_token_count(tokens)));
    }
    format!(
        "  {} ({}, {}) {}",
        item.name,
        item.provider.cyan(),
        item.category,
        details.join("  ")
    )
}
