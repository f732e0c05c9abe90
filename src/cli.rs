use crate::catalog::{parse_timestamp, TaskType};
use crate::sort::{SortCriterion, SortDirection, SortField};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Catalog snapshot: a JSON array of model records
    #[clap(long, value_parser)]
    pub catalog: PathBuf,

    /// Config file; defaults to the usual lookup locations
    #[clap(long, value_parser)]
    pub config: Option<PathBuf>,

    /// Preferences file holding saved filters and search history
    #[clap(long, value_parser)]
    pub preferences: Option<PathBuf>,

    #[clap(long, value_parser, default_value_t = false)]
    pub verbose: bool,

    #[clap(long, value_parser)]
    pub log: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[clap(long, value_parser, default_value_t = false)]
    pub json: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank models by relevance to a query
    Search {
        query: String,

        /// Exact substring matching only
        #[clap(long, value_parser, default_value_t = false)]
        no_fuzzy: bool,

        /// Minimum fuzzy similarity in [0, 1]
        #[clap(long, value_parser)]
        threshold: Option<f64>,

        #[clap(short, long, value_parser)]
        limit: Option<usize>,
    },
    /// Suggest names, providers, categories and capabilities
    Suggest {
        partial: String,

        #[clap(short, long, value_parser, default_value_t = 10)]
        max: usize,
    },
    /// Sort by one or more fields, e.g. `--by cost --by accuracy:desc`
    Sort {
        /// `field[:asc|desc]`; earlier criteria take priority
        #[clap(long = "by", value_parser = parse_criterion, required = true)]
        criteria: Vec<SortCriterion>,

        #[clap(short, long, value_parser)]
        limit: Option<usize>,
    },
    /// Filter the catalog and summarize the active criteria
    Filter {
        #[clap(long, value_parser, value_delimiter = ',')]
        provider: Vec<String>,

        #[clap(long, value_parser, value_delimiter = ',')]
        category: Vec<String>,

        #[clap(long, value_parser, value_delimiter = ',')]
        capability: Vec<String>,

        #[clap(long, value_parser)]
        min_cost: Option<f64>,

        #[clap(long, value_parser)]
        max_cost: Option<f64>,

        #[clap(long, value_parser)]
        min_accuracy: Option<f64>,

        #[clap(long, value_parser)]
        min_parameters: Option<f64>,

        #[clap(long, value_parser)]
        min_context: Option<f64>,

        #[clap(long, value_parser, default_value_t = false)]
        available: bool,

        #[clap(long, value_parser)]
        term: Option<String>,

        #[clap(long, value_parser = parse_date)]
        since: Option<DateTime<Utc>>,

        #[clap(long, value_parser = parse_date)]
        until: Option<DateTime<Utc>>,

        /// Start from the filters saved in the preferences file
        #[clap(long, value_parser, default_value_t = false)]
        saved: bool,

        /// Store the resulting filters in the preferences file
        #[clap(long, value_parser, default_value_t = false)]
        save: bool,
    },
    /// Personalized recommendations from a user profile
    Recommend {
        /// JSON profile with `activity` and `preferences`
        #[clap(long, value_parser)]
        profile: Option<PathBuf>,

        #[clap(long, value_parser = parse_task)]
        task: Option<TaskType>,

        #[clap(short, long, value_parser, default_value_t = 10)]
        limit: usize,

        /// Reference instant for recency; defaults to now
        #[clap(long, value_parser = parse_date)]
        as_of: Option<DateTime<Utc>>,
    },
    /// Field coverage of the catalog and engine counters
    Stats {
        #[clap(long, value_parser, default_value_t = false)]
        metrics: bool,
    },
    /// Read queries from stdin, one per line, printing only results that
    /// settle before the next line arrives
    Live {
        /// Exact substring matching only
        #[clap(long, value_parser, default_value_t = false)]
        no_fuzzy: bool,
    },
}

/// Parses `field`, `field:asc` or `field:desc`.
pub fn parse_criterion(raw: &str) -> Result<SortCriterion, String> {
    let (field, direction) = match raw.split_once(':') {
        Some((field, direction)) => (field, direction),
        None => (raw, "asc"),
    };
    let field: SortField = field.parse().map_err(|e| format!("{e}"))?;
    let direction = match direction.trim().to_lowercase().as_str() {
        "asc" | "ascending" => SortDirection::Asc,
        "desc" | "descending" => SortDirection::Desc,
        other => return Err(format!("Unknown sort direction: {other}")),
    };
    Ok(SortCriterion::new(field, direction, 0))
}

/// Assigns descending priorities so the first criterion given wins.
pub fn prioritize(criteria: &[SortCriterion]) -> Vec<SortCriterion> {
    let count = criteria.len() as i32;
    criteria
        .iter()
        .enumerate()
        .map(|(i, c)| SortCriterion::new(c.field, c.direction, count - i as i32))
        .collect()
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw).ok_or_else(|| format!("Invalid date: {raw}"))
}

fn parse_task(raw: &str) -> Result<TaskType, String> {
    raw.parse().map_err(|e| format!("{e}"))
}
