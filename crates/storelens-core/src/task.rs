//! Search task inputs and run report outputs
//!
//! `SearchTask` and `ScrapedResult` are produced by the external scraping
//! collaborator and are read-only here. The report types are the complete
//! output contract consumed by the external reporting collaborator.

use crate::eval::classifier::SearchType;
use crate::eval::rank::EvaluatedResult;
use crate::eval::summary::BusinessSummary;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One search query to evaluate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTask {
    /// The raw search query
    pub query: String,

    /// Caller-supplied type; overrides automatic classification when set
    #[serde(default)]
    pub search_type: Option<SearchType>,
}

impl SearchTask {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            search_type: None,
        }
    }

    pub fn with_type(query: impl Into<String>, search_type: SearchType) -> Self {
        Self {
            query: query.into(),
            search_type: Some(search_type),
        }
    }
}

/// One product listing scraped from the site's result page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedResult {
    pub title: String,

    /// May be empty when the listing carries no SKU
    #[serde(default)]
    pub part_number: String,

    pub url: String,

    /// May be empty when no price is displayed
    #[serde(default)]
    pub price: String,

    /// Units in stock; `None` when the page gave no usable quantity
    #[serde(default)]
    pub inventory_count: Option<u64>,
}

lazy_static! {
    static ref FIRST_INTEGER: Regex = Regex::new(r"(\d+)").expect("valid regex");
}

/// Sentinel quantity for listings marked available without a number
pub const AVAILABLE_SENTINEL_QTY: u64 = 999;

/// Parse a scraped quantity string into an inventory count.
///
/// The first integer in the text wins; otherwise text indicators are
/// mapped ("out of stock" -> 0, "limited" -> 1, "in stock" -> sentinel).
/// Returns `None` when nothing usable is found.
pub fn parse_inventory_quantity(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
        return None;
    }

    if let Some(caps) = FIRST_INTEGER.captures(trimmed) {
        if let Ok(qty) = caps[1].parse::<u64>() {
            return Some(qty);
        }
    }

    let lower = trimmed.to_lowercase();
    if lower.contains("out of stock") || lower.contains("unavailable") {
        return Some(0);
    }
    if lower.contains("low stock") || lower.contains("limited") {
        return Some(1);
    }
    if lower.contains("in stock") || lower.contains("available") {
        return Some(AVAILABLE_SENTINEL_QTY);
    }

    None
}

/// Terminal state of one task's pipeline run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskStatus {
    /// Pipeline completed; `extraction_warnings` counts result indices
    /// whose verdict fell back to default Low categorization
    Success { extraction_warnings: usize },

    /// Pipeline aborted at some stage; no evaluated results are emitted
    Failed {
        reason: String,
        /// Raw model output, kept when the failure was an unparseable response
        #[serde(default, skip_serializing_if = "Option::is_none")]
        raw_model_output: Option<String>,
    },
}

impl TaskStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskStatus::Success { .. })
    }
}

/// Complete per-task output record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    pub query: String,

    /// Resolved type (caller override or automatic classification)
    pub search_type: SearchType,

    pub status: TaskStatus,

    /// Ranked evaluated results; empty when the task failed
    pub results: Vec<EvaluatedResult>,

    /// Business narrative; absent when the task failed
    pub summary: Option<BusinessSummary>,

    /// Model identifier that produced the verdicts
    pub model: String,

    pub timestamp: DateTime<Utc>,
}

/// Aggregate report over one run of tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub tasks: Vec<TaskReport>,
    pub total_tasks: usize,
    pub succeeded: usize,
    pub failed: usize,

    /// Mean verdict score across all evaluated results (High=3, Medium=2, Low=1)
    pub average_relevance_score: f64,

    /// Share of evaluated results with stock on hand, in percent
    pub in_stock_percentage: f64,

    pub top_recommendations: Vec<String>,
    pub critical_issues: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl RunReport {
    /// Build the aggregate view from finished task reports.
    pub fn from_tasks(tasks: Vec<TaskReport>) -> Self {
        let total_tasks = tasks.len();
        let succeeded = tasks.iter().filter(|t| t.status.is_success()).count();
        let failed = total_tasks - succeeded;

        let mut total_score = 0u64;
        let mut total_products = 0u64;
        let mut in_stock = 0u64;

        for task in &tasks {
            for result in &task.results {
                total_products += 1;
                total_score += result.verdict.category.score() as u64;
                if !result.out_of_stock {
                    in_stock += 1;
                }
            }
        }

        let average_relevance_score = if total_products > 0 {
            (total_score as f64 / total_products as f64 * 100.0).round() / 100.0
        } else {
            0.0
        };
        let in_stock_percentage = if total_products > 0 {
            (in_stock as f64 / total_products as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };

        let mut top_recommendations = Vec::new();
        let mut critical_issues = Vec::new();

        if total_products > 0 && average_relevance_score < 2.0 {
            top_recommendations.push(
                "Improve search relevancy - average relevance score is below target".to_string(),
            );
        }
        if total_products > 0 && in_stock_percentage < 60.0 {
            top_recommendations.push(format!(
                "Address inventory issues - only {}% of evaluated products are in stock",
                in_stock_percentage
            ));
        }
        if failed > 0 {
            top_recommendations.push(format!("Investigate {} failed search task(s)", failed));
        }

        if failed > succeeded {
            critical_issues
                .push("More search tasks failing than succeeding - major system issue".to_string());
        }
        if total_products > 0 && in_stock_percentage < 30.0 {
            critical_issues
                .push("Critical inventory shortage across most evaluated products".to_string());
        }

        Self {
            tasks,
            total_tasks,
            succeeded,
            failed,
            average_relevance_score,
            in_stock_percentage,
            top_recommendations,
            critical_issues,
            generated_at: Utc::now(),
        }
    }
}
