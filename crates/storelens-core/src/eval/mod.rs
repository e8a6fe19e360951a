//! Relevance evaluation pipeline
//!
//! One pass per search task:
//! classification -> prompt building -> model call -> response parsing ->
//! inventory-aware ranking -> business summary.

pub mod classifier;
pub mod parser;
pub mod prompt;
pub mod rank;
pub mod summary;

pub use classifier::{classify, SearchType};
pub use parser::{parse_response, ParseOutcome};
pub use prompt::build_prompt;
pub use rank::{rank, EvaluatedResult};
pub use summary::{summarize, BusinessSummary};

use serde::{Deserialize, Serialize};

/// How well a scraped result matches the search query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelevanceCategory {
    High,
    Medium,
    Low,
}

impl RelevanceCategory {
    /// Numeric score for aggregate reporting (High=3, Medium=2, Low=1)
    pub fn score(&self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    /// Sort position, High first
    pub(crate) fn tier(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    /// Map a model-produced label to a category, accepting common synonyms.
    ///
    /// Unrecognized labels return `None` and are handled by the tolerant
    /// parsing path rather than failing the task.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().trim_matches('"').to_lowercase();
        match normalized.as_str() {
            "high" | "strong match" | "exact match" => Some(Self::High),
            "medium" | "partial match" | "moderate" => Some(Self::Medium),
            "low" | "no match" | "unrelated" | "irrelevant" | "none" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl std::fmt::Display for RelevanceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The model's judgement for one scraped result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceVerdict {
    pub category: RelevanceCategory,
    pub justification: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_canonical() {
        assert_eq!(
            RelevanceCategory::from_label("High"),
            Some(RelevanceCategory::High)
        );
        assert_eq!(
            RelevanceCategory::from_label("MEDIUM"),
            Some(RelevanceCategory::Medium)
        );
        assert_eq!(
            RelevanceCategory::from_label(" low "),
            Some(RelevanceCategory::Low)
        );
    }

    #[test]
    fn test_from_label_synonyms() {
        assert_eq!(
            RelevanceCategory::from_label("strong match"),
            Some(RelevanceCategory::High)
        );
        assert_eq!(
            RelevanceCategory::from_label("Partial Match"),
            Some(RelevanceCategory::Medium)
        );
        assert_eq!(
            RelevanceCategory::from_label("no match"),
            Some(RelevanceCategory::Low)
        );
        assert_eq!(
            RelevanceCategory::from_label("unrelated"),
            Some(RelevanceCategory::Low)
        );
    }

    #[test]
    fn test_from_label_unknown() {
        assert_eq!(RelevanceCategory::from_label("Very High"), None);
        assert_eq!(RelevanceCategory::from_label(""), None);
    }
}
