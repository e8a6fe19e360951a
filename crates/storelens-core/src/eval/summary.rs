//! Business summary generation
//!
//! Deterministic aggregation over one task's ranked results. The
//! narrative is built from templated sentences parameterized by counts,
//! and the recommendation/insight/action rules are a fixed, finite set.
//! No model call happens here.

use super::classifier::SearchType;
use super::rank::EvaluatedResult;
use super::RelevanceCategory;
use serde::{Deserialize, Serialize};

/// Aggregated business view of one task's evaluated results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessSummary {
    pub high_count: usize,
    pub medium_count: usize,
    pub low_count: usize,

    pub in_stock_count: usize,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,

    /// One-paragraph relevancy and stock assessment
    pub assessment: String,

    pub recommendations: Vec<String>,
    pub insights: Vec<String>,
    pub action_items: Vec<String>,
}

/// Summarize one task's ranked result set.
///
/// `detailed` gates the insight and action-item lists; counts, assessment,
/// and recommendations are always produced.
pub fn summarize(
    query: &str,
    search_type: SearchType,
    ranked: &[EvaluatedResult],
    detailed: bool,
) -> BusinessSummary {
    let total = ranked.len();

    let count_of = |category: RelevanceCategory| {
        ranked
            .iter()
            .filter(|r| r.verdict.category == category)
            .count()
    };
    let high_count = count_of(RelevanceCategory::High);
    let medium_count = count_of(RelevanceCategory::Medium);
    let low_count = count_of(RelevanceCategory::Low);

    let out_of_stock_count = ranked.iter().filter(|r| r.out_of_stock).count();
    let low_stock_count = ranked.iter().filter(|r| r.low_stock).count();
    let in_stock_count = total - out_of_stock_count;

    let mut summary = BusinessSummary {
        high_count,
        medium_count,
        low_count,
        in_stock_count,
        low_stock_count,
        out_of_stock_count,
        assessment: String::new(),
        recommendations: Vec::new(),
        insights: Vec::new(),
        action_items: Vec::new(),
    };

    if total == 0 {
        summary.assessment = format!(
            "Search for '{}' ({}) returned no evaluable results. Consider investigating search functionality or product catalog coverage.",
            query, search_type
        );
        summary
            .action_items
            .push("Investigate why the search returned no results".to_string());
        return summary;
    }

    let high_pct = high_count as f64 / total as f64 * 100.0;
    let in_stock_pct = in_stock_count as f64 / total as f64 * 100.0;

    let relevancy_quality = if high_pct >= 60.0 {
        "excellent"
    } else if high_pct >= 40.0 {
        "good"
    } else if high_pct >= 20.0 {
        "moderate"
    } else {
        "poor"
    };
    let stock_health = if in_stock_pct >= 70.0 {
        "strong"
    } else if in_stock_pct >= 40.0 {
        "moderate"
    } else {
        "concerning"
    };

    summary.assessment = format!(
        "Search for '{}' ({}) returned {} results with {} relevancy ({} high, {} medium, {} low relevance). Inventory availability is {} with {} items in stock, {} out of stock.",
        query,
        search_type,
        total,
        relevancy_quality,
        high_count,
        medium_count,
        low_count,
        stock_health,
        in_stock_count,
        out_of_stock_count
    );

    // Recommendation rules, in fixed order
    let relevant_out_of_stock = ranked
        .iter()
        .filter(|r| r.out_of_stock && r.verdict.category != RelevanceCategory::Low)
        .count();
    if relevant_out_of_stock > 0 {
        summary.recommendations.push(format!(
            "Restock {} out-of-stock item(s) among relevant results, or remove them from search results to improve customer experience",
            relevant_out_of_stock
        ));
    }
    if low_count > high_count {
        summary.recommendations.push(
            "Improve search algorithm or product tagging to surface more relevant results higher in rankings"
                .to_string(),
        );
    }
    if low_count == 0 && in_stock_pct >= 70.0 {
        summary.recommendations.push(format!(
            "Promote the search term '{}' - results are relevant and well stocked",
            query
        ));
    }

    if !detailed {
        return summary;
    }

    // Insight rules: top performers and problem products come from the
    // top three ranked positions
    let top_performers: Vec<&str> = ranked
        .iter()
        .take(3)
        .filter(|r| r.verdict.category == RelevanceCategory::High && !r.out_of_stock)
        .map(|r| display_name(r))
        .take(2)
        .collect();
    if !top_performers.is_empty() {
        summary
            .insights
            .push(format!("Top performing products: {}", top_performers.join(", ")));
    }

    let problem_products: Vec<&str> = ranked
        .iter()
        .take(3)
        .filter(|r| r.verdict.category == RelevanceCategory::Low || r.out_of_stock)
        .map(|r| display_name(r))
        .take(2)
        .collect();
    if !problem_products.is_empty() {
        summary
            .insights
            .push(format!("Products needing attention: {}", problem_products.join(", ")));
    }

    if high_pct < 30.0 {
        summary.insights.push(
            "Search relevancy is below optimal - consider improving product metadata or the search algorithm"
                .to_string(),
        );
    }
    if in_stock_pct < 50.0 {
        summary
            .insights
            .push("Low inventory availability may be impacting sales conversion".to_string());
    }

    // Action-item rules
    if high_count == 0 {
        summary.action_items.push(
            "URGENT: No highly relevant results found - review product catalog and search functionality"
                .to_string(),
        );
    }
    if out_of_stock_count > in_stock_count {
        summary.action_items.push(
            "PRIORITY: More items out of stock than in stock - review inventory management"
                .to_string(),
        );
    }
    if high_pct > 70.0 && in_stock_pct > 70.0 {
        summary.action_items.push(
            "OPTIMIZE: Strong performance - consider promoting this search term in marketing"
                .to_string(),
        );
    }

    summary
}

fn display_name(result: &EvaluatedResult) -> &str {
    if result.result.part_number.is_empty() {
        &result.result.title
    } else {
        &result.result.part_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::RelevanceVerdict;
    use crate::task::ScrapedResult;

    fn evaluated(
        part_number: &str,
        category: RelevanceCategory,
        inventory: u64,
        position: usize,
    ) -> EvaluatedResult {
        EvaluatedResult {
            result: ScrapedResult {
                title: format!("{} Product", part_number),
                part_number: part_number.to_string(),
                url: format!("https://example.com/{}", part_number.to_lowercase()),
                price: "$10.00".to_string(),
                inventory_count: Some(inventory),
            },
            verdict: RelevanceVerdict {
                category,
                justification: "test".to_string(),
            },
            rank_score: 0.0,
            position,
            out_of_stock: inventory == 0,
            low_stock: inventory > 0 && inventory < 5,
        }
    }

    #[test]
    fn test_counts_all_high() {
        // Scenario: 3 gasket products all rated High
        let ranked = vec![
            evaluated("GSK001", RelevanceCategory::High, 10, 1),
            evaluated("GSK002", RelevanceCategory::High, 8, 2),
            evaluated("GSK003", RelevanceCategory::High, 5, 3),
        ];
        let summary = summarize("gasket", SearchType::EnglishWord, &ranked, true);

        assert_eq!(summary.high_count, 3);
        assert_eq!(summary.medium_count, 0);
        assert_eq!(summary.low_count, 0);
        assert!(summary.assessment.contains("3 high, 0 medium, 0 low"));
        assert!(summary.assessment.contains("excellent"));
    }

    #[test]
    fn test_empty_result_set() {
        let summary = summarize("gasket", SearchType::EnglishWord, &[], true);
        assert!(summary.assessment.contains("no evaluable results"));
        assert_eq!(summary.action_items.len(), 1);
        assert!(summary.recommendations.is_empty());
    }

    #[test]
    fn test_restock_rule_fires_for_relevant_out_of_stock() {
        let ranked = vec![
            evaluated("A", RelevanceCategory::High, 0, 1),
            evaluated("B", RelevanceCategory::Medium, 0, 2),
            evaluated("C", RelevanceCategory::Low, 0, 3),
        ];
        let summary = summarize("q", SearchType::EnglishWord, &ranked, false);
        assert!(summary
            .recommendations
            .iter()
            .any(|r| r.contains("Restock 2 out-of-stock item(s)")));
    }

    #[test]
    fn test_restock_rule_ignores_low_relevance_stockouts() {
        let ranked = vec![
            evaluated("A", RelevanceCategory::High, 10, 1),
            evaluated("B", RelevanceCategory::Low, 0, 2),
        ];
        let summary = summarize("q", SearchType::EnglishWord, &ranked, false);
        assert!(!summary.recommendations.iter().any(|r| r.contains("Restock")));
    }

    #[test]
    fn test_improve_search_rule() {
        let ranked = vec![
            evaluated("A", RelevanceCategory::Low, 10, 1),
            evaluated("B", RelevanceCategory::Low, 10, 2),
            evaluated("C", RelevanceCategory::High, 10, 3),
        ];
        let summary = summarize("q", SearchType::EnglishWord, &ranked, false);
        assert!(summary
            .recommendations
            .iter()
            .any(|r| r.contains("Improve search algorithm")));
    }

    #[test]
    fn test_promote_rule_needs_no_low_and_strong_stock() {
        let ranked = vec![
            evaluated("A", RelevanceCategory::High, 10, 1),
            evaluated("B", RelevanceCategory::Medium, 10, 2),
        ];
        let summary = summarize("gasket", SearchType::EnglishWord, &ranked, false);
        assert!(summary
            .recommendations
            .iter()
            .any(|r| r.contains("Promote the search term 'gasket'")));

        // One Low item disables the rule
        let with_low = vec![
            evaluated("A", RelevanceCategory::High, 10, 1),
            evaluated("B", RelevanceCategory::Low, 10, 2),
        ];
        let summary = summarize("gasket", SearchType::EnglishWord, &with_low, false);
        assert!(!summary.recommendations.iter().any(|r| r.contains("Promote")));
    }

    #[test]
    fn test_detailed_flag_gates_insights_and_actions() {
        let ranked = vec![evaluated("A", RelevanceCategory::Low, 0, 1)];
        let plain = summarize("q", SearchType::EnglishWord, &ranked, false);
        assert!(plain.insights.is_empty());
        assert!(plain.action_items.is_empty());

        let detailed = summarize("q", SearchType::EnglishWord, &ranked, true);
        assert!(!detailed.insights.is_empty());
        assert!(!detailed.action_items.is_empty());
    }

    #[test]
    fn test_urgent_and_priority_action_items() {
        let ranked = vec![
            evaluated("A", RelevanceCategory::Low, 0, 1),
            evaluated("B", RelevanceCategory::Medium, 0, 2),
            evaluated("C", RelevanceCategory::Low, 10, 3),
        ];
        let summary = summarize("q", SearchType::EnglishWord, &ranked, true);
        assert!(summary.action_items.iter().any(|a| a.starts_with("URGENT")));
        assert!(summary.action_items.iter().any(|a| a.starts_with("PRIORITY")));
        assert!(!summary.action_items.iter().any(|a| a.starts_with("OPTIMIZE")));
    }

    #[test]
    fn test_optimize_action_item() {
        let ranked = vec![
            evaluated("A", RelevanceCategory::High, 10, 1),
            evaluated("B", RelevanceCategory::High, 10, 2),
            evaluated("C", RelevanceCategory::High, 10, 3),
        ];
        let summary = summarize("q", SearchType::EnglishWord, &ranked, true);
        assert!(summary.action_items.iter().any(|a| a.starts_with("OPTIMIZE")));
    }

    #[test]
    fn test_top_performers_and_problem_products() {
        let ranked = vec![
            evaluated("GOOD1", RelevanceCategory::High, 50, 1),
            evaluated("GOOD2", RelevanceCategory::High, 20, 2),
            evaluated("BAD1", RelevanceCategory::Low, 0, 3),
            // Outside the top three, never reported
            evaluated("BAD2", RelevanceCategory::Low, 0, 4),
        ];
        let summary = summarize("q", SearchType::EnglishWord, &ranked, true);
        assert!(summary
            .insights
            .iter()
            .any(|i| i.contains("GOOD1, GOOD2")));
        assert!(summary
            .insights
            .iter()
            .any(|i| i.contains("BAD1") && !i.contains("BAD2")));
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let ranked = vec![
            evaluated("A", RelevanceCategory::High, 3, 1),
            evaluated("B", RelevanceCategory::Medium, 0, 2),
            evaluated("C", RelevanceCategory::Low, 7, 3),
        ];
        let first = summarize("widget", SearchType::EnglishWord, &ranked, true);
        let second = summarize("widget", SearchType::EnglishWord, &ranked, true);
        assert_eq!(first, second);
    }
}
