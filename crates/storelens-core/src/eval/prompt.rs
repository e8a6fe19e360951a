//! Type-specific evaluation prompt rendering
//!
//! The index tag in the results block is the only linkage between a
//! scraped result and its verdict: indices are 0-based, assigned in input
//! order, never reordered or deduplicated.

use super::classifier::SearchType;
use crate::task::ScrapedResult;

const ENGLISH_WORD_RUBRIC: &str = "\
- High Relevance: The product is a direct contextual match for the term's meaning.
- Medium Relevance: The product is a related or accessory item.
- Low Relevance: The product is an unrelated item.";

const PART_NUMBER_RUBRIC: &str = "\
- High Relevance: Exact match of the primary part number.
- Medium Relevance: The input is a substring of the result's part number, or vice versa, or the result is explicitly marked as a cross-reference/alternative/compatible part.
- Low Relevance: No discernible match.";

const MULTIPLE_TERMS_RUBRIC: &str = "\
- High Relevance: Most or all key terms matched.
- Medium Relevance: Some terms matched.
- Low Relevance: Few or no terms matched, or details contradict the query.";

const REPLY_FORMAT: &str = r#"Provide your evaluation for each result in JSON format:
{
  "evaluations": [
    {
      "result_index": 0,
      "relevance": "High|Medium|Low",
      "justification": "Short justification here"
    }
  ]
}
Output only the JSON object, one entry per result, in index order."#;

/// Render the full evaluation prompt for one task.
pub fn build_prompt(query: &str, search_type: SearchType, results: &[ScrapedResult]) -> String {
    let (intro, rubric) = match search_type {
        SearchType::EnglishWord => (
            format!(
                "Evaluate the relevance of the following search results for the English word query: \"{}\".\n\nCriteria: Assess if the product is contextually relevant to the search term \"{}\".",
                query, query
            ),
            ENGLISH_WORD_RUBRIC,
        ),
        SearchType::PartNumber => (
            format!(
                "Evaluate the relevance of the following search results for the part number query: \"{}\".\n\nCriteria: Assess the match between the input part number \"{}\" and the part numbers listed in the results.",
                query, query
            ),
            PART_NUMBER_RUBRIC,
        ),
        SearchType::MultipleTerms => (
            format!(
                "Evaluate the relevance of the following search results for the multi-term query: \"{}\".\n\nCriteria: Assess if the product satisfies the combination of key constraints in the query \"{}\" (product type, brand, application details).",
                query, query
            ),
            MULTIPLE_TERMS_RUBRIC,
        ),
    };

    format!(
        "{}\n\nSearch Type: {}\n{}\n\nResults:\n{}\n{}",
        intro,
        search_type,
        rubric,
        format_results(results),
        REPLY_FORMAT
    )
}

/// Format the scraped results as an enumerated, index-tagged listing.
fn format_results(results: &[ScrapedResult]) -> String {
    let mut text = String::new();
    for (i, result) in results.iter().enumerate() {
        text.push_str(&format!("Result {}:\n", i));
        text.push_str(&format!("Title: {}\n", or_na(&result.title)));
        text.push_str(&format!("Part Number: {}\n", or_na(&result.part_number)));
        text.push_str(&format!("Price: {}\n", or_na(&result.price)));
        text.push_str(&format!(
            "Inventory: {}\n",
            result
                .inventory_count
                .map(|q| q.to_string())
                .unwrap_or_else(|| "N/A".to_string())
        ));
        text.push_str(&format!("URL: {}\n", or_na(&result.url)));
        text.push_str("---\n");
    }
    text
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_results() -> Vec<ScrapedResult> {
        vec![
            ScrapedResult {
                title: "Premium Gasket Set".to_string(),
                part_number: "GSK001".to_string(),
                url: "https://example.com/gsk001".to_string(),
                price: "$25.99".to_string(),
                inventory_count: Some(0),
            },
            ScrapedResult {
                title: "Standard Gasket".to_string(),
                part_number: "GSK002".to_string(),
                url: "https://example.com/gsk002".to_string(),
                price: String::new(),
                inventory_count: Some(150),
            },
        ]
    }

    #[test]
    fn test_prompt_contains_every_result_once_in_order() {
        let results = sample_results();
        let prompt = build_prompt("gasket", SearchType::EnglishWord, &results);

        for result in &results {
            assert_eq!(prompt.matches(result.title.as_str()).count(), 1);
            assert_eq!(prompt.matches(result.part_number.as_str()).count(), 1);
        }

        let idx0 = prompt.find("Result 0:").unwrap();
        let idx1 = prompt.find("Result 1:").unwrap();
        assert!(idx0 < idx1);
        let title0 = prompt.find("Premium Gasket Set").unwrap();
        assert!(idx0 < title0 && title0 < idx1);
    }

    #[test]
    fn test_prompt_embeds_query_verbatim() {
        let prompt = build_prompt("brake pads toyota camry", SearchType::MultipleTerms, &sample_results());
        assert!(prompt.contains("\"brake pads toyota camry\""));
        assert!(prompt.contains("Search Type: multiple_terms"));
    }

    #[test]
    fn test_rubric_selected_by_type() {
        let results = sample_results();
        let pn = build_prompt("BK608", SearchType::PartNumber, &results);
        assert!(pn.contains("Exact match of the primary part number"));
        assert!(pn.contains("cross-reference/alternative/compatible"));

        let ew = build_prompt("gasket", SearchType::EnglishWord, &results);
        assert!(ew.contains("direct contextual match"));
        assert!(ew.contains("related or accessory item"));

        let mt = build_prompt("brake pads", SearchType::MultipleTerms, &results);
        assert!(mt.contains("Most or all key terms matched"));
    }

    #[test]
    fn test_prompt_requests_parseable_structure() {
        let prompt = build_prompt("gasket", SearchType::EnglishWord, &sample_results());
        assert!(prompt.contains("\"result_index\""));
        assert!(prompt.contains("\"relevance\""));
        assert!(prompt.contains("\"justification\""));
    }

    #[test]
    fn test_missing_fields_render_as_na() {
        let prompt = build_prompt("gasket", SearchType::EnglishWord, &sample_results());
        // second result has no price
        assert!(prompt.contains("Price: N/A"));
    }
}
