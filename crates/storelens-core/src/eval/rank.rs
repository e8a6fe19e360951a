//! Inventory-aware ranking of evaluated results
//!
//! Relevance category is the primary key, High before Medium before Low.
//! Within a category, results are ordered by a blended score whose only
//! nonzero term is `weight_factor * normalized_inventory`, where inventory
//! is normalized against the category's maximum. Ties keep scraped order
//! (stable sort), so identical inputs always produce identical output.

use super::{RelevanceCategory, RelevanceVerdict};
use crate::task::ScrapedResult;
use serde::{Deserialize, Serialize};

/// A scraped result paired with its verdict and derived ranking data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatedResult {
    pub result: ScrapedResult,
    pub verdict: RelevanceVerdict,

    /// Blended within-category score; recomputed whenever policy changes
    pub rank_score: f64,

    /// 1-based display position after ranking
    pub position: usize,

    /// Zero (or unknown) inventory; never excluded, only pushed down
    pub out_of_stock: bool,

    /// Inventory above zero but below the configured threshold
    pub low_stock: bool,
}

/// Order evaluated results for display.
///
/// `weight_factor` is clamped to [0, 1]. Items with zero inventory stay in
/// their relevance category, flagged and sorted to its bottom.
pub fn rank(
    evaluated: Vec<(ScrapedResult, RelevanceVerdict)>,
    weight_factor: f64,
    low_stock_threshold: u64,
) -> Vec<EvaluatedResult> {
    let weight = weight_factor.clamp(0.0, 1.0);

    // Per-category inventory maximum for normalization
    let mut max_inventory = [0u64; 3];
    for (result, verdict) in &evaluated {
        let qty = result.inventory_count.unwrap_or(0);
        let tier = verdict.category.tier() as usize;
        max_inventory[tier] = max_inventory[tier].max(qty);
    }

    let mut ranked: Vec<EvaluatedResult> = evaluated
        .into_iter()
        .map(|(result, verdict)| {
            let qty = result.inventory_count.unwrap_or(0);
            let max = max_inventory[verdict.category.tier() as usize];
            let normalized = if max == 0 { 0.0 } else { qty as f64 / max as f64 };

            EvaluatedResult {
                out_of_stock: qty == 0,
                low_stock: qty > 0 && qty < low_stock_threshold,
                rank_score: weight * normalized,
                position: 0,
                result,
                verdict,
            }
        })
        .collect();

    // Stable sort: ties fall back to scraped order
    ranked.sort_by(|a, b| {
        a.verdict
            .category
            .tier()
            .cmp(&b.verdict.category.tier())
            .then_with(|| {
                b.rank_score
                    .partial_cmp(&a.rank_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });

    for (i, item) in ranked.iter_mut().enumerate() {
        item.position = i + 1;
    }

    ranked
}
