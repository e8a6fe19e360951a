//! Two-phase model response parsing
//!
//! The model is asked for JSON but treated as unreliable: strict decoding
//! runs first, then a tolerant keyword scan over the raw text for any
//! result indices the strict pass missed. Indices that neither pass can
//! resolve are defaulted to Low with a warning count, unless nothing at
//! all was extracted, which is a hard failure.

use super::{RelevanceCategory, RelevanceVerdict};
use crate::error::{Result, StoreLensError};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

/// Parsed verdicts for one task, index-aligned with the scraped results
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// One verdict per expected result index
    pub verdicts: Vec<RelevanceVerdict>,

    /// Indices that fell back to default Low categorization
    pub fallback_indices: Vec<usize>,
}

impl ParseOutcome {
    /// Number of indices whose verdict could not be extracted
    pub fn warning_count(&self) -> usize {
        self.fallback_indices.len()
    }
}

lazy_static! {
    static ref TRAILING_COMMA: Regex = Regex::new(r",(\s*[}\]])").expect("valid regex");
    static ref INDEX_MARKER: Regex =
        Regex::new(r"(?i)\b(?:result|index|item)[\s_#:]*(\d+)").expect("valid regex");
    static ref CATEGORY_KEYWORD: Regex = Regex::new(
        r"(?i)\b(high|strong match|exact match|medium|partial match|moderate|low|no match|unrelated|irrelevant)\b"
    )
    .expect("valid regex");
}

#[derive(Debug, Deserialize)]
struct StrictReply {
    evaluations: Vec<StrictEntry>,
}

#[derive(Debug, Deserialize)]
struct StrictEntry {
    #[serde(default)]
    result_index: Option<usize>,
    relevance: String,
    #[serde(default)]
    justification: String,
}

/// Parse raw model output into one verdict per expected result index.
///
/// Fails with `UnparseableResponse` when the response is empty or when
/// neither pass extracts a single verdict.
pub fn parse_response(raw: &str, expected_result_count: usize) -> Result<ParseOutcome> {
    if raw.trim().is_empty() {
        return Err(StoreLensError::UnparseableResponse {
            reason: "empty model response".to_string(),
            raw: raw.to_string(),
        });
    }

    if expected_result_count == 0 {
        return Ok(ParseOutcome {
            verdicts: vec![],
            fallback_indices: vec![],
        });
    }

    let mut slots: Vec<Option<RelevanceVerdict>> = vec![None; expected_result_count];

    // Phase 1: strict structured decoding
    if let Some(reply) = try_strict_parse(raw) {
        for (position, entry) in reply.evaluations.into_iter().enumerate() {
            let index = entry.result_index.unwrap_or(position);
            if index >= expected_result_count {
                tracing::warn!(index, "model returned verdict for out-of-range index");
                continue;
            }
            if let Some(category) = RelevanceCategory::from_label(&entry.relevance) {
                slots[index] = Some(RelevanceVerdict {
                    category,
                    justification: entry.justification,
                });
            } else {
                tracing::warn!(
                    label = %entry.relevance,
                    index,
                    "unrecognized relevance label, deferring to tolerant scan"
                );
            }
        }
    }

    // Phase 2: tolerant keyword scan for whatever is still unmapped
    if slots.iter().any(|s| s.is_none()) {
        scan_tolerant(raw, &mut slots);
    }

    let extracted = slots.iter().filter(|s| s.is_some()).count();
    if extracted == 0 {
        return Err(StoreLensError::UnparseableResponse {
            reason: "no relevance verdicts could be extracted".to_string(),
            raw: raw.to_string(),
        });
    }

    // Default the stragglers to Low and report them as warnings
    let mut fallback_indices = Vec::new();
    let verdicts = slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.unwrap_or_else(|| {
                fallback_indices.push(index);
                RelevanceVerdict {
                    category: RelevanceCategory::Low,
                    justification: "verdict could not be extracted from model output".to_string(),
                }
            })
        })
        .collect();

    if !fallback_indices.is_empty() {
        tracing::warn!(
            fallbacks = fallback_indices.len(),
            total = expected_result_count,
            "some result indices defaulted to Low relevance"
        );
    }

    Ok(ParseOutcome {
        verdicts,
        fallback_indices,
    })
}

/// Extract and decode the JSON object embedded in the response, if any.
///
/// Handles markdown code fences, surrounding prose, and trailing commas.
fn try_strict_parse(raw: &str) -> Option<StrictReply> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }

    let json_str = TRAILING_COMMA.replace_all(&raw[start..=end], "$1");

    match serde_json::from_str::<StrictReply>(&json_str) {
        Ok(reply) => Some(reply),
        Err(e) => {
            tracing::debug!(error = %e, "strict JSON decode failed, falling back to text scan");
            None
        }
    }
}

/// Locate, per unmapped index, the nearest category keyword after that
/// index's marker and capture the trailing text as justification.
fn scan_tolerant(raw: &str, slots: &mut [Option<RelevanceVerdict>]) {
    // Marker positions in document order: (index value, byte offset past marker)
    let markers: Vec<(usize, usize, usize)> = INDEX_MARKER
        .captures_iter(raw)
        .filter_map(|caps| {
            let m = caps.get(0)?;
            let index: usize = caps.get(1)?.as_str().parse().ok()?;
            Some((index, m.start(), m.end()))
        })
        .collect();

    for (marker_pos, &(index, _, marker_end)) in markers.iter().enumerate() {
        if index >= slots.len() || slots[index].is_some() {
            continue;
        }

        let segment_end = markers
            .get(marker_pos + 1)
            .map(|&(_, next_start, _)| next_start)
            .unwrap_or(raw.len());
        let segment = &raw[marker_end..segment_end];

        let Some(keyword) = CATEGORY_KEYWORD.find(segment) else {
            continue;
        };
        let Some(category) = RelevanceCategory::from_label(keyword.as_str()) else {
            continue;
        };

        let justification = segment[keyword.end()..]
            .trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | ',' | '-' | '.' | '"'))
            .to_string();

        slots[index] = Some(RelevanceVerdict {
            category,
            justification,
        });
    }
}
