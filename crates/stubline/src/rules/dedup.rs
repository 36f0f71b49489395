//! Duplicate detection for rule ingestion.
//!
//! A candidate duplicates an existing rule when the identifiers and URLs are
//! equal and at least one of the candidate's payload entries is also present,
//! with the same value, in the existing rule's payload. Only one overlapping
//! entry is needed. A candidate without a payload has nothing to overlap and
//! is therefore always appended.

use super::types::RuleSpec;
use serde::Serialize;

/// Outcome of appending a batch of rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub added: usize,
    pub duplicates: usize,
}

/// Check if `candidate` duplicates `existing`.
pub fn is_duplicate(existing: &RuleSpec, candidate: &RuleSpec) -> bool {
    if existing.unique_identifier != candidate.unique_identifier
        || existing.request_url != candidate.request_url
    {
        return false;
    }

    let Some(candidate_payload) = &candidate.request_payload else {
        return false;
    };
    let Some(existing_payload) = &existing.request_payload else {
        return false;
    };

    candidate_payload
        .iter()
        .any(|(key, value)| existing_payload.get(key) == Some(value))
}

/// Append non-duplicate candidates to `rules` in arrival order.
///
/// Each candidate is checked against the set as it grows, so a batch that
/// repeats itself only adds the first copy.
pub fn merge_rules(rules: &mut Vec<RuleSpec>, candidates: Vec<RuleSpec>) -> IngestSummary {
    let mut summary = IngestSummary::default();

    for candidate in candidates {
        if rules.iter().any(|existing| is_duplicate(existing, &candidate)) {
            summary.duplicates += 1;
        } else {
            rules.push(candidate);
            summary.added += 1;
        }
    }

    summary
}
