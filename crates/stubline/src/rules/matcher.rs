//! First-match-wins rule selection.
//!
//! Rules are scanned in stored order. A rule matches when its path, method,
//! identifier and payload predicates all accept the request.

use super::types::{RequestDescriptor, RuleSpec};
use serde_json::{Map, Value};

/// Find the first rule that matches the request.
pub fn find_match<'a>(rules: &'a [RuleSpec], request: &RequestDescriptor) -> Option<&'a RuleSpec> {
    find_match_index(rules, request).map(|index| &rules[index])
}

/// Position of the first rule that matches the request.
pub fn find_match_index(rules: &[RuleSpec], request: &RequestDescriptor) -> Option<usize> {
    rules.iter().position(|rule| rule_matches(rule, request))
}

/// Check if a single rule accepts the request (implicit AND of all predicates)
pub fn rule_matches(rule: &RuleSpec, request: &RequestDescriptor) -> bool {
    rule.request_url == request.path
        && rule.request_method.eq_ignore_ascii_case(&request.method)
        && identifier_matches(rule.unique_identifier.as_deref(), request.unique_identifier.as_deref())
        && payload_matches(rule.request_payload.as_ref(), &request.body)
}

fn identifier_matches(expected: Option<&str>, actual: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(expected) => actual == Some(expected),
    }
}

/// Every expected key must be present in the body with an equal value; extra body keys are ignored.
fn payload_matches(expected: Option<&Map<String, Value>>, body: &Map<String, Value>) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    expected
        .iter()
        .all(|(key, value)| body.get(key).is_some_and(|actual| actual == value))
}
