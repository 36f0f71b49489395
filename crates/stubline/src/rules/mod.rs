//! Rule specifications and the pure logic that operates on them.
//!
//! ## Module Structure
//!
//! - `types`: `RuleSpec` and `RequestDescriptor`
//! - `matcher`: first-match-wins selection of a rule for a request
//! - `dedup`: duplicate detection when appending rules to a rule set

mod dedup;
mod matcher;
mod types;

pub use dedup::{is_duplicate, merge_rules, IngestSummary};
pub use matcher::{find_match, find_match_index, rule_matches};
pub use types::{RequestDescriptor, RuleSpec};
