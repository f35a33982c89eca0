// SPDX-License-Identifier: MIT

//! Stage 2 of `processInbound`: the accepted-answer set for a poll template.
//!
//! The engine never uses this set to reject an answer — §7 is explicit that
//! invalid answers are still stored as-is. It exists so the host can log
//! whether an answer looked valid, and so rating polls declared without an
//! explicit choice list still recognize a bare 1-10 reply.

use dashmsg_core::MessageTemplate;
use std::collections::HashSet;

fn rating_range() -> impl Iterator<Item = String> {
    (1..=10).map(|n| n.to_string())
}

/// Builds the accepted-answer set for `template`, given the normalized
/// (lower-cased, trimmed) inbound key.
pub fn accepted_answers(template: &MessageTemplate, key: &str) -> HashSet<String> {
    if !template.has_choices() {
        let mut universal: HashSet<String> = ["yes", "no"].iter().map(|s| s.to_string()).collect();
        universal.extend(rating_range());
        return universal;
    }

    let mut set = template.choice_set();
    if let Ok(n) = key.parse::<i64>() {
        if (1..=10).contains(&n) {
            set.extend(rating_range());
        }
    }
    set
}
