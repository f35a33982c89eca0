// SPDX-License-Identifier: MIT

//! Stage 1 of `processInbound`: decide what a matched (or alias-implied)
//! keyword means, without touching the store.

use dashmsg_core::{Keyword, KeywordActionType, NodeId, ACTIVATE_ALIASES, DEACTIVATE_ALIASES};

/// The dispatch decision for a normalized inbound key, independent of the
/// store so it can be unit-tested directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage1Action {
    Deactivate { referenced_node: Option<NodeId> },
    Activate { referenced_node: Option<NodeId> },
    MoveToNode { referenced_node: Option<NodeId> },
}

/// Resolves the effective Stage 1 action for a normalized `key`.
///
/// A seeded `Keyword` row, when present, always wins over the literal
/// aliases — `iselect`/`ibuy`/`iexit` only kick in when no project-specific
/// keyword was configured for that text (§4.D, §9 "keyword precedence").
pub fn resolve_stage1(key: &str, keyword: Option<&Keyword>) -> Option<Stage1Action> {
    if let Some(keyword) = keyword {
        return Some(match keyword.action_type {
            KeywordActionType::ActivateParticipant => Stage1Action::Activate {
                referenced_node: keyword.referenced_node_id,
            },
            KeywordActionType::DeactivateParticipant => Stage1Action::Deactivate {
                referenced_node: keyword.referenced_node_id,
            },
            KeywordActionType::MoveToNode => Stage1Action::MoveToNode {
                referenced_node: keyword.referenced_node_id,
            },
        });
    }

    if DEACTIVATE_ALIASES.contains(&key) {
        return Some(Stage1Action::Deactivate { referenced_node: None });
    }
    if ACTIVATE_ALIASES.contains(&key) {
        return Some(Stage1Action::Activate { referenced_node: None });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword(action_type: KeywordActionType, referenced_node: Option<NodeId>) -> Keyword {
        Keyword::builder()
            .action_type(action_type)
            .referenced_node_id(referenced_node)
            .build()
    }

    #[test]
    fn configured_keyword_wins_over_alias_shape() {
        let node = NodeId::new();
        let k = keyword(KeywordActionType::MoveToNode, Some(node));
        assert_eq!(
            resolve_stage1("iexit", Some(&k)),
            Some(Stage1Action::MoveToNode { referenced_node: Some(node) })
        );
    }

    #[test]
    fn iexit_alias_deactivates_without_a_keyword_row() {
        assert_eq!(
            resolve_stage1("iexit", None),
            Some(Stage1Action::Deactivate { referenced_node: None })
        );
    }

    #[test]
    fn iselect_and_ibuy_aliases_activate_without_a_keyword_row() {
        assert_eq!(
            resolve_stage1("iselect", None),
            Some(Stage1Action::Activate { referenced_node: None })
        );
        assert_eq!(
            resolve_stage1("ibuy", None),
            Some(Stage1Action::Activate { referenced_node: None })
        );
    }

    #[test]
    fn unmatched_text_falls_through_to_stage_two() {
        assert_eq!(resolve_stage1("hello", None), None);
    }

    #[test]
    fn configured_activate_keyword_carries_its_referenced_node() {
        let node = NodeId::new();
        let k = keyword(KeywordActionType::ActivateParticipant, Some(node));
        assert_eq!(
            resolve_stage1("start", Some(&k)),
            Some(Stage1Action::Activate { referenced_node: Some(node) })
        );
    }
}
