// SPDX-License-Identifier: MIT

//! Keyword: project-scoped inbound-text trigger.

use crate::ids::{KeywordId, NodeId, ProjectId, VariableId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordActionType {
    ActivateParticipant,
    DeactivateParticipant,
    /// Extension point: schedule `referenced_node` immediately.
    MoveToNode,
}

crate::simple_display! {
    KeywordActionType {
        ActivateParticipant => "activate_participant",
        DeactivateParticipant => "deactivate_participant",
        MoveToNode => "move_to_node",
    }
}

/// Literal keyword text accepted alongside configured `ActivateParticipant` rows.
pub const ACTIVATE_ALIASES: [&str; 2] = ["iselect", "ibuy"];
/// Literal keyword text accepted alongside configured `DeactivateParticipant` rows.
pub const DEACTIVATE_ALIASES: [&str; 1] = ["iexit"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyword {
    pub id: KeywordId,
    pub project_id: ProjectId,
    pub keyword_text: String,
    pub language: String,
    pub action_type: KeywordActionType,
    pub referenced_node_id: Option<NodeId>,
    pub referenced_variable_id: Option<VariableId>,
}

impl Keyword {
    /// Normalized matching key: the engine compares lower-cased trimmed input
    /// against this field.
    pub fn normalized_text(&self) -> String {
        self.keyword_text.trim().to_lowercase()
    }
}

crate::builder! {
    pub struct KeywordBuilder => Keyword {
        into { keyword_text: String = "iselect", language: String = "english" }
        set {
            project_id: ProjectId = ProjectId::new(),
            action_type: KeywordActionType = KeywordActionType::ActivateParticipant,
            referenced_node_id: Option<NodeId> = None,
            referenced_variable_id: Option<VariableId> = None
        }
        computed { id: KeywordId = KeywordId::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_text_trims_and_lowercases() {
        let keyword = Keyword::builder().keyword_text("  ISELECT  ").build();
        assert_eq!(keyword.normalized_text(), "iselect");
    }
}
