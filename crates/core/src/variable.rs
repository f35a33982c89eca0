// SPDX-License-Identifier: MIT

//! Variable: a typed slot scoped to a project, bound per-participant.

use crate::ids::{ProjectId, VariableId};
use serde::{Deserialize, Serialize};

/// The system DateTime variable set to the moment of (re)activation.
/// Anchors `StartDate`-activated nodes.
pub const START_DATE_VARIABLE_NAME: &str = "Start_Date";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    Integer,
    Text,
    DateTime,
    Time,
    None,
}

crate::simple_display! {
    VariableType {
        Integer => "integer",
        Text => "text",
        DateTime => "datetime",
        Time => "time",
        None => "none",
    }
}

impl VariableType {
    /// Mirrors the legacy condition-evaluation rule: any type whose name
    /// *contains* "int" (case-insensitive) is treated as integer-typed.
    pub fn is_integer_like(self) -> bool {
        self.to_string().to_lowercase().contains("int")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub id: VariableId,
    pub project_id: ProjectId,
    pub name: String,
    pub var_type: VariableType,
    pub is_system: bool,
    pub is_agv: bool,
}

impl Variable {
    pub fn is_start_date(&self) -> bool {
        self.is_system && self.name == START_DATE_VARIABLE_NAME
    }
}

crate::builder! {
    pub struct VariableBuilder => Variable {
        into { name: String = "test_variable" }
        set {
            project_id: ProjectId = ProjectId::new(),
            var_type: VariableType = VariableType::Text,
            is_system: bool = false,
            is_agv: bool = false
        }
        computed { id: VariableId = VariableId::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        integer = { VariableType::Integer, true },
        text = { VariableType::Text, false },
        datetime = { VariableType::DateTime, false },
        time = { VariableType::Time, false },
        none = { VariableType::None, false },
    )]
    fn is_integer_like_matches_legacy_substring_rule(var_type: VariableType, expected: bool) {
        assert_eq!(var_type.is_integer_like(), expected);
    }

    #[test]
    fn start_date_requires_system_flag_and_name() {
        let variable = Variable::builder()
            .name(START_DATE_VARIABLE_NAME)
            .is_system(true)
            .var_type(VariableType::DateTime)
            .build();
        assert!(variable.is_start_date());
    }

    #[test]
    fn non_system_start_date_named_variable_is_not_start_date() {
        let variable = Variable::builder().name(START_DATE_VARIABLE_NAME).build();
        assert!(!variable.is_start_date());
    }
}
