// SPDX-License-Identifier: MIT

use dashmsg_core::{ConditionOperation, NodeCondition, ParticipantVariable, Variable, VariableId};
use std::collections::HashMap;

/// Evaluates AND across every condition attached to a node.
///
/// `variables` resolves a condition's variable to its declared type;
/// `participant_vars` resolves it to whatever the participant has stored so
/// far. Both are keyed by [`VariableId`] so the engine can pass in
/// project-scoped maps without re-fetching per condition.
pub fn conditions_satisfied(
    conditions: &[NodeCondition],
    variables: &HashMap<VariableId, Variable>,
    participant_vars: &HashMap<VariableId, ParticipantVariable>,
) -> bool {
    conditions
        .iter()
        .all(|condition| condition_satisfied(condition, variables, participant_vars))
}

fn condition_satisfied(
    condition: &NodeCondition,
    variables: &HashMap<VariableId, Variable>,
    participant_vars: &HashMap<VariableId, ParticipantVariable>,
) -> bool {
    let Some(stored) = participant_vars.get(&condition.variable_id) else {
        return false;
    };

    let is_integer = variables
        .get(&condition.variable_id)
        .is_some_and(|v| v.var_type.is_integer_like());

    if is_integer {
        integer_condition_satisfied(condition, stored)
    } else {
        text_condition_satisfied(condition, stored)
    }
}

fn integer_condition_satisfied(condition: &NodeCondition, stored: &ParticipantVariable) -> bool {
    let Some(actual) = stored.value_int else {
        return false;
    };

    match condition.expected_answer.trim().parse::<i64>() {
        Ok(expected) => match condition.operation {
            ConditionOperation::Equal => actual == expected,
            ConditionOperation::Gt => actual > expected,
            ConditionOperation::Gte => actual >= expected,
            ConditionOperation::Lt => actual < expected,
            ConditionOperation::Lte => actual <= expected,
            // Unknown operation (In/NotIn aren't meaningful against a scalar
            // integer) falls back to equality.
            ConditionOperation::In | ConditionOperation::NotIn => actual == expected,
        },
        // Legacy fallback: bare numeric thresholds seeded without a parsed
        // expected value still evaluate against a fixed threshold of 5.
        Err(_) => match condition.operation {
            ConditionOperation::Gt => actual > 5,
            ConditionOperation::Lte => actual <= 5,
            _ => false,
        },
    }
}

fn text_condition_satisfied(condition: &NodeCondition, stored: &ParticipantVariable) -> bool {
    let Some(actual) = stored.value_text.as_deref() else {
        return false;
    };
    let actual = actual.trim().to_lowercase();
    let expected = condition.expected_answer.trim().to_lowercase();
    // Only `equal` is meaningful for text; every other operation falls back
    // to equality rather than failing outright.
    actual == expected
}
