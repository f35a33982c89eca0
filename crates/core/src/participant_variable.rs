// SPDX-License-Identifier: MIT

//! ParticipantVariable: one row per `(participant, variable)`, upserted on
//! poll answers and enrollment.

use crate::ids::{ParticipantId, VariableId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipantVariable {
    pub participant_id: ParticipantId,
    pub variable_id: VariableId,
    pub value_text: Option<String>,
    pub value_int: Option<i64>,
    pub value_datetime: Option<DateTime<Utc>>,
}

impl ParticipantVariable {
    pub fn new(participant_id: ParticipantId, variable_id: VariableId) -> Self {
        Self {
            participant_id,
            variable_id,
            value_text: None,
            value_int: None,
            value_datetime: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_starts_with_all_values_unset() {
        let var = ParticipantVariable::new(ParticipantId::new(), VariableId::new());
        assert!(var.value_text.is_none());
        assert!(var.value_int.is_none());
        assert!(var.value_datetime.is_none());
    }
}
