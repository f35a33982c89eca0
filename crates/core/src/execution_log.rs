// SPDX-License-Identifier: MIT

//! NodeExecutionLog (AGV, "Automatic Generated Variable"): a timestamp row
//! recording that a specific node fired for a specific participant.
//!
//! A node may fire more than once for the same participant if re-enrolled
//! (I6); this table is append-only, never upserted.

use crate::ids::{NodeExecutionLogId, NodeId, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeExecutionLog {
    pub id: NodeExecutionLogId,
    pub participant_id: ParticipantId,
    pub node_id: NodeId,
    pub executed_at: DateTime<Utc>,
}

impl NodeExecutionLog {
    pub fn new(participant_id: ParticipantId, node_id: NodeId, executed_at: DateTime<Utc>) -> Self {
        Self {
            id: NodeExecutionLogId::new(),
            participant_id,
            node_id,
            executed_at,
        }
    }
}

crate::builder! {
    pub struct NodeExecutionLogBuilder => NodeExecutionLog {
        set {
            participant_id: ParticipantId = ParticipantId::new(),
            node_id: NodeId = NodeId::new(),
            executed_at: DateTime<Utc> = Utc::now()
        }
        computed { id: NodeExecutionLogId = NodeExecutionLogId::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_produces_distinct_ids_per_call() {
        let a = NodeExecutionLog::builder().build();
        let b = NodeExecutionLog::builder().build();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn new_produces_distinct_ids_per_call() {
        let now = Utc::now();
        let a = NodeExecutionLog::new(ParticipantId::new(), NodeId::new(), now);
        let b = NodeExecutionLog::new(ParticipantId::new(), NodeId::new(), now);
        assert_ne!(a.id, b.id);
    }
}
