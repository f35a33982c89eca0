// SPDX-License-Identifier: MIT

//! ScheduledJob: durable intent to fire a node for a participant at or after
//! `run_at`. Drives the scheduler's claim/execute/settle loop.

use crate::ids::{NodeId, ParticipantId, ScheduledJobId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `Done` and `Cancelled` are terminal; the scheduler must never transition a
/// job out of either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Cancelled,
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Running => "running",
        Done => "done",
        Cancelled => "cancelled",
    }
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub id: ScheduledJobId,
    pub participant_id: ParticipantId,
    pub node_id: NodeId,
    pub run_at: DateTime<Utc>,
    pub status: JobStatus,
}

impl ScheduledJob {
    /// Constructs a new Pending job, the only status a job is ever inserted
    /// with.
    pub fn new(participant_id: ParticipantId, node_id: NodeId, run_at: DateTime<Utc>) -> Self {
        Self {
            id: ScheduledJobId::new(),
            participant_id,
            node_id,
            run_at,
            status: JobStatus::Pending,
        }
    }
}

crate::builder! {
    pub struct ScheduledJobBuilder => ScheduledJob {
        set {
            participant_id: ParticipantId = ParticipantId::new(),
            node_id: NodeId = NodeId::new(),
            run_at: DateTime<Utc> = Utc::now(),
            status: JobStatus = JobStatus::Pending
        }
        computed { id: ScheduledJobId = ScheduledJobId::new() }
    }
}
