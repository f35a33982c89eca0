// SPDX-License-Identifier: MIT

//! Shared job-scheduling helpers used by both `execute_node` (dependents of a
//! firing node, all sharing the firing node's delay) and `process_inbound`
//! (dependents of a poll answer or activation, each using its own delay).

use chrono::{DateTime, Duration, Utc};
use dashmsg_core::{Node, ParticipantId, ParticipantVariable, ScheduledJob, Variable, VariableId};
use dashmsg_eval::{conditions_satisfied, timing_to_duration};
use dashmsg_store::{StoreError, StoreTx};
use std::collections::HashMap;

/// Resolves a node's own `schedule_timing` to a duration, fetching the
/// `TimingElement` row if one is set.
pub async fn timing_for_node(tx: &mut dyn StoreTx, node: &Node) -> Result<Duration, StoreError> {
    let timing = match node.schedule_timing_id {
        Some(id) => tx.get_timing_element(id).await?,
        None => None,
    };
    Ok(timing_to_duration(timing.as_ref()))
}

/// Inserts a Pending job for every `candidate` whose conditions pass,
/// sharing one `run_at` — the firing node's own delay, not each dependent's.
pub async fn schedule_eligible_at_fixed_time(
    tx: &mut dyn StoreTx,
    participant_id: ParticipantId,
    candidates: &[Node],
    variables: &HashMap<VariableId, Variable>,
    participant_vars: &HashMap<VariableId, ParticipantVariable>,
    run_at: DateTime<Utc>,
) -> Result<usize, StoreError> {
    let mut scheduled = 0;
    for node in candidates {
        if conditions_satisfied(&node.conditions, variables, participant_vars) {
            let job = ScheduledJob::new(participant_id, node.id, run_at);
            tx.insert_scheduled_job(&job).await?;
            scheduled += 1;
        }
    }
    Ok(scheduled)
}

/// Inserts a Pending job for every `candidate` whose conditions pass, with
/// each job's `run_at` computed from that candidate's own `schedule_timing`
/// relative to `now` (processInbound's activation/poll-answer scheduling).
pub async fn schedule_eligible_with_own_timing(
    tx: &mut dyn StoreTx,
    participant_id: ParticipantId,
    candidates: &[Node],
    variables: &HashMap<VariableId, Variable>,
    participant_vars: &HashMap<VariableId, ParticipantVariable>,
    now: DateTime<Utc>,
) -> Result<usize, StoreError> {
    let mut scheduled = 0;
    for node in candidates {
        if conditions_satisfied(&node.conditions, variables, participant_vars) {
            let run_at = now + timing_for_node(tx, node).await?;
            let job = ScheduledJob::new(participant_id, node.id, run_at);
            tx.insert_scheduled_job(&job).await?;
            scheduled += 1;
        }
    }
    Ok(scheduled)
}
