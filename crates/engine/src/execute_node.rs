// SPDX-License-Identifier: MIT

//! `executeNode`: send one templated message, log it, and schedule whatever
//! becomes eligible as a result.

use chrono::{DateTime, Utc};
use dashmsg_core::{Clock, MessageDirection, NodeExecutionLog, NodeId, ParticipantId, ParticipantMessage};
use dashmsg_eval::resolve_text;
use dashmsg_store::{ActivationFilter, Store, StoreError, StoreTx};

use crate::scheduling::{schedule_eligible_at_fixed_time, timing_for_node};
use crate::{Engine, EngineError};

impl<S, C> Engine<S, C>
where
    S: Store,
    C: Clock,
{
    /// Precondition checks (participant missing/inactive, node not in the
    /// participant's project, template missing) return `Ok(None)` with no
    /// side effects; this is the flow declining to fire, not an error.
    pub async fn execute_node(
        &self,
        participant_id: ParticipantId,
        node_id: NodeId,
    ) -> Result<Option<ParticipantMessage>, EngineError> {
        let mut tx = self.store.begin().await?;
        let now = self.clock.now();
        match execute_node_tx(tx.as_mut(), now, participant_id, node_id).await {
            Ok(Some(message)) => {
                tx.commit().await?;
                tracing::info!(%participant_id, %node_id, "node executed");
                Ok(Some(message))
            }
            Ok(None) => {
                tx.rollback().await?;
                tracing::warn!(%participant_id, %node_id, "node execution skipped: precondition not met");
                Ok(None)
            }
            Err(err) => {
                tx.rollback().await?;
                tracing::error!(%participant_id, %node_id, error = %err, "node execution failed");
                Err(err.into())
            }
        }
    }
}

/// The transaction-scoped core of `executeNode`, reused by `processInbound`
/// when a Deactivate keyword's exit broadcast must fire inside the same
/// atomic operation as the deactivation itself.
pub(crate) async fn execute_node_tx(
    tx: &mut dyn StoreTx,
    now: DateTime<Utc>,
    participant_id: ParticipantId,
    node_id: NodeId,
) -> Result<Option<ParticipantMessage>, StoreError> {
    let Some(participant) = tx.get_participant(participant_id).await? else {
        return Ok(None);
    };
    if !participant.is_active() {
        return Ok(None);
    }

    let Some(node) = tx.get_node(node_id).await? else {
        return Ok(None);
    };
    if node.project_id != participant.project_id {
        return Ok(None);
    }

    let Some(template) = tx.get_message_template(node.message_template_id).await? else {
        return Ok(None);
    };

    let text = resolve_text(&template, &participant.language);
    let message = ParticipantMessage::new(
        participant_id,
        MessageDirection::Outbound,
        Some(template.id),
        text,
        now,
    );
    tx.insert_participant_message(&message).await?;

    let log = NodeExecutionLog::new(participant_id, node_id, now);
    tx.insert_execution_log(&log).await?;

    let run_at = now + timing_for_node(tx, &node).await?;
    let dependents = tx
        .nodes_by_activation(node.project_id, ActivationFilter::AfterNode(node_id))
        .await?;
    let variables = tx.variables_by_project(node.project_id).await?;
    let participant_vars = tx.participant_variables(participant_id).await?;
    schedule_eligible_at_fixed_time(
        tx,
        participant_id,
        &dependents,
        &variables,
        &participant_vars,
        run_at,
    )
    .await?;

    Ok(Some(message))
}
