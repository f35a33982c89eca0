// SPDX-License-Identifier: MIT

//! The persistence boundary the engine and scheduler are coded against.
//!
//! `Store::begin` opens one unit of work; every read and write inside a
//! single flow-model operation (executeNode, processInbound) goes through
//! the same `StoreTx` so that the final `commit` is all-or-nothing. The
//! scheduler's claim/settle operations are intentionally *not* part of a
//! `StoreTx` — each is its own short transaction, because the claim step
//! must be visible to competing pollers before the execution step runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmsg_core::{
    Keyword, MessageTemplate, MessageTemplateId, Node, NodeExecutionLog, NodeId, Participant,
    ParticipantId, ParticipantMessage, ParticipantStatus, ParticipantVariable, ProjectId,
    ScheduledJob, ScheduledJobId, TimingElement, TimingElementId, Variable, VariableId,
};
use std::collections::HashMap;

use crate::error::StoreError;

/// The second key used to look up nodes by their activation rule (§4.A).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationFilter {
    AfterNode(NodeId),
    AfterPoll(MessageTemplateId),
    AfterDateTimeVar(VariableId),
    StartDate,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn begin<'a>(&'a self) -> Result<Box<dyn StoreTx + 'a>, StoreError>;

    /// Claims up to `limit` Pending jobs due at or before `now`, ordered by
    /// `run_at` ascending, transitioning each to Running. Must be a
    /// conditional update (`WHERE status = 'pending'`) so that a second
    /// concurrent poller claiming the same row loses the race (§5).
    async fn claim_due_jobs(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ScheduledJob>, StoreError>;

    /// Running -> Done.
    async fn mark_job_done(&self, job_id: ScheduledJobId) -> Result<(), StoreError>;

    /// Running -> Pending, for retry on the next tick after a failed
    /// execution attempt.
    async fn requeue_job(&self, job_id: ScheduledJobId) -> Result<(), StoreError>;

    /// Running -> Pending for every job still marked Running, run once at
    /// daemon startup. A job can only be Running while a scheduler instance
    /// holds it mid-tick; any row still Running at process start belongs to
    /// a crashed prior instance and is safe to re-claim.
    async fn reclaim_stale_running_jobs(&self) -> Result<usize, StoreError>;
}

#[async_trait]
pub trait StoreTx: Send {
    async fn get_participant(
        &mut self,
        id: ParticipantId,
    ) -> Result<Option<Participant>, StoreError>;
    async fn get_node(&mut self, id: NodeId) -> Result<Option<Node>, StoreError>;
    async fn get_message_template(
        &mut self,
        id: MessageTemplateId,
    ) -> Result<Option<MessageTemplate>, StoreError>;
    async fn get_variable(&mut self, id: VariableId) -> Result<Option<Variable>, StoreError>;
    async fn get_timing_element(
        &mut self,
        id: TimingElementId,
    ) -> Result<Option<TimingElement>, StoreError>;
    async fn get_variable_by_name(
        &mut self,
        project_id: ProjectId,
        name: &str,
    ) -> Result<Option<Variable>, StoreError>;

    async fn nodes_by_activation(
        &mut self,
        project_id: ProjectId,
        filter: ActivationFilter,
    ) -> Result<Vec<Node>, StoreError>;

    async fn keywords_by_text(
        &mut self,
        project_id: ProjectId,
        text: &str,
    ) -> Result<Vec<Keyword>, StoreError>;

    /// All variables a project declares, keyed by id; used by the evaluator
    /// to classify conditions as integer- or text-typed.
    async fn variables_by_project(
        &mut self,
        project_id: ProjectId,
    ) -> Result<HashMap<VariableId, Variable>, StoreError>;

    async fn participant_variables(
        &mut self,
        participant_id: ParticipantId,
    ) -> Result<HashMap<VariableId, ParticipantVariable>, StoreError>;

    /// The most recent Outbound message for this participant whose bound
    /// template has type Poll, paired with that template.
    async fn last_outbound_poll_message(
        &mut self,
        participant_id: ParticipantId,
    ) -> Result<Option<(ParticipantMessage, MessageTemplate)>, StoreError>;

    async fn messages(
        &mut self,
        participant_id: ParticipantId,
    ) -> Result<Vec<ParticipantMessage>, StoreError>;

    async fn execution_logs(
        &mut self,
        participant_id: ParticipantId,
    ) -> Result<Vec<NodeExecutionLog>, StoreError>;

    async fn insert_participant(&mut self, participant: &Participant) -> Result<(), StoreError>;
    async fn upsert_participant_variable(
        &mut self,
        var: &ParticipantVariable,
    ) -> Result<(), StoreError>;
    async fn insert_participant_message(
        &mut self,
        message: &ParticipantMessage,
    ) -> Result<(), StoreError>;
    async fn insert_execution_log(&mut self, log: &NodeExecutionLog) -> Result<(), StoreError>;
    async fn insert_scheduled_job(&mut self, job: &ScheduledJob) -> Result<(), StoreError>;
    async fn set_participant_status(
        &mut self,
        id: ParticipantId,
        status: ParticipantStatus,
    ) -> Result<(), StoreError>;

    /// Transitions every Pending job for this participant to Cancelled.
    async fn cancel_pending_jobs(&mut self, participant_id: ParticipantId)
        -> Result<(), StoreError>;

    /// Removes a project, its definitions, and every participant enrolled in
    /// it (and their messages/variables/logs/jobs).
    async fn delete_project_cascade(&mut self, project_id: ProjectId) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
