// SPDX-License-Identifier: MIT

//! In-memory Store used by engine/scheduler tests. Mirrors the semantics the
//! Postgres store provides (including the conditional claim update) without
//! needing a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmsg_core::{
    Keyword, MessageTemplate, MessageTemplateId, Node, NodeExecutionLog, NodeId, Participant,
    ParticipantId, ParticipantMessage, ParticipantStatus, ParticipantVariable, ProjectId,
    ScheduledJob, ScheduledJobId, TimingElement, TimingElementId, Variable, VariableId, Activation,
    JobStatus, MessageDirection,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::StoreError;
use crate::traits::{ActivationFilter, Store, StoreTx};

#[derive(Debug, Default, Clone)]
struct State {
    participants: HashMap<ParticipantId, Participant>,
    nodes: HashMap<NodeId, Node>,
    templates: HashMap<MessageTemplateId, MessageTemplate>,
    variables: HashMap<VariableId, Variable>,
    timings: HashMap<TimingElementId, TimingElement>,
    keywords: Vec<Keyword>,
    participant_variables: HashMap<(ParticipantId, VariableId), ParticipantVariable>,
    messages: Vec<ParticipantMessage>,
    logs: Vec<NodeExecutionLog>,
    jobs: HashMap<ScheduledJobId, ScheduledJob>,
}

/// Fixture-loading and inspection handle, shared with the `StoreTx`/`Store`
/// impls through an `Arc<Mutex<_>>`.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_project(
        &self,
        nodes: Vec<Node>,
        templates: Vec<MessageTemplate>,
        variables: Vec<Variable>,
        keywords: Vec<Keyword>,
        timings: Vec<TimingElement>,
    ) {
        let mut state = self.state.lock();
        for node in nodes {
            state.nodes.insert(node.id, node);
        }
        for template in templates {
            state.templates.insert(template.id, template);
        }
        for variable in variables {
            state.variables.insert(variable.id, variable);
        }
        for timing in timings {
            state.timings.insert(timing.id, timing);
        }
        state.keywords.extend(keywords);
    }

    pub fn seed_participant(&self, participant: Participant) {
        self.state.lock().participants.insert(participant.id, participant);
    }

    pub fn messages_for(&self, participant_id: ParticipantId) -> Vec<ParticipantMessage> {
        let mut messages: Vec<_> = self
            .state
            .lock()
            .messages
            .iter()
            .filter(|m| m.participant_id == participant_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        messages
    }

    pub fn jobs_for(&self, participant_id: ParticipantId) -> Vec<ScheduledJob> {
        self.state
            .lock()
            .jobs
            .values()
            .filter(|j| j.participant_id == participant_id)
            .cloned()
            .collect()
    }

    pub fn participant(&self, id: ParticipantId) -> Option<Participant> {
        self.state.lock().participants.get(&id).cloned()
    }

    pub fn participant_variables_for(
        &self,
        participant_id: ParticipantId,
    ) -> HashMap<VariableId, ParticipantVariable> {
        self.state
            .lock()
            .participant_variables
            .iter()
            .filter(|((pid, _), _)| *pid == participant_id)
            .map(|((_, vid), var)| (*vid, var.clone()))
            .collect()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn begin<'a>(&'a self) -> Result<Box<dyn StoreTx + 'a>, StoreError> {
        let snapshot = self.state.lock().clone();
        Ok(Box::new(InMemoryTx {
            root: &self.state,
            working: snapshot,
        }))
    }

    async fn claim_due_jobs(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ScheduledJob>, StoreError> {
        let mut state = self.state.lock();
        let mut due: Vec<ScheduledJobId> = state
            .jobs
            .values()
            .filter(|j| j.status == JobStatus::Pending && j.run_at <= now)
            .map(|j| j.id)
            .collect();
        due.sort_by_key(|id| state.jobs[id].run_at);
        due.truncate(limit.max(0) as usize);

        let mut claimed = Vec::with_capacity(due.len());
        for id in due {
            if let Some(job) = state.jobs.get_mut(&id) {
                if job.status == JobStatus::Pending {
                    job.status = JobStatus::Running;
                    claimed.push(job.clone());
                }
            }
        }
        Ok(claimed)
    }

    async fn mark_job_done(&self, job_id: ScheduledJobId) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        if let Some(job) = state.jobs.get_mut(&job_id) {
            job.status = JobStatus::Done;
        }
        Ok(())
    }

    async fn requeue_job(&self, job_id: ScheduledJobId) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        if let Some(job) = state.jobs.get_mut(&job_id) {
            job.status = JobStatus::Pending;
        }
        Ok(())
    }

    async fn reclaim_stale_running_jobs(&self) -> Result<usize, StoreError> {
        let mut state = self.state.lock();
        let mut reclaimed = 0;
        for job in state.jobs.values_mut() {
            if job.status == JobStatus::Running {
                job.status = JobStatus::Pending;
                reclaimed += 1;
            }
        }
        Ok(reclaimed)
    }
}

/// A transaction over the in-memory store: reads and writes apply to a
/// private clone of the state, merged back into the shared state only on
/// `commit`. `rollback` (or a dropped transaction) discards the clone.
struct InMemoryTx<'a> {
    root: &'a Mutex<State>,
    working: State,
}

#[async_trait]
impl<'a> StoreTx for InMemoryTx<'a> {
    async fn get_participant(
        &mut self,
        id: ParticipantId,
    ) -> Result<Option<Participant>, StoreError> {
        Ok(self.working.participants.get(&id).cloned())
    }

    async fn get_node(&mut self, id: NodeId) -> Result<Option<Node>, StoreError> {
        Ok(self.working.nodes.get(&id).cloned())
    }

    async fn get_message_template(
        &mut self,
        id: MessageTemplateId,
    ) -> Result<Option<MessageTemplate>, StoreError> {
        Ok(self.working.templates.get(&id).cloned())
    }

    async fn get_variable(&mut self, id: VariableId) -> Result<Option<Variable>, StoreError> {
        Ok(self.working.variables.get(&id).cloned())
    }

    async fn get_timing_element(
        &mut self,
        id: TimingElementId,
    ) -> Result<Option<TimingElement>, StoreError> {
        Ok(self.working.timings.get(&id).cloned())
    }

    async fn get_variable_by_name(
        &mut self,
        project_id: ProjectId,
        name: &str,
    ) -> Result<Option<Variable>, StoreError> {
        Ok(self
            .working
            .variables
            .values()
            .find(|v| v.project_id == project_id && v.name == name)
            .cloned())
    }

    async fn nodes_by_activation(
        &mut self,
        project_id: ProjectId,
        filter: ActivationFilter,
    ) -> Result<Vec<Node>, StoreError> {
        Ok(self
            .working
            .nodes
            .values()
            .filter(|n| n.project_id == project_id)
            .filter(|n| match (&n.activation, filter) {
                (Activation::AfterNode(src), ActivationFilter::AfterNode(want)) => *src == want,
                (Activation::AfterPoll(src), ActivationFilter::AfterPoll(want)) => *src == want,
                (Activation::AfterDateTimeVar(src), ActivationFilter::AfterDateTimeVar(want)) => {
                    *src == want
                }
                (Activation::StartDate(_), ActivationFilter::StartDate) => true,
                _ => false,
            })
            .cloned()
            .collect())
    }

    async fn keywords_by_text(
        &mut self,
        project_id: ProjectId,
        text: &str,
    ) -> Result<Vec<Keyword>, StoreError> {
        Ok(self
            .working
            .keywords
            .iter()
            .filter(|k| k.project_id == project_id && k.normalized_text() == text)
            .cloned()
            .collect())
    }

    async fn variables_by_project(
        &mut self,
        project_id: ProjectId,
    ) -> Result<HashMap<VariableId, Variable>, StoreError> {
        Ok(self
            .working
            .variables
            .iter()
            .filter(|(_, v)| v.project_id == project_id)
            .map(|(id, v)| (*id, v.clone()))
            .collect())
    }

    async fn participant_variables(
        &mut self,
        participant_id: ParticipantId,
    ) -> Result<HashMap<VariableId, ParticipantVariable>, StoreError> {
        Ok(self
            .working
            .participant_variables
            .iter()
            .filter(|((pid, _), _)| *pid == participant_id)
            .map(|((_, vid), pv)| (*vid, pv.clone()))
            .collect())
    }

    async fn last_outbound_poll_message(
        &mut self,
        participant_id: ParticipantId,
    ) -> Result<Option<(ParticipantMessage, MessageTemplate)>, StoreError> {
        let templates = &self.working.templates;
        let mut candidates: Vec<_> = self
            .working
            .messages
            .iter()
            .filter(|m| m.participant_id == participant_id && m.direction == MessageDirection::Outbound)
            .filter_map(|m| {
                let template_id = m.template_id?;
                let template = templates.get(&template_id)?;
                template.is_poll().then(|| (m.clone(), template.clone()))
            })
            .collect();
        candidates.sort_by_key(|(m, _)| m.created_at);
        Ok(candidates.pop())
    }

    async fn messages(
        &mut self,
        participant_id: ParticipantId,
    ) -> Result<Vec<ParticipantMessage>, StoreError> {
        let mut messages: Vec<_> = self
            .working
            .messages
            .iter()
            .filter(|m| m.participant_id == participant_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn execution_logs(
        &mut self,
        participant_id: ParticipantId,
    ) -> Result<Vec<NodeExecutionLog>, StoreError> {
        let mut logs: Vec<_> = self
            .working
            .logs
            .iter()
            .filter(|l| l.participant_id == participant_id)
            .cloned()
            .collect();
        logs.sort_by_key(|l| l.executed_at);
        Ok(logs)
    }

    async fn insert_participant(&mut self, participant: &Participant) -> Result<(), StoreError> {
        self.working.participants.insert(participant.id, participant.clone());
        Ok(())
    }

    async fn upsert_participant_variable(
        &mut self,
        var: &ParticipantVariable,
    ) -> Result<(), StoreError> {
        self.working
            .participant_variables
            .insert((var.participant_id, var.variable_id), var.clone());
        Ok(())
    }

    async fn insert_participant_message(
        &mut self,
        message: &ParticipantMessage,
    ) -> Result<(), StoreError> {
        self.working.messages.push(message.clone());
        Ok(())
    }

    async fn insert_execution_log(&mut self, log: &NodeExecutionLog) -> Result<(), StoreError> {
        self.working.logs.push(log.clone());
        Ok(())
    }

    async fn insert_scheduled_job(&mut self, job: &ScheduledJob) -> Result<(), StoreError> {
        self.working.jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn set_participant_status(
        &mut self,
        id: ParticipantId,
        status: ParticipantStatus,
    ) -> Result<(), StoreError> {
        if let Some(participant) = self.working.participants.get_mut(&id) {
            participant.status = status;
        }
        Ok(())
    }

    async fn cancel_pending_jobs(
        &mut self,
        participant_id: ParticipantId,
    ) -> Result<(), StoreError> {
        for job in self.working.jobs.values_mut() {
            if job.participant_id == participant_id && job.status == JobStatus::Pending {
                job.status = JobStatus::Cancelled;
            }
        }
        Ok(())
    }

    async fn delete_project_cascade(&mut self, project_id: ProjectId) -> Result<(), StoreError> {
        self.working.nodes.retain(|_, n| n.project_id != project_id);
        self.working.templates.retain(|_, t| t.project_id != project_id);
        self.working.variables.retain(|_, v| v.project_id != project_id);
        self.working.timings.retain(|_, t| t.project_id != project_id);
        self.working.keywords.retain(|k| k.project_id != project_id);

        let doomed: Vec<ParticipantId> = self
            .working
            .participants
            .iter()
            .filter(|(_, p)| p.project_id == project_id)
            .map(|(id, _)| *id)
            .collect();
        self.working.participants.retain(|_, p| p.project_id != project_id);
        self.working
            .participant_variables
            .retain(|(pid, _), _| !doomed.contains(pid));
        self.working.messages.retain(|m| !doomed.contains(&m.participant_id));
        self.working.logs.retain(|l| !doomed.contains(&l.participant_id));
        self.working.jobs.retain(|_, j| !doomed.contains(&j.participant_id));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        *self.root.lock() = self.working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
