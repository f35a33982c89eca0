// SPDX-License-Identifier: MIT

//! Postgres-backed `Store`. Queries are written by hand against a `PgPool`
//! rather than through `sqlx::query!`'s compile-time checking, since the
//! definitions this crate serves are seeded by an external migration owner
//! (§1 Out of scope) and we don't want a live database as a build
//! dependency.

mod rows;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmsg_core::{
    Keyword, MessageTemplate, MessageTemplateId, Node, NodeExecutionLog, NodeId, Participant,
    ParticipantId, ParticipantMessage, ParticipantStatus, ParticipantVariable, ProjectId,
    ScheduledJob, ScheduledJobId, TimingElement, TimingElementId, Variable, VariableId,
};
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use tracing::instrument;

use crate::error::StoreError;
use crate::traits::{ActivationFilter, Store, StoreTx};
use rows::{
    KeywordRow, MessageTemplateRow, NodeExecutionLogRow, NodeRow, ParticipantMessageRow,
    ParticipantRow, ParticipantVariableRow, ScheduledJobRow, TimingElementRow, VariableRow,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the embedded schema migrations. Intended for the daemon's
    /// startup path and for integration tests run against a scratch
    /// database.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    #[instrument(skip(self))]
    async fn begin<'a>(&'a self) -> Result<Box<dyn StoreTx + 'a>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }

    #[instrument(skip(self))]
    async fn claim_due_jobs(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ScheduledJob>, StoreError> {
        // The conditional UPDATE ... WHERE status = 'pending' is what makes
        // this safe under more than one scheduler instance (§5 claim race):
        // a row already flipped to running by a competing poller simply
        // doesn't match and is skipped.
        let rows: Vec<ScheduledJobRow> = sqlx::query_as(
            r#"
            UPDATE scheduled_jobs
            SET status = 'running'
            WHERE id IN (
                SELECT id FROM scheduled_jobs
                WHERE status = 'pending' AND run_at <= $1
                ORDER BY run_at ASC
                LIMIT $2
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, participant_id, node_id, run_at, status
            "#,
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ScheduledJob::from).collect())
    }

    #[instrument(skip(self))]
    async fn mark_job_done(&self, job_id: ScheduledJobId) -> Result<(), StoreError> {
        sqlx::query("UPDATE scheduled_jobs SET status = 'done' WHERE id = $1")
            .bind(job_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn requeue_job(&self, job_id: ScheduledJobId) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE scheduled_jobs SET status = 'pending' WHERE id = $1 AND status = 'running'",
        )
        .bind(job_id.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn reclaim_stale_running_jobs(&self) -> Result<usize, StoreError> {
        let result = sqlx::query("UPDATE scheduled_jobs SET status = 'pending' WHERE status = 'running'")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() as usize)
    }
}

struct PgTx<'a> {
    tx: Transaction<'a, Postgres>,
}

#[async_trait]
impl<'a> StoreTx for PgTx<'a> {
    async fn get_participant(
        &mut self,
        id: ParticipantId,
    ) -> Result<Option<Participant>, StoreError> {
        let row: Option<ParticipantRow> = sqlx::query_as(
            "SELECT id, project_id, language, status, external_id FROM participants WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(Participant::from))
    }

    async fn get_node(&mut self, id: NodeId) -> Result<Option<Node>, StoreError> {
        let row: Option<NodeRow> = sqlx::query_as(
            r#"
            SELECT id, project_id, message_template_id, schedule_timing_id, is_terminal,
                   activation_type, activation_source_node_id, activation_source_template_id,
                   activation_variable_id, conditions
            FROM nodes WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(Node::try_from).transpose()
    }

    async fn get_message_template(
        &mut self,
        id: MessageTemplateId,
    ) -> Result<Option<MessageTemplate>, StoreError> {
        let row: Option<MessageTemplateRow> = sqlx::query_as(
            r#"
            SELECT id, project_id, template_type, text_en, text_es, variable_id,
                   choices_en, choices_es
            FROM message_templates WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(MessageTemplate::from))
    }

    async fn get_variable(&mut self, id: VariableId) -> Result<Option<Variable>, StoreError> {
        let row: Option<VariableRow> = sqlx::query_as(
            "SELECT id, project_id, name, var_type, is_system, is_agv FROM variables WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(Variable::from))
    }

    async fn get_timing_element(
        &mut self,
        id: TimingElementId,
    ) -> Result<Option<TimingElement>, StoreError> {
        let row: Option<TimingElementRow> = sqlx::query_as(
            r#"
            SELECT id, project_id, name, direction, days, hours, minutes, seconds
            FROM timing_elements WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(TimingElement::from))
    }

    async fn get_variable_by_name(
        &mut self,
        project_id: ProjectId,
        name: &str,
    ) -> Result<Option<Variable>, StoreError> {
        let row: Option<VariableRow> = sqlx::query_as(
            r#"
            SELECT id, project_id, name, var_type, is_system, is_agv
            FROM variables WHERE project_id = $1 AND name = $2
            "#,
        )
        .bind(project_id.as_str())
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(Variable::from))
    }

    async fn nodes_by_activation(
        &mut self,
        project_id: ProjectId,
        filter: ActivationFilter,
    ) -> Result<Vec<Node>, StoreError> {
        let base = r#"
            SELECT id, project_id, message_template_id, schedule_timing_id, is_terminal,
                   activation_type, activation_source_node_id, activation_source_template_id,
                   activation_variable_id, conditions
            FROM nodes WHERE project_id = $1 AND activation_type = $2 AND "#;

        let rows: Vec<NodeRow> = match filter {
            ActivationFilter::AfterNode(source) => {
                sqlx::query_as(&format!("{base}activation_source_node_id = $3"))
                    .bind(project_id.as_str())
                    .bind("after_node")
                    .bind(source.as_str())
                    .fetch_all(&mut *self.tx)
                    .await?
            }
            ActivationFilter::AfterPoll(source) => {
                sqlx::query_as(&format!("{base}activation_source_template_id = $3"))
                    .bind(project_id.as_str())
                    .bind("after_poll")
                    .bind(source.as_str())
                    .fetch_all(&mut *self.tx)
                    .await?
            }
            ActivationFilter::AfterDateTimeVar(variable) => {
                sqlx::query_as(&format!("{base}activation_variable_id = $3"))
                    .bind(project_id.as_str())
                    .bind("after_datetime_var")
                    .bind(variable.as_str())
                    .fetch_all(&mut *self.tx)
                    .await?
            }
            ActivationFilter::StartDate => {
                sqlx::query_as(
                    r#"
                    SELECT id, project_id, message_template_id, schedule_timing_id, is_terminal,
                           activation_type, activation_source_node_id, activation_source_template_id,
                           activation_variable_id, conditions
                    FROM nodes WHERE project_id = $1 AND activation_type = 'start_date'
                    "#,
                )
                .bind(project_id.as_str())
                .fetch_all(&mut *self.tx)
                .await?
            }
        };

        rows.into_iter().map(Node::try_from).collect()
    }

    async fn keywords_by_text(
        &mut self,
        project_id: ProjectId,
        text: &str,
    ) -> Result<Vec<Keyword>, StoreError> {
        let rows: Vec<KeywordRow> = sqlx::query_as(
            r#"
            SELECT id, project_id, keyword_text, language, action_type,
                   referenced_node_id, referenced_variable_id
            FROM keywords WHERE project_id = $1 AND lower(trim(keyword_text)) = $2
            "#,
        )
        .bind(project_id.as_str())
        .bind(text)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows.into_iter().map(Keyword::from).collect())
    }

    async fn variables_by_project(
        &mut self,
        project_id: ProjectId,
    ) -> Result<HashMap<VariableId, Variable>, StoreError> {
        let rows: Vec<VariableRow> = sqlx::query_as(
            "SELECT id, project_id, name, var_type, is_system, is_agv FROM variables WHERE project_id = $1",
        )
        .bind(project_id.as_str())
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows
            .into_iter()
            .map(Variable::from)
            .map(|v| (v.id, v))
            .collect())
    }

    async fn participant_variables(
        &mut self,
        participant_id: ParticipantId,
    ) -> Result<HashMap<VariableId, ParticipantVariable>, StoreError> {
        let rows: Vec<ParticipantVariableRow> = sqlx::query_as(
            r#"
            SELECT participant_id, variable_id, value_text, value_int, value_datetime
            FROM participant_variables WHERE participant_id = $1
            "#,
        )
        .bind(participant_id.as_str())
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows
            .into_iter()
            .map(ParticipantVariable::from)
            .map(|v| (v.variable_id, v))
            .collect())
    }

    async fn last_outbound_poll_message(
        &mut self,
        participant_id: ParticipantId,
    ) -> Result<Option<(ParticipantMessage, MessageTemplate)>, StoreError> {
        let row: Option<ParticipantMessageRow> = sqlx::query_as(
            r#"
            SELECT pm.id, pm.participant_id, pm.direction, pm.template_id, pm.text, pm.created_at
            FROM participant_messages pm
            JOIN message_templates mt ON mt.id = pm.template_id
            WHERE pm.participant_id = $1 AND pm.direction = 'outbound' AND mt.template_type = 'poll'
            ORDER BY pm.created_at DESC
            LIMIT 1
            "#,
        )
        .bind(participant_id.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let message = ParticipantMessage::from(row);
        let Some(template_id) = message.template_id else {
            return Ok(None);
        };
        let template = self.get_message_template(template_id).await?;
        Ok(template.map(|t| (message, t)))
    }

    async fn messages(
        &mut self,
        participant_id: ParticipantId,
    ) -> Result<Vec<ParticipantMessage>, StoreError> {
        let rows: Vec<ParticipantMessageRow> = sqlx::query_as(
            r#"
            SELECT id, participant_id, direction, template_id, text, created_at
            FROM participant_messages WHERE participant_id = $1 ORDER BY created_at ASC
            "#,
        )
        .bind(participant_id.as_str())
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows.into_iter().map(ParticipantMessage::from).collect())
    }

    async fn execution_logs(
        &mut self,
        participant_id: ParticipantId,
    ) -> Result<Vec<NodeExecutionLog>, StoreError> {
        let rows: Vec<NodeExecutionLogRow> = sqlx::query_as(
            r#"
            SELECT id, participant_id, node_id, executed_at
            FROM node_execution_logs WHERE participant_id = $1 ORDER BY executed_at ASC
            "#,
        )
        .bind(participant_id.as_str())
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows.into_iter().map(NodeExecutionLog::from).collect())
    }

    async fn insert_participant(&mut self, participant: &Participant) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO participants (id, project_id, language, status, external_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(participant.id.as_str())
        .bind(participant.project_id.as_str())
        .bind(&participant.language)
        .bind(participant.status.to_string())
        .bind(&participant.external_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn upsert_participant_variable(
        &mut self,
        var: &ParticipantVariable,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO participant_variables (participant_id, variable_id, value_text, value_int, value_datetime)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (participant_id, variable_id)
            DO UPDATE SET value_text = EXCLUDED.value_text,
                          value_int = EXCLUDED.value_int,
                          value_datetime = EXCLUDED.value_datetime
            "#,
        )
        .bind(var.participant_id.as_str())
        .bind(var.variable_id.as_str())
        .bind(&var.value_text)
        .bind(var.value_int)
        .bind(var.value_datetime)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn insert_participant_message(
        &mut self,
        message: &ParticipantMessage,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO participant_messages (id, participant_id, direction, template_id, text, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id.as_str())
        .bind(message.participant_id.as_str())
        .bind(message.direction.to_string())
        .bind(message.template_id.map(|t| t.as_str().to_string()))
        .bind(&message.text)
        .bind(message.created_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn insert_execution_log(&mut self, log: &NodeExecutionLog) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO node_execution_logs (id, participant_id, node_id, executed_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(log.id.as_str())
        .bind(log.participant_id.as_str())
        .bind(log.node_id.as_str())
        .bind(log.executed_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn insert_scheduled_job(&mut self, job: &ScheduledJob) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO scheduled_jobs (id, participant_id, node_id, run_at, status)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(job.id.as_str())
        .bind(job.participant_id.as_str())
        .bind(job.node_id.as_str())
        .bind(job.run_at)
        .bind(job.status.to_string())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn set_participant_status(
        &mut self,
        id: ParticipantId,
        status: ParticipantStatus,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE participants SET status = $1 WHERE id = $2")
            .bind(status.to_string())
            .bind(id.as_str())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn cancel_pending_jobs(
        &mut self,
        participant_id: ParticipantId,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE scheduled_jobs SET status = 'cancelled' WHERE participant_id = $1 AND status = 'pending'",
        )
        .bind(participant_id.as_str())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete_project_cascade(&mut self, project_id: ProjectId) -> Result<(), StoreError> {
        // Children first: jobs/logs/messages/variables reference participants,
        // which reference the project; definitions reference the project
        // directly. ON DELETE CASCADE on the FKs would make this one
        // statement, but the schema (owned externally, §1) doesn't guarantee
        // that, so the store does it explicitly.
        sqlx::query(
            r#"
            DELETE FROM scheduled_jobs WHERE participant_id IN
                (SELECT id FROM participants WHERE project_id = $1)
            "#,
        )
        .bind(project_id.as_str())
        .execute(&mut *self.tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM node_execution_logs WHERE participant_id IN
                (SELECT id FROM participants WHERE project_id = $1)
            "#,
        )
        .bind(project_id.as_str())
        .execute(&mut *self.tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM participant_messages WHERE participant_id IN
                (SELECT id FROM participants WHERE project_id = $1)
            "#,
        )
        .bind(project_id.as_str())
        .execute(&mut *self.tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM participant_variables WHERE participant_id IN
                (SELECT id FROM participants WHERE project_id = $1)
            "#,
        )
        .bind(project_id.as_str())
        .execute(&mut *self.tx)
        .await?;

        sqlx::query("DELETE FROM participants WHERE project_id = $1")
            .bind(project_id.as_str())
            .execute(&mut *self.tx)
            .await?;

        sqlx::query("DELETE FROM keywords WHERE project_id = $1")
            .bind(project_id.as_str())
            .execute(&mut *self.tx)
            .await?;
        sqlx::query("DELETE FROM nodes WHERE project_id = $1")
            .bind(project_id.as_str())
            .execute(&mut *self.tx)
            .await?;
        sqlx::query("DELETE FROM message_templates WHERE project_id = $1")
            .bind(project_id.as_str())
            .execute(&mut *self.tx)
            .await?;
        sqlx::query("DELETE FROM variables WHERE project_id = $1")
            .bind(project_id.as_str())
            .execute(&mut *self.tx)
            .await?;
        sqlx::query("DELETE FROM timing_elements WHERE project_id = $1")
            .bind(project_id.as_str())
            .execute(&mut *self.tx)
            .await?;
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(project_id.as_str())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
