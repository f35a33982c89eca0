// SPDX-License-Identifier: MIT

//! Row shapes for the Postgres schema and their conversion to/from the flow
//! model's in-memory types.
//!
//! Activation is stored as the original schema's four mutually-exclusive
//! nullable columns plus a discriminator (§9 design notes); the sum type
//! lives only in `dashmsg_core::Activation`.

use chrono::{DateTime, Utc};
use dashmsg_core::{
    Activation, JobStatus, Keyword, KeywordActionType, MessageDirection, MessageTemplate,
    MessageTemplateId, Node, NodeCondition, NodeExecutionLog, NodeExecutionLogId, NodeId,
    Participant, ParticipantId, ParticipantMessage, ParticipantMessageId, ParticipantStatus,
    ParticipantVariable, ProjectId, ScheduledJob, ScheduledJobId, TemplateType, TimingDirection,
    TimingElement, TimingElementId, Variable, VariableId, VariableType,
};
use serde_json::Value;
use sqlx::FromRow;

use crate::error::StoreError;

#[derive(FromRow)]
pub(crate) struct ParticipantRow {
    pub id: String,
    pub project_id: String,
    pub language: String,
    pub status: String,
    pub external_id: String,
}

impl From<ParticipantRow> for Participant {
    fn from(row: ParticipantRow) -> Self {
        Participant {
            id: ParticipantId::from_string(row.id),
            project_id: ProjectId::from_string(row.project_id),
            language: row.language,
            status: parse_participant_status(&row.status),
            external_id: row.external_id,
        }
    }
}

fn parse_participant_status(raw: &str) -> ParticipantStatus {
    match raw {
        "active" => ParticipantStatus::Active,
        _ => ParticipantStatus::Inactive,
    }
}

#[derive(FromRow)]
pub(crate) struct VariableRow {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub var_type: String,
    pub is_system: bool,
    pub is_agv: bool,
}

impl From<VariableRow> for Variable {
    fn from(row: VariableRow) -> Self {
        Variable {
            id: VariableId::from_string(row.id),
            project_id: ProjectId::from_string(row.project_id),
            name: row.name,
            var_type: parse_variable_type(&row.var_type),
            is_system: row.is_system,
            is_agv: row.is_agv,
        }
    }
}

fn parse_variable_type(raw: &str) -> VariableType {
    match raw.to_lowercase().as_str() {
        "integer" => VariableType::Integer,
        "datetime" => VariableType::DateTime,
        "time" => VariableType::Time,
        "none" => VariableType::None,
        _ => VariableType::Text,
    }
}

#[derive(FromRow)]
pub(crate) struct TimingElementRow {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub direction: String,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl From<TimingElementRow> for TimingElement {
    fn from(row: TimingElementRow) -> Self {
        TimingElement {
            id: TimingElementId::from_string(row.id),
            project_id: ProjectId::from_string(row.project_id),
            name: row.name,
            direction: if row.direction == "before" {
                TimingDirection::Before
            } else {
                TimingDirection::After
            },
            days: row.days,
            hours: row.hours,
            minutes: row.minutes,
            seconds: row.seconds,
        }
    }
}

#[derive(FromRow)]
pub(crate) struct MessageTemplateRow {
    pub id: String,
    pub project_id: String,
    pub template_type: String,
    pub text_en: Option<String>,
    pub text_es: Option<String>,
    pub variable_id: Option<String>,
    pub choices_en: Value,
    pub choices_es: Value,
}

impl From<MessageTemplateRow> for MessageTemplate {
    fn from(row: MessageTemplateRow) -> Self {
        MessageTemplate {
            id: MessageTemplateId::from_string(row.id),
            project_id: ProjectId::from_string(row.project_id),
            template_type: if row.template_type == "poll" {
                TemplateType::Poll
            } else {
                TemplateType::Broadcast
            },
            text_en: row.text_en,
            text_es: row.text_es,
            variable_id: row.variable_id.map(VariableId::from_string),
            choices_en: json_string_list(row.choices_en),
            choices_es: json_string_list(row.choices_es),
        }
    }
}

fn json_string_list(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

#[derive(FromRow)]
pub(crate) struct NodeRow {
    pub id: String,
    pub project_id: String,
    pub message_template_id: String,
    pub schedule_timing_id: Option<String>,
    pub is_terminal: bool,
    pub activation_type: String,
    pub activation_source_node_id: Option<String>,
    pub activation_source_template_id: Option<String>,
    pub activation_variable_id: Option<String>,
    pub conditions: Value,
}

impl TryFrom<NodeRow> for Node {
    type Error = StoreError;

    fn try_from(row: NodeRow) -> Result<Self, Self::Error> {
        let activation = match row.activation_type.as_str() {
            "after_node" => Activation::AfterNode(NodeId::from_string(
                row.activation_source_node_id
                    .ok_or_else(|| missing_column("activation_source_node_id"))?,
            )),
            "after_poll" => Activation::AfterPoll(MessageTemplateId::from_string(
                row.activation_source_template_id
                    .ok_or_else(|| missing_column("activation_source_template_id"))?,
            )),
            "after_datetime_var" => Activation::AfterDateTimeVar(VariableId::from_string(
                row.activation_variable_id
                    .clone()
                    .ok_or_else(|| missing_column("activation_variable_id"))?,
            )),
            _ => Activation::StartDate(VariableId::from_string(
                row.activation_variable_id
                    .ok_or_else(|| missing_column("activation_variable_id"))?,
            )),
        };

        Ok(Node {
            id: NodeId::from_string(row.id),
            project_id: ProjectId::from_string(row.project_id),
            message_template_id: MessageTemplateId::from_string(row.message_template_id),
            schedule_timing_id: row.schedule_timing_id.map(TimingElementId::from_string),
            is_terminal: row.is_terminal,
            activation,
            conditions: parse_conditions(row.conditions),
        })
    }
}

fn missing_column(name: &'static str) -> StoreError {
    StoreError::NotFound(format!("node row missing column {name} for its activation type"))
}

fn parse_conditions(value: Value) -> Vec<NodeCondition> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| {
            let variable_id = item.get("variable_id")?.as_str()?;
            let operation = item.get("operation")?.as_str()?;
            let expected_answer = item.get("expected_answer")?.as_str()?;
            Some(NodeCondition {
                variable_id: VariableId::from_string(variable_id),
                operation: parse_condition_operation(operation),
                expected_answer: expected_answer.to_string(),
            })
        })
        .collect()
}

fn parse_condition_operation(raw: &str) -> dashmsg_core::ConditionOperation {
    use dashmsg_core::ConditionOperation::*;
    match raw {
        "gt" => Gt,
        "gte" => Gte,
        "lt" => Lt,
        "lte" => Lte,
        "in" => In,
        "not_in" => NotIn,
        _ => Equal,
    }
}

#[derive(FromRow)]
pub(crate) struct KeywordRow {
    pub id: String,
    pub project_id: String,
    pub keyword_text: String,
    pub language: String,
    pub action_type: String,
    pub referenced_node_id: Option<String>,
    pub referenced_variable_id: Option<String>,
}

impl From<KeywordRow> for Keyword {
    fn from(row: KeywordRow) -> Self {
        Keyword {
            id: dashmsg_core::KeywordId::from_string(row.id),
            project_id: ProjectId::from_string(row.project_id),
            keyword_text: row.keyword_text,
            language: row.language,
            action_type: match row.action_type.as_str() {
                "deactivate_participant" => KeywordActionType::DeactivateParticipant,
                "move_to_node" => KeywordActionType::MoveToNode,
                _ => KeywordActionType::ActivateParticipant,
            },
            referenced_node_id: row.referenced_node_id.map(NodeId::from_string),
            referenced_variable_id: row.referenced_variable_id.map(VariableId::from_string),
        }
    }
}

#[derive(FromRow)]
pub(crate) struct ParticipantVariableRow {
    pub participant_id: String,
    pub variable_id: String,
    pub value_text: Option<String>,
    pub value_int: Option<i64>,
    pub value_datetime: Option<DateTime<Utc>>,
}

impl From<ParticipantVariableRow> for ParticipantVariable {
    fn from(row: ParticipantVariableRow) -> Self {
        ParticipantVariable {
            participant_id: ParticipantId::from_string(row.participant_id),
            variable_id: VariableId::from_string(row.variable_id),
            value_text: row.value_text,
            value_int: row.value_int,
            value_datetime: row.value_datetime,
        }
    }
}

#[derive(FromRow)]
pub(crate) struct ParticipantMessageRow {
    pub id: String,
    pub participant_id: String,
    pub direction: String,
    pub template_id: Option<String>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<ParticipantMessageRow> for ParticipantMessage {
    fn from(row: ParticipantMessageRow) -> Self {
        ParticipantMessage {
            id: ParticipantMessageId::from_string(row.id),
            participant_id: ParticipantId::from_string(row.participant_id),
            direction: if row.direction == "inbound" {
                MessageDirection::Inbound
            } else {
                MessageDirection::Outbound
            },
            template_id: row.template_id.map(MessageTemplateId::from_string),
            text: row.text,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
pub(crate) struct NodeExecutionLogRow {
    pub id: String,
    pub participant_id: String,
    pub node_id: String,
    pub executed_at: DateTime<Utc>,
}

impl From<NodeExecutionLogRow> for NodeExecutionLog {
    fn from(row: NodeExecutionLogRow) -> Self {
        NodeExecutionLog {
            id: NodeExecutionLogId::from_string(row.id),
            participant_id: ParticipantId::from_string(row.participant_id),
            node_id: NodeId::from_string(row.node_id),
            executed_at: row.executed_at,
        }
    }
}

#[derive(FromRow)]
pub(crate) struct ScheduledJobRow {
    pub id: String,
    pub participant_id: String,
    pub node_id: String,
    pub run_at: DateTime<Utc>,
    pub status: String,
}

impl From<ScheduledJobRow> for ScheduledJob {
    fn from(row: ScheduledJobRow) -> Self {
        ScheduledJob {
            id: ScheduledJobId::from_string(row.id),
            participant_id: ParticipantId::from_string(row.participant_id),
            node_id: NodeId::from_string(row.node_id),
            run_at: row.run_at,
            status: match row.status.as_str() {
                "running" => JobStatus::Running,
                "done" => JobStatus::Done,
                "cancelled" => JobStatus::Cancelled,
                _ => JobStatus::Pending,
            },
        }
    }
}
