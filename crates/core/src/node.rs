// SPDX-License-Identifier: MIT

//! Node: the unit of "send one templated message and schedule its successors".
//!
//! Activation is modeled as a sum type rather than the four mutually-exclusive
//! nullable columns of the original schema; the on-disk shape is a compatibility
//! detail owned by the store crate, not the flow model.

use crate::ids::{MessageTemplateId, NodeId, ProjectId, TimingElementId, VariableId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperation {
    Equal,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
}

crate::simple_display! {
    ConditionOperation {
        Equal => "equal",
        Gt => "gt",
        Gte => "gte",
        Lt => "lt",
        Lte => "lte",
        In => "in",
        NotIn => "not_in",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeCondition {
    pub variable_id: VariableId,
    pub operation: ConditionOperation,
    pub expected_answer: String,
}

/// The rule that determines when a node becomes eligible for scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Activation {
    AfterNode(NodeId),
    /// The referenced template must have type `Poll`; enforced at construction.
    AfterPoll(MessageTemplateId),
    /// The referenced variable must have type `DateTime`; enforced at construction.
    AfterDateTimeVar(VariableId),
    StartDate(VariableId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub project_id: ProjectId,
    pub message_template_id: MessageTemplateId,
    pub schedule_timing_id: Option<TimingElementId>,
    pub is_terminal: bool,
    pub activation: Activation,
    pub conditions: Vec<NodeCondition>,
}

impl Node {
    pub fn source_node(&self) -> Option<NodeId> {
        match self.activation {
            Activation::AfterNode(id) => Some(id),
            _ => None,
        }
    }

    pub fn source_template(&self) -> Option<MessageTemplateId> {
        match self.activation {
            Activation::AfterPoll(id) => Some(id),
            _ => None,
        }
    }

    pub fn start_date_variable(&self) -> Option<VariableId> {
        match self.activation {
            Activation::StartDate(id) => Some(id),
            _ => None,
        }
    }
}

crate::builder! {
    pub struct NodeBuilder => Node {
        set {
            project_id: ProjectId = ProjectId::new(),
            message_template_id: MessageTemplateId = MessageTemplateId::new(),
            schedule_timing_id: Option<TimingElementId> = None,
            is_terminal: bool = false,
            activation: Activation = Activation::StartDate(VariableId::new()),
            conditions: Vec<NodeCondition> = Vec::new()
        }
        computed { id: NodeId = NodeId::new() }
    }
}
