// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dashmsg-core: the flow definition model for the protocol execution core.
//!
//! Entities here are plain data plus the structural invariants that can be
//! checked locally (a node's own activation shape, a job's terminal states).
//! Cross-entity invariants that need another row to check against (I1, I2,
//! I4) are enforced where that row is available: in the store's seed path
//! and in the engine.

pub mod macros;

pub mod clock;
pub mod execution_log;
pub mod id;
pub mod ids;
pub mod keyword;
pub mod node;
pub mod participant;
pub mod participant_message;
pub mod participant_variable;
pub mod project;
pub mod scheduled_job;
pub mod template;
pub mod timing;
pub mod variable;

pub use clock::{Clock, FakeClock, SystemClock};
pub use execution_log::NodeExecutionLog;
pub use id::{short, IdBuf};
pub use ids::{
    KeywordId, MessageTemplateId, NodeExecutionLogId, NodeId, ParticipantId,
    ParticipantMessageId, ProjectId, ScheduledJobId, TimingElementId, VariableId,
};
pub use keyword::{Keyword, KeywordActionType, ACTIVATE_ALIASES, DEACTIVATE_ALIASES};
pub use node::{Activation, ConditionOperation, Node, NodeCondition};
pub use participant::{Participant, ParticipantStatus};
pub use participant_message::{MessageDirection, ParticipantMessage};
pub use participant_variable::ParticipantVariable;
pub use project::{Project, ProjectStatus};
pub use scheduled_job::{JobStatus, ScheduledJob};
pub use template::{MessageTemplate, TemplateType};
pub use timing::{TimingDirection, TimingElement};
pub use variable::{Variable, VariableType, START_DATE_VARIABLE_NAME};
