// SPDX-License-Identifier: MIT

//! Newtype identifiers for every persisted entity in the flow model.

crate::define_id! {
    /// Identifies a Project.
    pub struct ProjectId("proj");
}

crate::define_id! {
    /// Identifies a TimingElement.
    pub struct TimingElementId("timg");
}

crate::define_id! {
    /// Identifies a Variable.
    pub struct VariableId("vars");
}

crate::define_id! {
    /// Identifies a MessageTemplate.
    pub struct MessageTemplateId("tmpl");
}

crate::define_id! {
    /// Identifies a Node.
    pub struct NodeId("node");
}

crate::define_id! {
    /// Identifies a Keyword.
    pub struct KeywordId("kwrd");
}

crate::define_id! {
    /// Identifies a Participant.
    pub struct ParticipantId("part");
}

crate::define_id! {
    /// Identifies a ParticipantMessage.
    pub struct ParticipantMessageId("pmsg");
}

crate::define_id! {
    /// Identifies a NodeExecutionLog (AGV) row.
    pub struct NodeExecutionLogId("nlog");
}

crate::define_id! {
    /// Identifies a ScheduledJob.
    pub struct ScheduledJobId("sjob");
}
