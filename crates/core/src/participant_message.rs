// SPDX-License-Identifier: MIT

//! ParticipantMessage: one row per inbound or outbound text exchanged with a
//! participant, ordered by `created_at`.

use crate::ids::{MessageTemplateId, ParticipantId, ParticipantMessageId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageDirection {
    Inbound,
    Outbound,
}

crate::simple_display! {
    MessageDirection {
        Inbound => "inbound",
        Outbound => "outbound",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantMessage {
    pub id: ParticipantMessageId,
    pub participant_id: ParticipantId,
    pub direction: MessageDirection,
    pub template_id: Option<MessageTemplateId>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl ParticipantMessage {
    pub fn new(
        participant_id: ParticipantId,
        direction: MessageDirection,
        template_id: Option<MessageTemplateId>,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ParticipantMessageId::new(),
            participant_id,
            direction,
            template_id,
            text: text.into(),
            created_at,
        }
    }

    pub fn is_outbound(&self) -> bool {
        self.direction == MessageDirection::Outbound
    }
}

crate::builder! {
    pub struct ParticipantMessageBuilder => ParticipantMessage {
        into { text: String = "" }
        set {
            participant_id: ParticipantId = ParticipantId::new(),
            direction: MessageDirection = MessageDirection::Outbound,
            template_id: Option<MessageTemplateId> = None,
            created_at: DateTime<Utc> = Utc::now()
        }
        computed { id: ParticipantMessageId = ParticipantMessageId::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_direction_reports_outbound() {
        let message = ParticipantMessage::builder().build();
        assert!(message.is_outbound());
    }

    #[test]
    fn inbound_direction_is_not_outbound() {
        let message = ParticipantMessage::builder()
            .direction(MessageDirection::Inbound)
            .build();
        assert!(!message.is_outbound());
    }

    #[test]
    fn new_sets_the_given_fields() {
        let participant_id = ParticipantId::new();
        let now = Utc::now();
        let message = ParticipantMessage::new(
            participant_id,
            MessageDirection::Outbound,
            None,
            "hello",
            now,
        );
        assert_eq!(message.participant_id, participant_id);
        assert_eq!(message.text, "hello");
        assert_eq!(message.created_at, now);
    }
}
