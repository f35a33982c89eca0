// SPDX-License-Identifier: MIT

//! Read-only views over a participant's history: `list_messages` mirrors the
//! raw ParticipantMessage log, `list_timeline` joins NodeExecutionLog against
//! Node and MessageTemplate so a caller can show what fired and with what
//! content, without re-deriving the join itself.

use chrono::{DateTime, Utc};
use dashmsg_core::{Clock, MessageTemplateId, NodeId, ParticipantId, ParticipantMessage};
use dashmsg_store::{Store, StoreError};

use crate::{Engine, EngineError};

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub node_id: NodeId,
    pub message_template_id: MessageTemplateId,
    pub text_en: Option<String>,
    pub text_es: Option<String>,
    pub executed_at: DateTime<Utc>,
}

impl<S, C> Engine<S, C>
where
    S: Store,
    C: Clock,
{
    pub async fn list_messages(
        &self,
        participant_id: ParticipantId,
    ) -> Result<Vec<ParticipantMessage>, EngineError> {
        let mut tx = self.store.begin().await?;
        let messages = tx.messages(participant_id).await;
        tx.rollback().await?;
        Ok(messages?)
    }

    pub async fn list_timeline(
        &self,
        participant_id: ParticipantId,
    ) -> Result<Vec<TimelineEntry>, EngineError> {
        let mut tx = self.store.begin().await?;
        match list_timeline_tx(tx.as_mut(), participant_id).await {
            Ok(entries) => {
                tx.rollback().await?;
                Ok(entries)
            }
            Err(err) => {
                tx.rollback().await?;
                Err(err.into())
            }
        }
    }
}

async fn list_timeline_tx(
    tx: &mut dyn dashmsg_store::StoreTx,
    participant_id: ParticipantId,
) -> Result<Vec<TimelineEntry>, StoreError> {
    let mut logs = tx.execution_logs(participant_id).await?;
    logs.sort_by_key(|log| log.executed_at);

    let mut entries = Vec::with_capacity(logs.len());
    for log in logs {
        let Some(node) = tx.get_node(log.node_id).await? else {
            continue;
        };
        let Some(template) = tx.get_message_template(node.message_template_id).await? else {
            continue;
        };
        entries.push(TimelineEntry {
            node_id: node.id,
            message_template_id: template.id,
            text_en: template.text_en,
            text_es: template.text_es,
            executed_at: log.executed_at,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashmsg_core::{FakeClock, MessageDirection, MessageTemplate, Node, NodeExecutionLog, ProjectId};
    use dashmsg_store::InMemoryStore;

    #[tokio::test]
    async fn list_messages_returns_inserted_messages_in_order() {
        let store = InMemoryStore::new();
        let clock = FakeClock::new();
        let engine = Engine::new(store.clone(), clock.clone());
        let participant_id = ParticipantId::new();

        {
            let mut tx = store.begin().await.unwrap();
            let first = ParticipantMessage::new(
                participant_id,
                MessageDirection::Outbound,
                None,
                "first",
                clock.now(),
            );
            let second = ParticipantMessage::new(
                participant_id,
                MessageDirection::Inbound,
                None,
                "second",
                clock.now() + chrono::Duration::seconds(1),
            );
            tx.insert_participant_message(&first).await.unwrap();
            tx.insert_participant_message(&second).await.unwrap();
            tx.commit().await.unwrap();
        }

        let messages = engine.list_messages(participant_id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "first");
        assert_eq!(messages[1].text, "second");
    }

    #[tokio::test]
    async fn list_timeline_joins_logs_against_nodes_and_templates() {
        let store = InMemoryStore::new();
        let clock = FakeClock::new();
        let engine = Engine::new(store.clone(), clock.clone());
        let project_id = ProjectId::new();

        let template = MessageTemplate::builder()
            .project_id(project_id)
            .text_en(Some("Hello".to_string()))
            .build();
        let node = Node::builder()
            .project_id(project_id)
            .message_template_id(template.id)
            .build();
        store.seed_project(vec![node.clone()], vec![template.clone()], vec![], vec![], vec![]);

        let participant_id = ParticipantId::new();
        {
            let mut tx = store.begin().await.unwrap();
            let log = NodeExecutionLog::new(participant_id, node.id, clock.now());
            tx.insert_execution_log(&log).await.unwrap();
            tx.commit().await.unwrap();
        }

        let timeline = engine.list_timeline(participant_id).await.unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].node_id, node.id);
        assert_eq!(timeline[0].text_en.as_deref(), Some("Hello"));
    }
}
