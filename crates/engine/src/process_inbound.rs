// SPDX-License-Identifier: MIT

//! `processInbound`: two-stage dispatch for an inbound text — keyword
//! lookup first, poll-answer handling second. The raw text is always
//! recorded as an Inbound message before either stage runs, so history
//! survives even if dispatch finds nothing to do.

use dashmsg_core::{
    Clock, MessageDirection, ParticipantId, ParticipantVariable, VariableType,
    START_DATE_VARIABLE_NAME,
};
use dashmsg_eval::conditions_satisfied;
use dashmsg_store::{ActivationFilter, Store, StoreError, StoreTx};

use crate::execute_node::execute_node_tx;
use crate::keyword_dispatch::{resolve_stage1, Stage1Action};
use crate::poll_answer::accepted_answers;
use crate::scheduling::{schedule_eligible_with_own_timing, timing_for_node};
use crate::{Engine, EngineError};

impl<S, C> Engine<S, C>
where
    S: Store,
    C: Clock,
{
    /// Empty (after trim) input is normalized to a no-op; the core itself
    /// never rejects malformed input, it just has nothing to do with it.
    pub async fn process_inbound(
        &self,
        participant_id: ParticipantId,
        raw_text: &str,
    ) -> Result<(), EngineError> {
        let text = raw_text.trim();
        let mut tx = self.store.begin().await?;
        let now = self.clock.now();
        match process_inbound_tx(tx.as_mut(), now, participant_id, text).await {
            Ok(()) => {
                tx.commit().await?;
                tracing::info!(%participant_id, "inbound processed");
                Ok(())
            }
            Err(err) => {
                tx.rollback().await?;
                tracing::error!(%participant_id, error = %err, "inbound processing failed");
                Err(err.into())
            }
        }
    }
}

async fn process_inbound_tx(
    tx: &mut dyn StoreTx,
    now: chrono::DateTime<chrono::Utc>,
    participant_id: ParticipantId,
    text: &str,
) -> Result<(), StoreError> {
    let Some(participant) = tx.get_participant(participant_id).await? else {
        return Ok(());
    };

    let message = dashmsg_core::ParticipantMessage::new(
        participant_id,
        MessageDirection::Inbound,
        None,
        text,
        now,
    );
    tx.insert_participant_message(&message).await?;

    if text.is_empty() {
        return Ok(());
    }
    let key = text.to_lowercase();

    let keywords = tx.keywords_by_text(participant.project_id, &key).await?;
    let keyword = keywords.first();

    if let Some(action) = resolve_stage1(&key, keyword) {
        return dispatch_stage1(tx, now, participant_id, action).await;
    }

    dispatch_stage2(tx, now, participant_id, &key, text).await
}

async fn dispatch_stage1(
    tx: &mut dyn StoreTx,
    now: chrono::DateTime<chrono::Utc>,
    participant_id: ParticipantId,
    action: Stage1Action,
) -> Result<(), StoreError> {
    match action {
        Stage1Action::Deactivate { referenced_node } => {
            if let Some(node_id) = referenced_node {
                execute_node_tx(tx, now, participant_id, node_id).await?;
            }
            tx.set_participant_status(participant_id, dashmsg_core::ParticipantStatus::Inactive)
                .await?;
            tx.cancel_pending_jobs(participant_id).await?;
            Ok(())
        }
        Stage1Action::Activate { referenced_node } => {
            let Some(participant) = tx.get_participant(participant_id).await? else {
                return Ok(());
            };
            tx.set_participant_status(participant_id, dashmsg_core::ParticipantStatus::Active)
                .await?;

            if let Some(start_date_var) = tx
                .get_variable_by_name(participant.project_id, START_DATE_VARIABLE_NAME)
                .await?
            {
                let mut var = ParticipantVariable::new(participant_id, start_date_var.id);
                var.value_datetime = Some(now);
                tx.upsert_participant_variable(&var).await?;
            }

            if let Some(node_id) = referenced_node {
                if let Some(node) = tx.get_node(node_id).await? {
                    let run_at = now + timing_for_node(tx, &node).await?;
                    let job = dashmsg_core::ScheduledJob::new(participant_id, node_id, run_at);
                    tx.insert_scheduled_job(&job).await?;
                }
                return Ok(());
            }

            let candidates = tx
                .nodes_by_activation(participant.project_id, ActivationFilter::StartDate)
                .await?;
            let variables = tx.variables_by_project(participant.project_id).await?;
            let participant_vars = tx.participant_variables(participant_id).await?;
            schedule_eligible_with_own_timing(
                tx,
                participant_id,
                &candidates,
                &variables,
                &participant_vars,
                now,
            )
            .await?;
            Ok(())
        }
        Stage1Action::MoveToNode { referenced_node } => {
            if let Some(node_id) = referenced_node {
                let job = dashmsg_core::ScheduledJob::new(participant_id, node_id, now);
                tx.insert_scheduled_job(&job).await?;
            }
            Ok(())
        }
    }
}

async fn dispatch_stage2(
    tx: &mut dyn StoreTx,
    now: chrono::DateTime<chrono::Utc>,
    participant_id: ParticipantId,
    key: &str,
    raw_text: &str,
) -> Result<(), StoreError> {
    let Some((poll_message, template)) = tx.last_outbound_poll_message(participant_id).await?
    else {
        return Ok(());
    };

    // Never gates storage — an unrecognized reply is still recorded as-is,
    // only logged as such for the host to act on if it wants to.
    if !accepted_answers(&template, key).contains(key) {
        tracing::warn!(%participant_id, answer = key, "poll answer not in the accepted set");
    }

    let Some(variable_id) = template.variable_id else {
        return Ok(());
    };
    let Some(variable) = tx.get_variable(variable_id).await? else {
        return Ok(());
    };

    let mut var = ParticipantVariable::new(participant_id, variable_id);
    if variable.var_type == VariableType::Integer {
        var.value_int = raw_text.trim().parse::<i64>().ok();
    }
    var.value_text = Some(raw_text.to_string());
    tx.upsert_participant_variable(&var).await?;

    let Some(participant) = tx.get_participant(participant_id).await? else {
        return Ok(());
    };
    let candidates = tx
        .nodes_by_activation(
            participant.project_id,
            ActivationFilter::AfterPoll(poll_message.template_id.unwrap_or(template.id)),
        )
        .await?;
    let variables = tx.variables_by_project(participant.project_id).await?;
    let participant_vars = tx.participant_variables(participant_id).await?;
    schedule_eligible_with_own_timing(
        tx,
        participant_id,
        &candidates,
        &variables,
        &participant_vars,
        now,
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashmsg_core::{
        Activation, FakeClock, JobStatus, Keyword, KeywordActionType, MessageTemplate, Node,
        Participant, ParticipantStatus, ProjectId, TemplateType, TimingDirection, TimingElement,
        Variable,
    };
    use dashmsg_store::InMemoryStore;

    fn engine(store: &InMemoryStore, clock: &FakeClock) -> Engine<InMemoryStore, FakeClock> {
        Engine::new(store.clone(), clock.clone())
    }

    #[tokio::test]
    async fn iexit_deactivates_and_cancels_pending_jobs() {
        let store = InMemoryStore::new();
        let clock = FakeClock::new();
        let project_id = ProjectId::new();
        let participant = Participant::builder().project_id(project_id).build();
        store.seed_participant(participant.clone());

        let node = Node::builder().project_id(project_id).build();
        let template = MessageTemplate::builder().project_id(project_id).build();
        store.seed_project(vec![node.clone()], vec![template], vec![], vec![], vec![]);

        {
            let mut tx = store.begin().await.unwrap();
            let job = dashmsg_core::ScheduledJob::new(participant.id, node.id, clock.now());
            tx.insert_scheduled_job(&job).await.unwrap();
            tx.commit().await.unwrap();
        }

        let engine = engine(&store, &clock);
        engine.process_inbound(participant.id, "iexit").await.unwrap();

        let jobs = store.jobs_for(participant.id);
        assert!(jobs.iter().all(|j| j.status == JobStatus::Cancelled));
        let stored = store.participant(participant.id).unwrap();
        assert_eq!(stored.status, ParticipantStatus::Inactive);
    }

    #[tokio::test]
    async fn configured_deactivate_keyword_fires_exit_broadcast_first() {
        let store = InMemoryStore::new();
        let clock = FakeClock::new();
        let project_id = ProjectId::new();

        let template = MessageTemplate::builder()
            .project_id(project_id)
            .text_en(Some("Goodbye!".to_string()))
            .build();
        let exit_node = Node::builder()
            .project_id(project_id)
            .message_template_id(template.id)
            .build();
        let keyword = Keyword::builder()
            .project_id(project_id)
            .keyword_text("bye")
            .action_type(KeywordActionType::DeactivateParticipant)
            .referenced_node_id(Some(exit_node.id))
            .build();
        store.seed_project(
            vec![exit_node.clone()],
            vec![template],
            vec![],
            vec![keyword],
            vec![],
        );

        let participant = Participant::builder().project_id(project_id).build();
        store.seed_participant(participant.clone());

        let engine = engine(&store, &clock);
        engine.process_inbound(participant.id, "bye").await.unwrap();

        let messages = store.messages_for(participant.id);
        assert!(messages.iter().any(|m| m.text == "Goodbye!"));
        let stored = store.participant(participant.id).unwrap();
        assert_eq!(stored.status, ParticipantStatus::Inactive);
    }

    #[tokio::test]
    async fn iselect_activates_sets_start_date_and_schedules_start_date_nodes() {
        let store = InMemoryStore::new();
        let clock = FakeClock::new();
        let project_id = ProjectId::new();

        let start_date_var = Variable::builder()
            .project_id(project_id)
            .name(dashmsg_core::START_DATE_VARIABLE_NAME)
            .is_system(true)
            .var_type(dashmsg_core::VariableType::DateTime)
            .build();
        let template = MessageTemplate::builder().project_id(project_id).build();
        let timing = TimingElement::builder()
            .project_id(project_id)
            .direction(TimingDirection::After)
            .seconds(5)
            .build();
        let start_node = Node::builder()
            .project_id(project_id)
            .message_template_id(template.id)
            .schedule_timing_id(Some(timing.id))
            .activation(Activation::StartDate(start_date_var.id))
            .build();

        store.seed_project(
            vec![start_node.clone()],
            vec![template],
            vec![start_date_var.clone()],
            vec![],
            vec![timing],
        );
        let participant = Participant::builder()
            .project_id(project_id)
            .status(ParticipantStatus::Inactive)
            .build();
        store.seed_participant(participant.clone());

        let engine = engine(&store, &clock);
        engine.process_inbound(participant.id, "iselect").await.unwrap();

        let stored = store.participant(participant.id).unwrap();
        assert_eq!(stored.status, ParticipantStatus::Active);

        let jobs = store.jobs_for(participant.id);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].node_id, start_node.id);
        assert_eq!(jobs[0].run_at, clock.now() + chrono::Duration::seconds(5));
    }

    #[tokio::test]
    async fn unrecognized_text_with_no_open_poll_is_a_no_op() {
        let store = InMemoryStore::new();
        let clock = FakeClock::new();
        let project_id = ProjectId::new();
        let participant = Participant::builder().project_id(project_id).build();
        store.seed_participant(participant.clone());

        let engine = engine(&store, &clock);
        engine.process_inbound(participant.id, "hello there").await.unwrap();

        let messages = store.messages_for(participant.id);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].direction, MessageDirection::Inbound);
    }

    #[tokio::test]
    async fn poll_answer_stores_variable_and_schedules_after_poll_dependents() {
        let store = InMemoryStore::new();
        let clock = FakeClock::new();
        let project_id = ProjectId::new();

        let answer_var = Variable::builder()
            .project_id(project_id)
            .var_type(dashmsg_core::VariableType::Text)
            .build();
        let poll_template = MessageTemplate::builder()
            .project_id(project_id)
            .template_type(TemplateType::Poll)
            .variable_id(Some(answer_var.id))
            .choices_en(vec!["Yes".to_string(), "No".to_string()])
            .build();
        let dependent = Node::builder()
            .project_id(project_id)
            .message_template_id(poll_template.id)
            .activation(Activation::AfterPoll(poll_template.id))
            .build();

        store.seed_project(
            vec![dependent.clone()],
            vec![poll_template.clone()],
            vec![answer_var.clone()],
            vec![],
            vec![],
        );
        let participant = Participant::builder().project_id(project_id).build();
        store.seed_participant(participant.clone());

        {
            let mut tx = store.begin().await.unwrap();
            let outbound = dashmsg_core::ParticipantMessage::new(
                participant.id,
                MessageDirection::Outbound,
                Some(poll_template.id),
                "Yes or no?",
                clock.now(),
            );
            tx.insert_participant_message(&outbound).await.unwrap();
            tx.commit().await.unwrap();
        }

        let engine = engine(&store, &clock);
        engine.process_inbound(participant.id, "yes").await.unwrap();

        let vars = store.participant_variables_for(participant.id);
        let stored = vars.get(&answer_var.id).expect("variable should be stored");
        assert_eq!(stored.value_text.as_deref(), Some("yes"));

        let jobs = store.jobs_for(participant.id);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].node_id, dependent.id);
    }

    #[tokio::test]
    async fn keyword_match_takes_precedence_over_poll_answer() {
        let store = InMemoryStore::new();
        let clock = FakeClock::new();
        let project_id = ProjectId::new();

        let poll_template = MessageTemplate::builder()
            .project_id(project_id)
            .template_type(TemplateType::Poll)
            .choices_en(vec!["iexit".to_string()])
            .build();
        store.seed_project(vec![], vec![poll_template.clone()], vec![], vec![], vec![]);

        let participant = Participant::builder().project_id(project_id).build();
        store.seed_participant(participant.clone());
        {
            let mut tx = store.begin().await.unwrap();
            let outbound = dashmsg_core::ParticipantMessage::new(
                participant.id,
                MessageDirection::Outbound,
                Some(poll_template.id),
                "Reply iexit to cancel",
                clock.now(),
            );
            tx.insert_participant_message(&outbound).await.unwrap();
            tx.commit().await.unwrap();
        }

        let engine = engine(&store, &clock);
        engine.process_inbound(participant.id, "iexit").await.unwrap();

        let stored = store.participant(participant.id).unwrap();
        assert_eq!(stored.status, ParticipantStatus::Inactive);
    }

    #[tokio::test]
    async fn empty_text_only_records_the_inbound_message() {
        let store = InMemoryStore::new();
        let clock = FakeClock::new();
        let project_id = ProjectId::new();
        let participant = Participant::builder().project_id(project_id).build();
        store.seed_participant(participant.clone());

        let engine = engine(&store, &clock);
        engine.process_inbound(participant.id, "   ").await.unwrap();

        let messages = store.messages_for(participant.id);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "");
    }
}
