// SPDX-License-Identifier: MIT

//! `enrollParticipant`: creates an Active participant. Enrollment alone
//! schedules nothing — the caller is expected to send an activation keyword
//! as the next step, which is what actually seeds the first ScheduledJob.

use dashmsg_core::{Clock, Participant, ParticipantId, ProjectId};
use dashmsg_store::Store;

use crate::{Engine, EngineError};

impl<S, C> Engine<S, C>
where
    S: Store,
    C: Clock,
{
    pub async fn enroll_participant(
        &self,
        project_id: ProjectId,
        language: impl Into<String>,
        external_id: impl Into<String>,
    ) -> Result<ParticipantId, EngineError> {
        let participant = Participant::new(project_id, language, external_id);
        let mut tx = self.store.begin().await?;
        tx.insert_participant(&participant).await?;
        tx.commit().await?;
        tracing::info!(participant_id = %participant.id, %project_id, "participant enrolled");
        Ok(participant.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashmsg_core::FakeClock;
    use dashmsg_store::InMemoryStore;

    #[tokio::test]
    async fn enrolling_inserts_an_active_participant() {
        let store = InMemoryStore::new();
        let clock = FakeClock::new();
        let engine = Engine::new(store.clone(), clock);
        let project_id = ProjectId::new();

        let participant_id = engine
            .enroll_participant(project_id, "English", "ext-1")
            .await
            .unwrap();

        let stored = store.participant(participant_id).expect("participant should exist");
        assert!(stored.is_active());
        assert_eq!(stored.project_id, project_id);
        assert_eq!(stored.external_id, "ext-1");
    }

    #[tokio::test]
    async fn enrolling_schedules_nothing() {
        let store = InMemoryStore::new();
        let clock = FakeClock::new();
        let engine = Engine::new(store.clone(), clock);
        let project_id = ProjectId::new();

        let participant_id = engine
            .enroll_participant(project_id, "English", "ext-2")
            .await
            .unwrap();

        assert!(store.jobs_for(participant_id).is_empty());
    }
}
