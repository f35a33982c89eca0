// SPDX-License-Identifier: MIT

//! One scheduler tick: claim due jobs, execute each against the engine,
//! settle its terminal status.

use dashmsg_core::{Clock, JobStatus, ScheduledJob};
use dashmsg_store::Store;

use crate::{Scheduler, SchedulerError, CLAIM_BATCH_SIZE};

/// Per-tick counts, logged at `debug` so a 1-second default interval doesn't
/// flood logs at `info`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub claimed: usize,
    pub done: usize,
    pub retried: usize,
}

impl<S, C> Scheduler<S, C>
where
    S: Store + Clone,
    C: Clock,
{
    /// Claims up to `CLAIM_BATCH_SIZE` due jobs and drives each to a
    /// terminal or retry state in sequence — the single-poller design of
    /// §5 means no two jobs for the same batch ever execute concurrently.
    pub async fn tick(&self) -> Result<TickSummary, SchedulerError> {
        let now = self.clock.now();
        let claimed = self.store.claim_due_jobs(now, CLAIM_BATCH_SIZE).await?;
        let mut summary = TickSummary { claimed: claimed.len(), ..Default::default() };

        for job in claimed {
            match self.execute_one(&job).await {
                Ok(()) => {
                    self.store.mark_job_done(job.id).await?;
                    summary.done += 1;
                }
                Err(err) => {
                    tracing::error!(job_id = %job.id, error = %err, "job execution failed, requeueing");
                    self.store.requeue_job(job.id).await?;
                    summary.retried += 1;
                }
            }
        }

        tracing::debug!(
            claimed = summary.claimed,
            done = summary.done,
            retried = summary.retried,
            "scheduler tick complete"
        );
        Ok(summary)
    }

    async fn execute_one(&self, job: &ScheduledJob) -> Result<(), SchedulerError> {
        debug_assert_eq!(job.status, JobStatus::Running);
        self.engine.execute_node(job.participant_id, job.node_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashmsg_core::{Activation, FakeClock, MessageTemplate, Node, Participant, ProjectId};
    use dashmsg_store::InMemoryStore;

    fn scheduler(store: &InMemoryStore, clock: &FakeClock) -> Scheduler<InMemoryStore, FakeClock> {
        Scheduler::new(store.clone(), clock.clone(), std::time::Duration::from_secs(1))
    }

    #[tokio::test]
    async fn tick_claims_and_completes_due_jobs() {
        let store = InMemoryStore::new();
        let clock = FakeClock::new();
        let project_id = ProjectId::new();

        let template = MessageTemplate::builder()
            .project_id(project_id)
            .text_en(Some("Hi".to_string()))
            .build();
        let node = Node::builder()
            .project_id(project_id)
            .message_template_id(template.id)
            .activation(Activation::StartDate(dashmsg_core::VariableId::new()))
            .build();
        store.seed_project(vec![node.clone()], vec![template], vec![], vec![], vec![]);

        let participant = Participant::builder().project_id(project_id).build();
        store.seed_participant(participant.clone());

        {
            let mut tx = store.begin().await.unwrap();
            let job = ScheduledJob::new(participant.id, node.id, clock.now());
            tx.insert_scheduled_job(&job).await.unwrap();
            tx.commit().await.unwrap();
        }

        let scheduler = scheduler(&store, &clock);
        let summary = scheduler.tick().await.unwrap();
        assert_eq!(summary, TickSummary { claimed: 1, done: 1, retried: 0 });

        let jobs = store.jobs_for(participant.id);
        assert_eq!(jobs[0].status, JobStatus::Done);
        assert_eq!(store.messages_for(participant.id).len(), 1);
    }

    #[tokio::test]
    async fn tick_ignores_jobs_not_yet_due() {
        let store = InMemoryStore::new();
        let clock = FakeClock::new();
        let participant_id = dashmsg_core::ParticipantId::new();
        let node_id = dashmsg_core::NodeId::new();

        {
            let mut tx = store.begin().await.unwrap();
            let job = ScheduledJob::new(participant_id, node_id, clock.now() + chrono::Duration::seconds(10));
            tx.insert_scheduled_job(&job).await.unwrap();
            tx.commit().await.unwrap();
        }

        let scheduler = scheduler(&store, &clock);
        let summary = scheduler.tick().await.unwrap();
        assert_eq!(summary.claimed, 0);
    }

    #[tokio::test]
    async fn retries_a_job_whose_target_no_longer_exists_by_leaving_it_pending() {
        // executeNode's own preconditions turn a missing participant/node into
        // Ok(None), not an error — so a dangling job still completes as Done,
        // matching the engine's "not a bug" contract rather than retrying forever.
        let store = InMemoryStore::new();
        let clock = FakeClock::new();
        let participant_id = dashmsg_core::ParticipantId::new();
        let node_id = dashmsg_core::NodeId::new();

        {
            let mut tx = store.begin().await.unwrap();
            let job = ScheduledJob::new(participant_id, node_id, clock.now());
            tx.insert_scheduled_job(&job).await.unwrap();
            tx.commit().await.unwrap();
        }

        let scheduler = scheduler(&store, &clock);
        let summary = scheduler.tick().await.unwrap();
        assert_eq!(summary, TickSummary { claimed: 1, done: 1, retried: 0 });
    }
}
