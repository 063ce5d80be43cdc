use std::sync::Arc;

use chrono::{DateTime, Utc};
use serenity::all::MessageId;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};

use crate::giveaway::draw::draw;
use crate::giveaway::{Announcer, GiveawayRecord, GiveawayRegistry, GiveawayStatus, MemberRef, MemberResolver};

/// Result of a closure that actually ran.
#[derive(Debug, Clone)]
pub struct ClosedGiveaway {
    pub record: GiveawayRecord,
    pub winners: Vec<MemberRef>,
}

/// Opens giveaways and arms their one-shot closure timers.
///
/// Timers carry only the giveaway id and look the record up when they fire,
/// so a giveaway that was already closed some other way is skipped.
#[derive(Clone)]
pub struct Lifecycle {
    registry: Arc<GiveawayRegistry>,
    members: Arc<dyn MemberResolver>,
    announcer: Arc<dyn Announcer>,
}

impl Lifecycle {
    pub fn new(
        registry: Arc<GiveawayRegistry>,
        members: Arc<dyn MemberResolver>,
        announcer: Arc<dyn Announcer>,
    ) -> Self {
        Self { registry, members, announcer }
    }

    pub fn registry(&self) -> &GiveawayRegistry {
        &self.registry
    }

    pub fn announcer(&self) -> &dyn Announcer {
        self.announcer.as_ref()
    }

    /// Registers `record` and arms its closure at `ends_at`.
    pub fn open(&self, record: GiveawayRecord) -> MessageId {
        let ends_at = record.ends_at;
        let host_id = record.host_id;
        let id = self.registry.create(record);
        tracing::info!(giveaway_id = %id, host_id = %host_id, ends_at = %ends_at, "giveaway opened");
        self.schedule_close(id, ends_at);
        id
    }

    /// Spawns the deferred closure. An end in the past fires right away.
    pub fn schedule_close(&self, id: MessageId, run_at: DateTime<Utc>) -> JoinHandle<()> {
        let wait = (run_at - Utc::now()).to_std().unwrap_or(Duration::from_secs(0));
        let when = Instant::now() + wait;
        let this = self.clone();
        tokio::spawn(async move {
            sleep_until(when).await;
            let _ = this.close(id).await;
        })
    }

    /// Closes giveaway `id` now: removes it, draws, announces.
    ///
    /// `None` when it is not open (closed already or never existed). Once the
    /// record is removed the closure always completes; announcement failures
    /// are only logged.
    pub async fn close(&self, id: MessageId) -> Option<ClosedGiveaway> {
        let Some(record) = self.registry.delete(id) else {
            tracing::debug!(giveaway_id = %id, "closure skipped, giveaway not open");
            return None;
        };

        debug_assert_eq!(record.status, GiveawayStatus::Closed);

        let winners = draw(&record, self.members.as_ref()).await;
        tracing::info!(
            giveaway_id = %id,
            open_secs = (Utc::now() - record.created_at).num_seconds(),
            participants = record.participants.len(),
            winners = winners.len(),
            "giveaway closed"
        );

        if let Err(e) = self.announcer.giveaway_ended(&record, &winners).await {
            tracing::warn!(giveaway_id = %id, error = %format!("{e:#}"), "failed to announce giveaway result");
        }

        Some(ClosedGiveaway { record, winners })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GiveawayError;
    use crate::giveaway::entry::enter;
    use crate::giveaway::testing::{new_giveaway, record, FakeAnnouncer, FakeMembers};
    use serenity::all::UserId;

    fn lifecycle(announcer: Arc<FakeAnnouncer>) -> Lifecycle {
        Lifecycle::new(
            Arc::new(GiveawayRegistry::new()),
            Arc::new(FakeMembers::default()),
            announcer,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_closes_and_removes() {
        let announcer = Arc::new(FakeAnnouncer::default());
        let lc = lifecycle(announcer.clone());
        let rec = new_giveaway(10_000, 1, &[]).into_record(MessageId::new(5), Utc::now());
        let id = lc.registry().create(rec.clone());
        enter(lc.registry(), id, UserId::new(100)).unwrap();

        let handle = lc.schedule_close(id, rec.ends_at);
        tokio::time::advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
        assert!(lc.registry().get(id).is_some(), "closed before end");

        handle.await.unwrap();

        assert!(lc.registry().get(id).is_none());
        assert_eq!(enter(lc.registry(), id, UserId::new(101)), Err(GiveawayError::NotFound(id)));
        let ended = announcer.ended.lock().unwrap().clone();
        assert_eq!(ended, vec![(id, vec![UserId::new(100)])]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_arms_closure() {
        let announcer = Arc::new(FakeAnnouncer::default());
        let lc = lifecycle(announcer.clone());
        let id = lc.open(new_giveaway(60_000, 1, &[]).into_record(MessageId::new(8), Utc::now()));
        assert!(lc.registry().get(id).is_some());

        tokio::time::sleep(Duration::from_secs(61)).await;

        assert!(lc.registry().is_empty());
        let ended = announcer.ended.lock().unwrap().clone();
        assert_eq!(ended, vec![(id, vec![])]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_past_end_fires_immediately() {
        let announcer = Arc::new(FakeAnnouncer::default());
        let lc = lifecycle(announcer.clone());
        let id = lc.registry().create(record(5, 1, &[], &[]));

        lc.schedule_close(id, Utc::now() - chrono::Duration::seconds(30)).await.unwrap();

        assert!(lc.registry().is_empty());
        assert_eq!(announcer.ended.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_early_close_makes_timer_a_noop() {
        let announcer = Arc::new(FakeAnnouncer::default());
        let lc = lifecycle(announcer.clone());
        let rec = record(5, 1, &[100, 101], &[]);
        let ends_at = rec.ends_at;
        let id = lc.registry().create(rec);
        let handle = lc.schedule_close(id, ends_at);

        let closed = lc.close(id).await.expect("early close runs");
        assert_eq!(closed.winners.len(), 1);
        assert!(lc.close(id).await.is_none());

        handle.await.unwrap();
        assert_eq!(announcer.ended.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_close_unknown_is_none() {
        let announcer = Arc::new(FakeAnnouncer::default());
        let lc = lifecycle(announcer.clone());
        assert!(lc.close(MessageId::new(404)).await.is_none());
        assert!(announcer.ended.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_announce_failure_still_closes() {
        let announcer = Arc::new(FakeAnnouncer { fail: true, ..Default::default() });
        let lc = lifecycle(announcer.clone());
        let id = lc.registry().create(record(5, 2, &[100], &[200]));

        let closed = lc.close(id).await.expect("closure completes");

        assert_eq!(closed.winners.iter().map(|w| w.user_id).collect::<Vec<_>>(), vec![UserId::new(200)]);
        assert!(lc.registry().get(id).is_none());
        assert_eq!(announcer.ended.lock().unwrap().len(), 1);
    }
}
