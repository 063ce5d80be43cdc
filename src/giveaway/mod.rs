pub mod draw;
pub mod entry;
pub mod registry;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serenity::all::{ChannelId, GuildId, MessageId, UserId};

pub use registry::GiveawayRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiveawayStatus {
    Open,
    Closed,
}

/// One running giveaway, keyed by the id of its announcement message.
#[derive(Debug, Clone)]
pub struct GiveawayRecord {
    pub id: MessageId,
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub prize: String,
    /// Arrival order, each member at most once.
    pub participants: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub forced_winner_ids: Vec<UserId>,
    pub num_winners: u32,
    pub status: GiveawayStatus,
    pub host_id: UserId,
    pub host_tag: String,
    pub host_avatar_url: String,
    pub duration_token: String,
    pub embed_colour: u32,
}

/// Validated creation parameters, before the announcement message exists.
#[derive(Debug, Clone)]
pub struct NewGiveaway {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub prize: String,
    pub duration_ms: u64,
    pub duration_token: String,
    pub forced_winner_ids: Vec<UserId>,
    pub num_winners: u32,
    pub host_id: UserId,
    pub host_tag: String,
    pub host_avatar_url: String,
    pub embed_colour: u32,
}

impl NewGiveaway {
    pub fn ends_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let ms = i64::try_from(self.duration_ms).unwrap_or(i64::MAX);
        Duration::try_milliseconds(ms)
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// `ends_at` is computed here once and never revised.
    pub fn into_record(self, id: MessageId, now: DateTime<Utc>) -> GiveawayRecord {
        let ends_at = self.ends_at(now);
        GiveawayRecord {
            id,
            guild_id: self.guild_id,
            channel_id: self.channel_id,
            prize: self.prize,
            participants: Vec::new(),
            created_at: now,
            ends_at,
            forced_winner_ids: self.forced_winner_ids,
            num_winners: self.num_winners.max(1),
            status: GiveawayStatus::Open,
            host_id: self.host_id,
            host_tag: self.host_tag,
            host_avatar_url: self.host_avatar_url,
            duration_token: self.duration_token,
            embed_colour: self.embed_colour,
        }
    }
}

/// A member that still resolves in the guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    pub user_id: UserId,
    pub tag: String,
}

/// Member lookup used by the draw. `None` means the member could not be
/// resolved (left the guild, lookup failed).
#[async_trait]
pub trait MemberResolver: Send + Sync {
    async fn resolve(&self, guild_id: GuildId, user_id: UserId) -> Option<MemberRef>;
}

/// Renders giveaway state for members. Errors are delivery failures: callers
/// log them and carry on.
#[async_trait]
pub trait Announcer: Send + Sync {
    async fn participants_changed(&self, record: &GiveawayRecord) -> anyhow::Result<()>;

    /// `winners` may be empty ("no winner").
    async fn giveaway_ended(&self, record: &GiveawayRecord, winners: &[MemberRef]) -> anyhow::Result<()>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    pub fn new_giveaway(duration_ms: u64, num_winners: u32, forced: &[u64]) -> NewGiveaway {
        NewGiveaway {
            guild_id: GuildId::new(1),
            channel_id: ChannelId::new(2),
            prize: "Nitro".into(),
            duration_ms,
            duration_token: "10s".into(),
            forced_winner_ids: forced.iter().copied().map(UserId::new).collect(),
            num_winners,
            host_id: UserId::new(3),
            host_tag: "host#0001".into(),
            host_avatar_url: String::new(),
            embed_colour: 0x2ecc71,
        }
    }

    pub fn record(id: u64, num_winners: u32, participants: &[u64], forced: &[u64]) -> GiveawayRecord {
        let mut r = new_giveaway(10_000, num_winners, forced).into_record(MessageId::new(id), Utc::now());
        r.participants = participants.iter().copied().map(UserId::new).collect();
        r
    }

    /// Resolves every user except those listed as gone.
    #[derive(Default)]
    pub struct FakeMembers {
        pub gone: HashSet<UserId>,
    }

    impl FakeMembers {
        pub fn without(gone: &[u64]) -> Self {
            Self { gone: gone.iter().copied().map(UserId::new).collect() }
        }
    }

    #[async_trait]
    impl MemberResolver for FakeMembers {
        async fn resolve(&self, _guild_id: GuildId, user_id: UserId) -> Option<MemberRef> {
            if self.gone.contains(&user_id) {
                return None;
            }
            Some(MemberRef { user_id, tag: format!("user{}", user_id.get()) })
        }
    }

    #[derive(Default)]
    pub struct FakeAnnouncer {
        pub fail: bool,
        pub progress: Mutex<Vec<(MessageId, usize)>>,
        pub ended: Mutex<Vec<(MessageId, Vec<UserId>)>>,
    }

    #[async_trait]
    impl Announcer for FakeAnnouncer {
        async fn participants_changed(&self, record: &GiveawayRecord) -> anyhow::Result<()> {
            self.progress.lock().unwrap().push((record.id, record.participants.len()));
            Ok(())
        }

        async fn giveaway_ended(&self, record: &GiveawayRecord, winners: &[MemberRef]) -> anyhow::Result<()> {
            self.ended
                .lock()
                .unwrap()
                .push((record.id, winners.iter().map(|w| w.user_id).collect()));
            if self.fail {
                anyhow::bail!("channel deleted");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::new_giveaway;
    use super::*;

    #[test]
    fn test_into_record_computes_end_once() {
        let now = Utc::now();
        let r = new_giveaway(7_200_000, 1, &[]).into_record(MessageId::new(9), now);
        assert_eq!(r.ends_at, now + Duration::hours(2));
        assert_eq!(r.created_at, now);
        assert_eq!(r.status, GiveawayStatus::Open);
        assert!(r.participants.is_empty());
    }

    #[test]
    fn test_into_record_zero_duration_and_winner_floor() {
        let now = Utc::now();
        let r = new_giveaway(0, 0, &[]).into_record(MessageId::new(9), now);
        assert_eq!(r.ends_at, now);
        assert_eq!(r.num_winners, 1);
    }
}
