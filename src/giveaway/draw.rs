use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serenity::all::UserId;

use super::{GiveawayRecord, MemberRef, MemberResolver};

/// Picks the winners of `record`.
///
/// Forced winners come first: they are resolved in order and the ones that
/// resolve win, up to `num_winners`. If none resolves (or there are none) a
/// random sample of participants is drawn instead. Members that fail to
/// resolve are dropped without replacement. An empty result means no winner.
pub async fn draw(record: &GiveawayRecord, members: &dyn MemberResolver) -> Vec<MemberRef> {
    let mut rng = StdRng::from_entropy();
    draw_with(record, members, &mut rng).await
}

pub async fn draw_with<R>(record: &GiveawayRecord, members: &dyn MemberResolver, rng: &mut R) -> Vec<MemberRef>
where
    R: Rng + Send + ?Sized,
{
    let limit = record.num_winners.max(1) as usize;

    if !record.forced_winner_ids.is_empty() {
        let forced = resolve_all(record, members, &record.forced_winner_ids, limit).await;
        if !forced.is_empty() {
            return forced;
        }
        tracing::info!(
            giveaway_id = %record.id,
            forced = record.forced_winner_ids.len(),
            "no forced winner resolved, falling back to random draw"
        );
    }

    if record.participants.is_empty() {
        return Vec::new();
    }

    let candidates = sample_participants(&record.participants, limit, rng);
    resolve_all(record, members, &candidates, limit).await
}

/// Uniform sample of `n` participants: Fisher-Yates shuffle, then the first
/// `min(n, len)`.
pub fn sample_participants<R>(participants: &[UserId], n: usize, rng: &mut R) -> Vec<UserId>
where
    R: Rng + ?Sized,
{
    let mut pool = participants.to_vec();
    pool.shuffle(rng);
    pool.truncate(n);
    pool
}

async fn resolve_all(
    record: &GiveawayRecord,
    members: &dyn MemberResolver,
    ids: &[UserId],
    limit: usize,
) -> Vec<MemberRef> {
    let mut out = Vec::with_capacity(limit.min(ids.len()));
    for &uid in ids {
        if out.len() >= limit {
            break;
        }
        match members.resolve(record.guild_id, uid).await {
            Some(m) => out.push(m),
            None => tracing::debug!(giveaway_id = %record.id, user_id = %uid, "winner did not resolve, dropped"),
        }
    }
    out
}
