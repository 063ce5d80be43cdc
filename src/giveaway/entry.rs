use serenity::all::{MessageId, UserId};

use super::GiveawayRegistry;
use crate::errors::GiveawayError;

/// Adds `member` to giveaway `id` and returns the new participant count.
///
/// `NotFound` when the giveaway is closed or never existed, `AlreadyEntered`
/// when the member is already in. Neither changes anything.
pub fn enter(registry: &GiveawayRegistry, id: MessageId, member: UserId) -> Result<usize, GiveawayError> {
    registry
        .with_open_mut(id, |g| {
            if g.participants.contains(&member) {
                return Err(GiveawayError::AlreadyEntered);
            }
            g.participants.push(member);
            Ok(g.participants.len())
        })
        .unwrap_or(Err(GiveawayError::NotFound(id)))
}
