use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono_tz::Tz;
use serenity::all::{ChannelId, GuildId, Http, UserId};
use serenity::builder::EditMessage;

use crate::giveaway::{Announcer, GiveawayRecord, MemberRef, MemberResolver};
use crate::ui::embeds;

/// Looks members up over HTTP; any failure counts as "left the guild".
pub struct DiscordMembers {
    http: Arc<Http>,
}

impl DiscordMembers {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MemberResolver for DiscordMembers {
    async fn resolve(&self, guild_id: GuildId, user_id: UserId) -> Option<MemberRef> {
        match guild_id.member(self.http.as_ref(), user_id).await {
            Ok(m) => Some(MemberRef { user_id, tag: m.user.tag() }),
            Err(e) => {
                tracing::debug!(guild_id = %guild_id, user_id = %user_id, error = %e, "member lookup failed");
                None
            }
        }
    }
}

/// Edits the announcement message, posts results and audit lines.
pub struct DiscordAnnouncer {
    http: Arc<Http>,
    log_channel: Option<ChannelId>,
    tz: Tz,
}

impl DiscordAnnouncer {
    pub fn new(http: Arc<Http>, log_channel: Option<ChannelId>, tz: Tz) -> Self {
        Self { http, log_channel, tz }
    }

    pub async fn log_started(&self, record: &GiveawayRecord) {
        let line = embeds::log_started_text(record, self.tz);
        if let Err(e) = self.log(line).await {
            tracing::warn!(giveaway_id = %record.id, error = %format!("{e:#}"), "audit log failed");
        }
    }

    async fn log(&self, line: String) -> anyhow::Result<()> {
        let Some(channel) = self.log_channel else { return Ok(()) };
        channel
            .say(self.http.as_ref(), line)
            .await
            .context("send audit line")?;
        Ok(())
    }
}

#[async_trait]
impl Announcer for DiscordAnnouncer {
    async fn participants_changed(&self, record: &GiveawayRecord) -> anyhow::Result<()> {
        record
            .channel_id
            .edit_message(
                self.http.as_ref(),
                record.id,
                EditMessage::new().embed(embeds::render_progress_embed(record)),
            )
            .await
            .context("edit giveaway progress")?;
        Ok(())
    }

    /// Each step is attempted even if an earlier one failed; the first error
    /// is returned.
    async fn giveaway_ended(&self, record: &GiveawayRecord, winners: &[MemberRef]) -> anyhow::Result<()> {
        let mut first_err: Option<anyhow::Error> = None;

        let edited = record
            .channel_id
            .edit_message(
                self.http.as_ref(),
                record.id,
                EditMessage::new()
                    .embed(embeds::render_ended_embed(record, winners))
                    .components(Vec::new()),
            )
            .await
            .context("edit ended giveaway");
        if let Err(e) = edited {
            first_err.get_or_insert(e);
        }

        if let Some(text) = embeds::congratulations_text(record, winners) {
            let sent = record
                .channel_id
                .say(self.http.as_ref(), text)
                .await
                .context("send congratulations");
            if let Err(e) = sent {
                first_err.get_or_insert(e);
            }
        }

        if let Err(e) = self.log(embeds::log_ended_text(record, winners)).await {
            first_err.get_or_insert(e);
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
