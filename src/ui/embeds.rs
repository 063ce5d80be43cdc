use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serenity::all::{Colour, CreateEmbed, CreateEmbedFooter, Timestamp};

use crate::giveaway::{GiveawayRecord, MemberRef, NewGiveaway};
use crate::utils::{fmt_local, mention_user, relative_time};

const OPEN_TITLE: &str = "🎉 GIVEAWAY";
const ENDED_TITLE: &str = "⏰ GIVEAWAY ENDED";
const LIST_LIMIT: usize = 20;

pub fn render_new_giveaway_embed(new: &NewGiveaway, ends_at: DateTime<Utc>) -> CreateEmbed {
    CreateEmbed::new()
        .title(OPEN_TITLE)
        .description(announcement_text(&new.prize, &new.duration_token, 0, ends_at))
        .colour(Colour::new(new.embed_colour))
        .timestamp(Timestamp::now())
        .footer(host_footer(&new.host_tag, &new.host_avatar_url))
}

pub fn render_progress_embed(g: &GiveawayRecord) -> CreateEmbed {
    CreateEmbed::new()
        .title(OPEN_TITLE)
        .description(announcement_text(&g.prize, "in progress", g.participants.len(), g.ends_at))
        .colour(Colour::new(g.embed_colour))
        .timestamp(Timestamp::now())
        .footer(host_footer(&g.host_tag, &g.host_avatar_url))
}

pub fn render_ended_embed(g: &GiveawayRecord, winners: &[MemberRef]) -> CreateEmbed {
    let colour = if winners.is_empty() { Colour::LIGHT_GREY } else { Colour::GOLD };
    CreateEmbed::new()
        .title(ENDED_TITLE)
        .description(ended_text(g, winners))
        .colour(colour)
        .timestamp(Timestamp::now())
        .footer(host_footer(&g.host_tag, &g.host_avatar_url))
}

fn host_footer(host_tag: &str, avatar_url: &str) -> CreateEmbedFooter {
    let footer = CreateEmbedFooter::new(format!("Giveaway by {host_tag}"));
    if avatar_url.is_empty() {
        footer
    } else {
        footer.icon_url(avatar_url)
    }
}

pub fn announcement_text(prize: &str, duration: &str, participants: usize, ends_at: DateTime<Utc>) -> String {
    format!(
        "**Prize:** {prize}\n**Duration:** {duration}\n**Ends:** {}\n**Participants:** {participants}\nClick 🎁 to enter!",
        relative_time(ends_at)
    )
}

pub fn ended_text(g: &GiveawayRecord, winners: &[MemberRef]) -> String {
    if winners.is_empty() {
        format!("No winner for the prize: **{}**", g.prize)
    } else {
        format!("Winners: {}\n**Prize:** {}", winner_mentions(winners), g.prize)
    }
}

/// Public message posted in the giveaway channel; none without winners.
pub fn congratulations_text(g: &GiveawayRecord, winners: &[MemberRef]) -> Option<String> {
    if winners.is_empty() {
        return None;
    }
    Some(format!(
        "Congratulations {}! 🎉 You won **{}**!",
        winner_mentions(winners),
        g.prize
    ))
}

pub fn log_started_text(g: &GiveawayRecord, tz: Tz) -> String {
    format!(
        "Giveaway started by {} | Prize: {} | Duration: {} | Ends: {}",
        g.host_tag,
        g.prize,
        g.duration_token,
        fmt_local(g.ends_at, tz)
    )
}

pub fn log_ended_text(g: &GiveawayRecord, winners: &[MemberRef]) -> String {
    let tags = if winners.is_empty() {
        "none".to_string()
    } else {
        winners.iter().map(|w| w.tag.as_str()).collect::<Vec<_>>().join(", ")
    };
    format!(
        "Giveaway ended. Winners: {tags} | Prize: {} | Participants: {}",
        g.prize,
        g.participants.len()
    )
}

/// Lines for `/giveaway-list`.
pub fn render_open_list(giveaways: &[GiveawayRecord]) -> String {
    if giveaways.is_empty() {
        return "No giveaway is running.".to_string();
    }
    let mut lines: Vec<String> = giveaways
        .iter()
        .take(LIST_LIMIT)
        .map(|g| {
            format!(
                "• **{}** | {} participant(s) | ends {} | https://discord.com/channels/{}/{}/{}",
                g.prize,
                g.participants.len(),
                relative_time(g.ends_at),
                g.guild_id,
                g.channel_id,
                g.id
            )
        })
        .collect();
    if giveaways.len() > LIST_LIMIT {
        lines.push(format!("... and {} more", giveaways.len() - LIST_LIMIT));
    }
    lines.join("\n")
}

fn winner_mentions(winners: &[MemberRef]) -> String {
    winners
        .iter()
        .map(|w| mention_user(w.user_id))
        .collect::<Vec<_>>()
        .join(", ")
}
