use anyhow::Context as _;
use chrono::Utc;
use rand::Rng;
use serenity::all::*;
use serenity::builder::CreateMessage;

use crate::config::AppConfig;
use crate::errors::GiveawayError;
use crate::giveaway::NewGiveaway;
use crate::handlers::BotState;
use crate::ui::{embeds, menus};
use crate::utils::{parse_duration, parse_id_list};

pub const GIVEAWAY: &str = "giveaway";
pub const GIVEAWAY_END: &str = "giveaway-end";
pub const GIVEAWAY_LIST: &str = "giveaway-list";

pub fn commands(cfg: &AppConfig) -> Vec<CreateCommand> {
    vec![
        CreateCommand::new(GIVEAWAY)
            .description("Start a giveaway")
            .add_option(CreateCommandOption::new(CommandOptionType::String, "prize", "The prize").required(true))
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "duration", "Duration (e.g. 10s, 5m, 2h, 1d)")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(CommandOptionType::Integer, "numwinners", "Number of winners")
                    .min_int_value(1)
                    .max_int_value(u64::from(cfg.max_winners)),
            )
            .add_option(CreateCommandOption::new(
                CommandOptionType::String,
                "winners",
                "Forced winner id(s), separated by ,",
            )),
        CreateCommand::new(GIVEAWAY_END)
            .description("End a running giveaway now")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "message_id", "Giveaway message id")
                    .required(true),
            ),
        CreateCommand::new(GIVEAWAY_LIST).description("List running giveaways in this server"),
    ]
}

pub async fn handle(ctx: &Context, cmd: &CommandInteraction, state: &BotState) -> anyhow::Result<()> {
    match cmd.data.name.as_str() {
        GIVEAWAY => handle_create(ctx, cmd, state).await,
        GIVEAWAY_END => handle_end(ctx, cmd, state).await,
        GIVEAWAY_LIST => handle_list(ctx, cmd, state).await,
        _ => Ok(()),
    }
}

/// Raw `/giveaway` options.
#[derive(Debug, Default, Clone)]
pub struct CreateOptions {
    pub prize: String,
    pub duration: String,
    pub num_winners: Option<i64>,
    pub winners: String,
}

/// Who ran the command.
#[derive(Debug, Clone)]
pub struct Invoker {
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    pub user_id: UserId,
    pub tag: String,
    pub avatar_url: String,
    pub roles: Vec<RoleId>,
}

/// Checks a creation request without touching any state.
pub fn validate_create(cfg: &AppConfig, who: &Invoker, opts: CreateOptions) -> Result<NewGiveaway, GiveawayError> {
    let guild_id = who.guild_id.ok_or(GiveawayError::NotInGuild)?;
    if !cfg.is_authorized(&who.roles) {
        return Err(GiveawayError::Unauthorized);
    }

    let duration = opts.duration.trim().to_string();
    let duration_ms = parse_duration(&duration)?;
    if duration_ms > cfg.max_duration_ms {
        return Err(GiveawayError::DurationTooLong {
            token: duration,
            max: cfg.max_duration_token.clone(),
        });
    }

    let num_winners = opts.num_winners.unwrap_or(1);
    if num_winners < 1 || num_winners > i64::from(cfg.max_winners) {
        return Err(GiveawayError::InvalidWinnerCount(num_winners));
    }

    Ok(NewGiveaway {
        guild_id,
        channel_id: who.channel_id,
        prize: opts.prize.trim().to_string(),
        duration_ms,
        duration_token: duration,
        forced_winner_ids: parse_id_list(&opts.winners),
        num_winners: num_winners as u32,
        host_id: who.user_id,
        host_tag: who.tag.clone(),
        host_avatar_url: who.avatar_url.clone(),
        embed_colour: rand::thread_rng().gen_range(0..=0xFF_FFFF),
    })
}

fn invoker(cmd: &CommandInteraction) -> Invoker {
    Invoker {
        guild_id: cmd.guild_id,
        channel_id: cmd.channel_id,
        user_id: cmd.user.id,
        tag: cmd.user.tag(),
        avatar_url: cmd.user.face(),
        roles: cmd.member.as_ref().map(|m| m.roles.clone()).unwrap_or_default(),
    }
}

async fn handle_create(ctx: &Context, cmd: &CommandInteraction, state: &BotState) -> anyhow::Result<()> {
    let mut opts = CreateOptions::default();
    for opt in &cmd.data.options {
        match opt.name.as_str() {
            "prize" => if let CommandDataOptionValue::String(s) = &opt.value { opts.prize = s.clone(); },
            "duration" => if let CommandDataOptionValue::String(s) = &opt.value { opts.duration = s.clone(); },
            "numwinners" => if let CommandDataOptionValue::Integer(n) = &opt.value { opts.num_winners = Some(*n); },
            "winners" => if let CommandDataOptionValue::String(s) = &opt.value { opts.winners = s.clone(); },
            _ => {}
        }
    }

    let new = match validate_create(&state.config, &invoker(cmd), opts) {
        Ok(n) => n,
        Err(e) => {
            tracing::info!(user_id = %cmd.user.id, reason = %e, "giveaway creation rejected");
            return reply(ctx, cmd, e.user_message()).await;
        }
    };

    let now = Utc::now();
    let msg = cmd
        .channel_id
        .send_message(
            &ctx.http,
            CreateMessage::new()
                .embed(embeds::render_new_giveaway_embed(&new, new.ends_at(now)))
                .components(vec![menus::enter_button_row()]),
        )
        .await
        .context("post giveaway announcement")?;

    let record = new.into_record(msg.id, now);
    state.lifecycle.open(record.clone());
    state.announcer.log_started(&record).await;

    reply(ctx, cmd, "Giveaway started! 🎉".to_string()).await
}

async fn handle_end(ctx: &Context, cmd: &CommandInteraction, state: &BotState) -> anyhow::Result<()> {
    let who = invoker(cmd);
    let Some(guild_id) = who.guild_id else {
        return reply(ctx, cmd, GiveawayError::NotInGuild.user_message()).await;
    };
    if !state.config.is_authorized(&who.roles) {
        return reply(ctx, cmd, GiveawayError::Unauthorized.user_message()).await;
    }

    let raw = cmd
        .data
        .options
        .iter()
        .find(|o| o.name == "message_id")
        .and_then(|o| o.value.as_str())
        .unwrap_or_default();
    let Some(id) = parse_message_id(raw) else {
        return reply(ctx, cmd, "Invalid message id.".to_string()).await;
    };

    let in_this_guild = state
        .lifecycle
        .registry()
        .get(id)
        .is_some_and(|g| g.guild_id == guild_id);
    if !in_this_guild {
        return reply(ctx, cmd, GiveawayError::NotFound(id).user_message()).await;
    }

    // Drawing and announcing hits the API, acknowledge first.
    cmd.defer_ephemeral(&ctx.http).await?;
    tracing::info!(giveaway_id = %id, user_id = %cmd.user.id, "giveaway ended early");
    let content = match state.lifecycle.close(id).await {
        Some(closed) => format!("Giveaway ended with {} winner(s).", closed.winners.len()),
        None => GiveawayError::NotFound(id).user_message(),
    };
    cmd.edit_response(&ctx.http, EditInteractionResponse::new().content(content))
        .await?;
    Ok(())
}

async fn handle_list(ctx: &Context, cmd: &CommandInteraction, state: &BotState) -> anyhow::Result<()> {
    let Some(guild_id) = cmd.guild_id else {
        return reply(ctx, cmd, GiveawayError::NotInGuild.user_message()).await;
    };
    let open: Vec<_> = state
        .lifecycle
        .registry()
        .open_giveaways()
        .into_iter()
        .filter(|g| g.guild_id == guild_id)
        .collect();
    reply(ctx, cmd, embeds::render_open_list(&open)).await
}

/// Accepts a bare id or a message link.
pub fn parse_message_id(raw: &str) -> Option<MessageId> {
    let last = raw.trim().rsplit('/').next()?;
    match last.parse::<u64>() {
        Ok(id) if id != 0 => Some(MessageId::new(id)),
        _ => None,
    }
}

async fn reply(ctx: &Context, cmd: &CommandInteraction, content: String) -> anyhow::Result<()> {
    cmd.create_response(
        &ctx.http,
        CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(content)
                .ephemeral(true),
        ),
    )
    .await?;
    Ok(())
}
