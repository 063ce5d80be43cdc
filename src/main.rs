mod announcer;
mod commands;
mod config;
mod errors;
mod giveaway;
mod handlers;
mod tasks;
mod ui;
mod utils;

use std::sync::Arc;

use dotenvy::dotenv;
use serenity::all::{Client, GatewayIntents, Http};

use crate::announcer::{DiscordAnnouncer, DiscordMembers};
use crate::config::AppConfig;
use crate::giveaway::GiveawayRegistry;
use crate::handlers::{BotState, Handler};
use crate::tasks::Lifecycle;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    if config.allowed_role_ids.is_empty() {
        tracing::warn!("GIVEAWAY_ROLE_IDS is empty, nobody can start giveaways");
    }

    let http = Arc::new(Http::new(&config.discord_token));
    let announcer = Arc::new(DiscordAnnouncer::new(
        http.clone(),
        config.log_channel_id,
        config.display_tz,
    ));
    let lifecycle = Lifecycle::new(
        Arc::new(GiveawayRegistry::new()),
        Arc::new(DiscordMembers::new(http)),
        announcer.clone(),
    );

    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES;
    let handler = Handler::new(BotState {
        config: config.clone(),
        lifecycle,
        announcer,
    });

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await?;

    client.start().await?;
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("giveaway_bot=info")))
        .with(fmt::layer())
        .init();
}
