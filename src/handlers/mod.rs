pub mod components;

use std::sync::Arc;

use serenity::all::{Context, EventHandler, Interaction, Ready};
use serenity::async_trait;

use crate::announcer::DiscordAnnouncer;
use crate::config::AppConfig;
use crate::tasks::Lifecycle;

/// Everything a handler needs, owned here and passed down by reference.
pub struct BotState {
    pub config: AppConfig,
    pub lifecycle: Lifecycle,
    pub announcer: Arc<DiscordAnnouncer>,
}

pub struct Handler {
    state: Arc<BotState>,
}

impl Handler {
    pub fn new(state: BotState) -> Self {
        Self { state: Arc::new(state) }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!(user = %ready.user.name, "connected");

        if let Err(e) = crate::commands::register_commands(&ctx, &self.state.config).await {
            tracing::error!(error = %format!("{e:#}"), "failed to register commands");
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(cmd) => {
                if let Err(e) = crate::commands::giveaway::handle(&ctx, &cmd, &self.state).await {
                    tracing::error!(command = %cmd.data.name, error = %format!("{e:#}"), "command error");
                }
            }
            Interaction::Component(comp) => {
                if let Err(e) = components::handle_component(&ctx, &comp, &self.state).await {
                    tracing::error!(custom_id = %comp.data.custom_id, error = %format!("{e:#}"), "component error");
                }
            }
            _ => {}
        }
    }
}
