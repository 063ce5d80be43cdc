use serenity::all::{ComponentInteraction, Context};
use serenity::builder::{CreateInteractionResponse, CreateInteractionResponseMessage};

use crate::giveaway::entry;
use crate::handlers::BotState;
use crate::ui::menus;

pub async fn handle_component(ctx: &Context, it: &ComponentInteraction, state: &BotState) -> anyhow::Result<()> {
    match it.data.custom_id.as_str() {
        menus::ENTER_BUTTON_ID => enter_giveaway(ctx, it, state).await?,
        _ => {}
    }
    Ok(())
}

async fn enter_giveaway(ctx: &Context, it: &ComponentInteraction, state: &BotState) -> anyhow::Result<()> {
    let id = it.message.id;
    let registry = state.lifecycle.registry();

    let (entered, content) = match entry::enter(registry, id, it.user.id) {
        Ok(count) => {
            tracing::info!(giveaway_id = %id, user_id = %it.user.id, participants = count, "member entered");
            (true, "✅ You are now registered for the giveaway!".to_string())
        }
        Err(e) => (false, e.user_message()),
    };

    it.create_response(
        &ctx.http,
        CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(content)
                .ephemeral(true),
        ),
    )
    .await?;

    if !entered {
        return Ok(());
    }

    // The giveaway may have closed while we were replying.
    let Some(record) = registry.get(id) else { return Ok(()) };
    if let Err(e) = state.lifecycle.announcer().participants_changed(&record).await {
        tracing::warn!(giveaway_id = %id, error = %format!("{e:#}"), "failed to refresh giveaway message");
    }
    Ok(())
}
