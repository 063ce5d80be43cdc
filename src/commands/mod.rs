pub mod giveaway;

use serenity::all::Command;
use serenity::prelude::Context;

use crate::config::AppConfig;

/// Guild commands show up immediately; global ones can take a while.
pub async fn register_commands(ctx: &Context, cfg: &AppConfig) -> anyhow::Result<()> {
    let commands = giveaway::commands(cfg);
    match cfg.guild_id {
        Some(gid) => {
            gid.set_commands(&ctx.http, commands).await?;
            tracing::info!(guild_id = %gid, "registered guild commands");
        }
        None => {
            Command::set_global_commands(&ctx.http, commands).await?;
            tracing::info!("registered global commands");
        }
    }
    Ok(())
}
