use teloxide::prelude::*;
use tracing::warn;

use super::HandlerContext;
use crate::bot::cards::{hub, Card};
use crate::bot::transport::Transport;
use crate::database::models::{BotState, WaterLog};
use crate::utils::datetime::{day_bounds_utc, local_now, local_offset};

/// Assembles the hub card from today's data.
pub async fn build_hub_card(ctx: &HandlerContext, user_id: i64) -> anyhow::Result<Card> {
    let now = local_now(ctx.config.utc_offset_hours);
    let (from, to) = day_bounds_utc(now.date_naive(), local_offset(ctx.config.utc_offset_hours));
    let water_today_ml = WaterLog::total_between(ctx.db.pool(), user_id, &from, &to).await?;

    Ok(hub::hub_card(&hub::HubView {
        name: &ctx.config.user_display_name,
        local_now: now,
        water_today_ml,
        water_goal_ml: ctx.config.water_goal_ml,
    }))
}

pub async fn show_hub(transport: &Transport, ctx: &HandlerContext) -> anyhow::Result<()> {
    let card = build_hub_card(ctx, transport.user_id()).await?;
    transport.show_card(&card).await
}

pub async fn show_modules(transport: &Transport) -> anyhow::Result<()> {
    transport.show_card(&hub::modules_card()).await
}

/// Start-over flow: the previous dashboard messages are removed so the new
/// hub lands at the bottom of the chat as the only living card.
pub async fn fresh_hub(transport: &Transport, ctx: &HandlerContext) -> anyhow::Result<()> {
    let user_id = transport.user_id();

    if let Some(state) = BotState::load(ctx.db.pool(), user_id).await? {
        if let Some(last_id) = state.last_message_id {
            transport.delete_quietly(last_id).await;
        }
        if let Some(anchor_id) = state.anchor_message_id {
            if state.last_message_id != Some(anchor_id) {
                transport.delete_quietly(anchor_id).await;
            }
        }
        if let Some(prompt_id) = state.prompt_message_id {
            transport.delete_quietly(prompt_id).await;
        }
    }
    BotState::clear_state(ctx.db.pool(), user_id).await?;
    BotState::set_prompt_message(ctx.db.pool(), user_id, None).await?;

    let card = build_hub_card(ctx, user_id).await?;
    transport.send_card(&card).await?;
    Ok(())
}

/// Queues the return to the hub shown after the wake-up card. Any
/// interaction before it fires cancels it via [`UserSessions`].
///
/// [`UserSessions`]: crate::services::UserSessions
pub fn schedule_hub_return(bot: Bot, ctx: &HandlerContext, chat_id: ChatId) {
    let delay = std::time::Duration::from_secs(ctx.config.hub_refresh_secs);
    let user_id = chat_id.0;
    let ctx_task = ctx.clone();

    ctx.sessions.schedule_refresh(user_id, delay, async move {
        let transport = Transport::new(bot, chat_id, ctx_task.db.pool().clone());
        let result = match build_hub_card(&ctx_task, user_id).await {
            Ok(card) => transport.show_card(&card).await,
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            warn!("Scheduled hub refresh failed: {}", err);
        }
    });
}
