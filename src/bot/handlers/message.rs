use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use super::{hub, HandlerContext, HandlerResult};
use crate::bot::commands::Command;
use crate::bot::transport::Transport;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: HandlerContext,
) -> HandlerResult {
    let transport = Transport::new(bot, msg.chat.id, ctx.db.pool().clone());
    let user_id = transport.user_id();

    let _guard = ctx.sessions.lock_user(user_id).await;
    ctx.sessions.cancel_refresh(user_id);

    match cmd {
        Command::Start => {
            // The command bubble would sit above the new hub; remove it.
            transport.delete_quietly(i64::from(msg.id.0)).await;
            hub::fresh_hub(&transport, &ctx).await?;
        }
        Command::Help => {
            transport
                .send_line(&Command::descriptions().to_string())
                .await?;
        }
    }

    Ok(())
}
