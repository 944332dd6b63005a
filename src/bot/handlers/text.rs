use teloxide::prelude::*;
use tracing::error;

use super::{event, HandlerContext, HandlerResult};
use crate::bot::transport::Transport;
use crate::database::models::{Category, Transaction, TransactionKind, WaterLog};
use crate::services::Intent;
use crate::utils::format::escape_html;

/// Free text is either an answer to the active wizard question or a message
/// for the intent classifier. The user's bubble is deleted either way so the
/// chat stays a single dashboard.
pub async fn text_handler(bot: Bot, msg: Message, ctx: HandlerContext) -> HandlerResult {
    let Some(text) = msg.text().map(|t| t.to_string()) else {
        return Ok(());
    };

    let transport = Transport::new(bot, msg.chat.id, ctx.db.pool().clone());
    let user_id = transport.user_id();

    let _guard = ctx.sessions.lock_user(user_id).await;
    ctx.sessions.cancel_refresh(user_id);

    transport.delete_quietly(i64::from(msg.id.0)).await;

    if let Some(state) = event::load_state(&ctx, user_id).await? {
        transport.clear_prompt().await?;
        if event::handle_wizard_text(&transport, &ctx, state, &text).await? {
            return Ok(());
        }
    }

    apply_intent(&transport, &ctx, &text).await
}

async fn apply_intent(transport: &Transport, ctx: &HandlerContext, text: &str) -> HandlerResult {
    match ctx.classifier.classify(text).await {
        Intent::FinanceTransaction {
            kind,
            amount,
            category,
            category_emoji,
            description,
            response,
        } => {
            let result = record_transaction(
                ctx,
                transport.user_id(),
                &kind,
                amount,
                category.as_deref(),
                category_emoji.as_deref(),
                description.as_deref(),
            )
            .await;

            match result {
                Ok(()) => {
                    transport
                        .send_line(&format!("✅ {}", escape_html(&response)))
                        .await?;
                }
                Err(err) => {
                    error!("Failed to record transaction: {}", err);
                    transport
                        .send_line("❌ Houve um erro ao registrar sua transação.")
                        .await?;
                }
            }
        }
        Intent::WaterIntake { amount_ml, response } => {
            if amount_ml <= 0 {
                transport.send_line("❌ Erro ao registrar água.").await?;
                return Ok(());
            }
            match WaterLog::create(ctx.db.pool(), transport.user_id(), amount_ml).await {
                Ok(_) => {
                    transport
                        .send_line(&format!("💧 {}", escape_html(&response)))
                        .await?;
                }
                Err(err) => {
                    error!("Failed to record water intake: {}", err);
                    transport.send_line("❌ Erro ao registrar água.").await?;
                }
            }
        }
        Intent::Chat { response } => {
            transport.send_line(&escape_html(&response)).await?;
        }
    }

    Ok(())
}

/// Finds or creates the category, then inserts the transaction.
async fn record_transaction(
    ctx: &HandlerContext,
    user_id: i64,
    kind: &str,
    amount: f64,
    category: Option<&str>,
    category_emoji: Option<&str>,
    description: Option<&str>,
) -> anyhow::Result<()> {
    let kind = TransactionKind::parse(kind)
        .ok_or_else(|| anyhow::anyhow!("unknown transaction kind: {kind}"))?;

    let category_id = match category {
        Some(name) => {
            let found = Category::find_by_name(ctx.db.pool(), user_id, name, kind).await?;
            let category = match found {
                Some(category) => category,
                None => {
                    Category::create(
                        ctx.db.pool(),
                        user_id,
                        name,
                        category_emoji.unwrap_or("📦"),
                        kind,
                    )
                    .await?
                }
            };
            Some(category.id)
        }
        None => None,
    };

    Transaction::create(ctx.db.pool(), user_id, category_id, kind, amount, description).await?;
    Ok(())
}
