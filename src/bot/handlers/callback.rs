use teloxide::prelude::*;
use tracing::warn;

use super::{event, finance, health, hub, HandlerContext, HandlerResult};
use crate::bot::cards::placeholder_card;
use crate::bot::transport::Transport;
use crate::bot::wizard::EditField;
use crate::database::models::BotState;

/// Single dispatch point for every inline button. The query is answered
/// first so the client spinner stops even if rendering takes a moment.
pub async fn callback_handler(bot: Bot, q: CallbackQuery, ctx: HandlerContext) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };

    let transport = Transport::new(bot.clone(), message.chat.id, ctx.db.pool().clone());
    let user_id = transport.user_id();

    let _guard = ctx.sessions.lock_user(user_id).await;
    ctx.sessions.cancel_refresh(user_id);

    // The tapped message becomes the anchor; the handlers edit it in place.
    BotState::record_anchor(ctx.db.pool(), user_id, i64::from(message.id.0)).await?;

    match data {
        "hub" | "back_hub" => hub::show_hub(&transport, &ctx).await?,
        "show_modules" => hub::show_modules(&transport).await?,
        "noop" => {}

        "good_morning" => health::good_morning(bot, &transport, &ctx).await?,
        "good_night" => health::good_night(&transport, &ctx).await?,
        "reminders" => {
            transport
                .show_card(&placeholder_card("LEMBRETES", "back_hub"))
                .await?
        }

        "health" => health::show_health(&transport, &ctx).await?,
        "health_sleep" | "health_sleep_details" | "sleep" => {
            health::show_sleep(&transport, &ctx).await?
        }
        "health_water" | "water" | "water_quick" => health::show_water(&transport, &ctx).await?,
        "water_250" => health::quick_water(&transport, &ctx, 250).await?,
        "water_500" => health::quick_water(&transport, &ctx, 500).await?,
        "water_1000" => health::quick_water(&transport, &ctx, 1000).await?,
        "water_insert" => health::water_insert_hint(&transport).await?,
        "health_activity" => {
            transport
                .show_card(&placeholder_card("ATIVIDADE FÍSICA", "health"))
                .await?
        }
        "health_stats" => {
            transport
                .show_card(&placeholder_card("ESTATÍSTICAS", "health"))
                .await?
        }

        "create_event" => event::start_wizard(&transport, &ctx).await?,
        "event_allday_yes" => event::allday_choice(&transport, &ctx, true).await?,
        "event_allday_no" => event::allday_choice(&transport, &ctx, false).await?,
        "event_confirm" => event::confirm(&transport, &ctx).await?,
        "event_cancel" => event::cancel(&transport, &ctx).await?,
        "event_edit" => event::edit_menu(&transport, &ctx).await?,
        "event_exit" => event::exit_edit(&transport, &ctx).await?,
        "edit_title" => event::edit_field(&transport, &ctx, EditField::Title).await?,
        "edit_date" => event::edit_field(&transport, &ctx, EditField::EventDate).await?,
        "edit_start" => event::edit_field(&transport, &ctx, EditField::StartTime).await?,
        "edit_end" => event::edit_field(&transport, &ctx, EditField::EndTime).await?,
        "edit_location" => event::edit_field(&transport, &ctx, EditField::Location).await?,

        "studies" => {
            transport
                .show_card(&placeholder_card("ESTUDOS", "show_modules"))
                .await?
        }

        "finances" => finance::show_finance_hub(&transport, &ctx).await?,
        "fin_bills" => finance::show_bills(&transport, &ctx).await?,
        "fin_categories" => finance::show_categories(&transport, &ctx).await?,
        "fin_extrato" => finance::show_current_statement(&transport, &ctx).await?,
        "fin_goals" => finance::show_goals(&transport, &ctx).await?,
        "fin_reports" => finance::show_reports(&transport, &ctx).await?,
        "fin_entrada" => {
            transport
                .show_card(&placeholder_card("REGISTRAR ENTRADA", "finances"))
                .await?
        }
        "fin_saida" => {
            transport
                .show_card(&placeholder_card("REGISTRAR SAÍDA", "finances"))
                .await?
        }
        "bill_add" => {
            transport
                .show_card(&placeholder_card("ADICIONAR CONTA", "fin_bills"))
                .await?
        }
        "bill_edit" => {
            transport
                .show_card(&placeholder_card("EDITAR CONTAS", "fin_bills"))
                .await?
        }
        "cat_add" => {
            transport
                .show_card(&placeholder_card("ADICIONAR CATEGORIA", "fin_categories"))
                .await?
        }
        "cat_edit" => {
            transport
                .show_card(&placeholder_card("EDITAR CATEGORIAS", "fin_categories"))
                .await?
        }
        "goal_add" => {
            transport
                .show_card(&placeholder_card("NOVA META", "fin_goals"))
                .await?
        }

        other => {
            if let Some(rest) = other.strip_prefix("fin_extrato_") {
                if let Some((month, year)) = parse_statement_nav(rest) {
                    finance::show_statement(&transport, &ctx, month, year).await?;
                    return Ok(());
                }
            }
            warn!("Unhandled callback data: {}", other);
        }
    }

    Ok(())
}

fn parse_statement_nav(rest: &str) -> Option<(u32, i32)> {
    let (month, year) = rest.split_once('_')?;
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    (1..=12).contains(&month).then_some((month, year))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_statement_nav() {
        assert_eq!(parse_statement_nav("2_2026"), Some((2, 2026)));
        assert_eq!(parse_statement_nav("12_2025"), Some((12, 2025)));
        assert_eq!(parse_statement_nav("13_2026"), None);
        assert_eq!(parse_statement_nav("0_2026"), None);
        assert_eq!(parse_statement_nav("fev_2026"), None);
        assert_eq!(parse_statement_nav("2026"), None);
    }
}
