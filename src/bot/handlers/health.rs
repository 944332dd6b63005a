use chrono::{Datelike, Duration, Timelike, Utc};
use teloxide::prelude::*;

use super::{hub, HandlerContext};
use crate::bot::cards::health as cards;
use crate::bot::transport::Transport;
use crate::database::models::{pair_nights, SleepKind, SleepLog, WaterLog};
use crate::utils::datetime::{day_bounds_utc, local_now, local_offset, weekday_short_pt};

/// Most recent completed night within the last two days, if any.
async fn last_night_minutes(
    ctx: &HandlerContext,
    user_id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    let since = (Utc::now() - Duration::hours(48)).to_rfc3339();
    let logs = SleepLog::since(ctx.db.pool(), user_id, &since).await?;
    Ok(pair_nights(&logs).last().map(|night| night.minutes))
}

pub async fn show_health(transport: &Transport, ctx: &HandlerContext) -> anyhow::Result<()> {
    let user_id = transport.user_id();
    let now = local_now(ctx.config.utc_offset_hours);
    let (from, to) = day_bounds_utc(now.date_naive(), local_offset(ctx.config.utc_offset_hours));

    let water_today_ml = WaterLog::total_between(ctx.db.pool(), user_id, &from, &to).await?;
    let last_night = last_night_minutes(ctx, user_id).await?;

    let card = cards::health_card(&cards::HealthView {
        last_night_minutes: last_night,
        water_today_ml,
        water_goal_ml: ctx.config.water_goal_ml,
    });
    transport.show_card(&card).await
}

/// Weekly sleep chart: one row per local day, keyed by when the user woke.
pub async fn show_sleep(transport: &Transport, ctx: &HandlerContext) -> anyhow::Result<()> {
    let user_id = transport.user_id();
    let offset = local_offset(ctx.config.utc_offset_hours);
    let today = local_now(ctx.config.utc_offset_hours).date_naive();

    // Eight days of logs cover seven nights plus the sleep that started
    // the evening before the window.
    let (since, _) = day_bounds_utc(today - Duration::days(8), offset);
    let logs = SleepLog::since(ctx.db.pool(), user_id, &since).await?;
    let nights = pair_nights(&logs);

    let mut days = Vec::with_capacity(7);
    for back in (0..7).rev() {
        let date = today - Duration::days(back);
        let minutes = nights
            .iter()
            .filter(|night| night.woke_at.with_timezone(&offset).date_naive() == date)
            .map(|night| night.minutes)
            .max();
        days.push(cards::SleepDay {
            label: weekday_short_pt(date.weekday()),
            minutes,
        });
    }

    transport.show_card(&cards::sleep_card(&days)).await
}

pub async fn show_water(transport: &Transport, ctx: &HandlerContext) -> anyhow::Result<()> {
    let user_id = transport.user_id();
    let offset = local_offset(ctx.config.utc_offset_hours);
    let today = local_now(ctx.config.utc_offset_hours).date_naive();
    let (from, to) = day_bounds_utc(today, offset);

    let today_ml = WaterLog::total_between(ctx.db.pool(), user_id, &from, &to).await?;
    let recent = WaterLog::recent(ctx.db.pool(), user_id, 5)
        .await?
        .iter()
        .filter_map(|log| {
            let local = log.logged_at_utc()?.with_timezone(&offset);
            if local.date_naive() != today {
                return None;
            }
            Some(cards::WaterEntry {
                time_label: format!("{:02}:{:02}", local.hour(), local.minute()),
                amount_ml: log.amount_ml,
            })
        })
        .collect();

    let card = cards::water_card(&cards::WaterView {
        today_ml,
        goal_ml: ctx.config.water_goal_ml,
        recent,
    });
    transport.show_card(&card).await
}

/// Quick-add buttons log the amount and bring the hub back with the new
/// total, whichever card hosted the tap.
pub async fn quick_water(
    transport: &Transport,
    ctx: &HandlerContext,
    amount_ml: i64,
) -> anyhow::Result<()> {
    WaterLog::create(ctx.db.pool(), transport.user_id(), amount_ml).await?;
    hub::show_hub(transport, ctx).await
}

/// Free-text invitation; the reply is picked up by the intent classifier.
pub async fn water_insert_hint(transport: &Transport) -> anyhow::Result<()> {
    transport
        .send_prompt(
            "💧 Quanto você bebeu? Me responda com a quantidade.\n<i>Ex: 300ml</i>",
            "Ex: 300ml",
        )
        .await?;
    Ok(())
}

/// Wake check-in: logs the wake, pairs it with the last sleep log for the
/// night's duration, then schedules the return to the hub.
pub async fn good_morning(
    bot: Bot,
    transport: &Transport,
    ctx: &HandlerContext,
) -> anyhow::Result<()> {
    let user_id = transport.user_id();

    let slept_minutes = match SleepLog::last_of_kind(ctx.db.pool(), user_id, SleepKind::Sleep)
        .await?
        .and_then(|log| log.logged_at_utc())
    {
        Some(slept_at) => {
            let minutes = (Utc::now() - slept_at).num_minutes();
            (0..24 * 60).contains(&minutes).then_some(minutes)
        }
        None => None,
    };

    SleepLog::create(ctx.db.pool(), user_id, SleepKind::Wake).await?;

    let card = cards::good_morning_card(
        &ctx.config.user_display_name,
        slept_minutes,
        ctx.config.hub_refresh_secs,
    );
    transport.show_card(&card).await?;

    hub::schedule_hub_return(bot, ctx, ChatId(user_id));
    Ok(())
}

/// Sleep check-in: logs the sleep and wishes good night, mentioning how
/// long the day was when today's wake log exists.
pub async fn good_night(transport: &Transport, ctx: &HandlerContext) -> anyhow::Result<()> {
    let user_id = transport.user_id();
    let offset = local_offset(ctx.config.utc_offset_hours);
    let now_local = local_now(ctx.config.utc_offset_hours);

    let awake_minutes = match SleepLog::last_of_kind(ctx.db.pool(), user_id, SleepKind::Wake)
        .await?
        .and_then(|log| log.logged_at_utc())
    {
        Some(woke_at) if woke_at.with_timezone(&offset).date_naive() == now_local.date_naive() => {
            let minutes = (Utc::now() - woke_at).num_minutes();
            (minutes > 0).then_some(minutes)
        }
        _ => None,
    };

    SleepLog::create(ctx.db.pool(), user_id, SleepKind::Sleep).await?;

    let card = cards::good_night_card(
        &ctx.config.user_display_name,
        awake_minutes,
        now_local.hour(),
    );
    transport.show_card(&card).await
}
