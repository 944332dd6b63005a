use chrono::Datelike;

use super::HandlerContext;
use crate::bot::cards::finance as cards;
use crate::bot::transport::Transport;
use crate::database::models::{BillValue, Category, FinancialGoal, FixedBill, Transaction};
use crate::utils::datetime::{local_now, local_offset, month_bounds_utc};

const STATEMENT_LIMIT: i64 = 8;
const REPORT_CATEGORIES: i64 = 6;

/// Bills resolved against one month's recorded values.
async fn bill_lines(
    ctx: &HandlerContext,
    user_id: i64,
    month: u32,
    year: i32,
) -> anyhow::Result<Vec<cards::BillLine>> {
    let bills = FixedBill::list_active(ctx.db.pool(), user_id).await?;
    let mut lines = Vec::with_capacity(bills.len());
    for bill in &bills {
        let value =
            BillValue::get(ctx.db.pool(), &bill.id, i64::from(month), i64::from(year)).await?;
        lines.push(cards::BillLine::from_bill(bill, value.as_ref()));
    }
    Ok(lines)
}

pub async fn show_finance_hub(transport: &Transport, ctx: &HandlerContext) -> anyhow::Result<()> {
    let user_id = transport.user_id();
    let now = local_now(ctx.config.utc_offset_hours);
    let (month, year) = (now.month(), now.year());

    let (from, to) = month_bounds_utc(year, month, local_offset(ctx.config.utc_offset_hours));
    let summary = Transaction::month_summary(ctx.db.pool(), user_id, &from, &to).await?;
    let bills = bill_lines(ctx, user_id, month, year).await?;

    let card = cards::finance_hub_card(month, year, i64::from(now.day()), &summary, &bills);
    transport.show_card(&card).await
}

pub async fn show_bills(transport: &Transport, ctx: &HandlerContext) -> anyhow::Result<()> {
    let now = local_now(ctx.config.utc_offset_hours);
    let lines = bill_lines(ctx, transport.user_id(), now.month(), now.year()).await?;
    transport.show_card(&cards::bills_card(now.month(), &lines)).await
}

pub async fn show_categories(transport: &Transport, ctx: &HandlerContext) -> anyhow::Result<()> {
    let categories = Category::list(ctx.db.pool(), transport.user_id(), None).await?;
    transport.show_card(&cards::categories_card(&categories)).await
}

pub async fn show_current_statement(
    transport: &Transport,
    ctx: &HandlerContext,
) -> anyhow::Result<()> {
    let now = local_now(ctx.config.utc_offset_hours);
    show_statement(transport, ctx, now.month(), now.year()).await
}

pub async fn show_statement(
    transport: &Transport,
    ctx: &HandlerContext,
    month: u32,
    year: i32,
) -> anyhow::Result<()> {
    let offset = local_offset(ctx.config.utc_offset_hours);
    let (from, to) = month_bounds_utc(year, month, offset);
    let entries = Transaction::statement(
        ctx.db.pool(),
        transport.user_id(),
        &from,
        &to,
        STATEMENT_LIMIT,
    )
    .await?;

    transport
        .show_card(&cards::statement_card(month, year, &entries, offset))
        .await
}

pub async fn show_goals(transport: &Transport, ctx: &HandlerContext) -> anyhow::Result<()> {
    let goals = FinancialGoal::list_active(ctx.db.pool(), transport.user_id()).await?;
    transport.show_card(&cards::goals_card(&goals)).await
}

pub async fn show_reports(transport: &Transport, ctx: &HandlerContext) -> anyhow::Result<()> {
    let now = local_now(ctx.config.utc_offset_hours);
    let (month, year) = (now.month(), now.year());
    let (from, to) = month_bounds_utc(year, month, local_offset(ctx.config.utc_offset_hours));

    let totals = Transaction::expenses_by_category(
        ctx.db.pool(),
        transport.user_id(),
        &from,
        &to,
        REPORT_CATEGORIES,
    )
    .await?;

    transport
        .show_card(&cards::reports_card(month, year, &totals))
        .await
}
