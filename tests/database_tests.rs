use anyhow::Result;
use elite_assistant_bot::database::{connection::DatabaseManager, models::*};
use tempfile::{tempdir, TempDir};

const FOREVER: (&str, &str) = ("2000-01-01T00:00:00+00:00", "2100-01-01T00:00:00+00:00");

async fn setup_test_db() -> Result<(DatabaseManager, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let db_manager = DatabaseManager::new(&database_url).await?;
    db_manager.run_migrations().await?;

    Ok((db_manager, temp_dir))
}

// --- bot state ---

#[tokio::test]
async fn test_bot_state_starts_empty() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let state = BotState::load(db.pool(), 1).await?;
    assert!(state.is_none());

    Ok(())
}

#[tokio::test]
async fn test_bot_state_set_and_clear() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let user_id = 100i64;

    BotState::set_state(db.pool(), user_id, Some(r#"{"step":"awaiting_title"}"#)).await?;
    let loaded = BotState::load(db.pool(), user_id).await?.unwrap();
    assert_eq!(loaded.state.as_deref(), Some(r#"{"step":"awaiting_title"}"#));

    BotState::clear_state(db.pool(), user_id).await?;
    let loaded = BotState::load(db.pool(), user_id).await?.unwrap();
    assert!(loaded.state.is_none());

    Ok(())
}

#[tokio::test]
async fn test_record_anchor_updates_last_message_too() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let user_id = 100i64;

    BotState::record_anchor(db.pool(), user_id, 42).await?;
    let loaded = BotState::load(db.pool(), user_id).await?.unwrap();
    assert_eq!(loaded.anchor_message_id, Some(42));
    assert_eq!(loaded.last_message_id, Some(42));

    // A later plain send moves last_message but not the anchor
    BotState::set_last_message(db.pool(), user_id, 50).await?;
    let loaded = BotState::load(db.pool(), user_id).await?.unwrap();
    assert_eq!(loaded.anchor_message_id, Some(42));
    assert_eq!(loaded.last_message_id, Some(50));

    Ok(())
}

#[tokio::test]
async fn test_partial_updates_preserve_other_fields() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let user_id = 100i64;

    BotState::set_state(db.pool(), user_id, Some("{}")).await?;
    BotState::record_anchor(db.pool(), user_id, 10).await?;
    BotState::set_prompt_message(db.pool(), user_id, Some(11)).await?;

    let loaded = BotState::load(db.pool(), user_id).await?.unwrap();
    assert_eq!(loaded.state.as_deref(), Some("{}"));
    assert_eq!(loaded.anchor_message_id, Some(10));
    assert_eq!(loaded.prompt_message_id, Some(11));

    BotState::set_prompt_message(db.pool(), user_id, None).await?;
    let loaded = BotState::load(db.pool(), user_id).await?.unwrap();
    assert!(loaded.prompt_message_id.is_none());
    assert_eq!(loaded.state.as_deref(), Some("{}"));
    assert_eq!(loaded.anchor_message_id, Some(10));

    Ok(())
}

// --- events ---

#[tokio::test]
async fn test_create_draft_is_idempotent() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let user_id = 200i64;

    let first = Event::create_draft(db.pool(), user_id).await?;
    let second = Event::create_draft(db.pool(), user_id).await?;
    assert_eq!(first.id, second.id);
    assert!(first.is_draft());

    let found = Event::find_draft(db.pool(), user_id).await?;
    assert_eq!(found.map(|e| e.id), Some(first.id));

    Ok(())
}

#[tokio::test]
async fn test_one_draft_per_user_enforced_by_index() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let user_id = 200i64;

    Event::create_draft(db.pool(), user_id).await?;

    // A second draft row for the same user must violate the partial index
    let dup = sqlx::query(
        "INSERT INTO events (id, user_id, status, created_at, updated_at) VALUES (?, ?, 'draft', ?, ?)",
    )
    .bind("dup-id")
    .bind(user_id)
    .bind("2026-01-01T00:00:00+00:00")
    .bind("2026-01-01T00:00:00+00:00")
    .execute(db.pool())
    .await;
    assert!(dup.is_err());

    // A different user is unaffected
    let other = Event::create_draft(db.pool(), user_id + 1).await?;
    assert!(other.is_draft());

    Ok(())
}

#[tokio::test]
async fn test_event_field_setters() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let draft = Event::create_draft(db.pool(), 200).await?;

    Event::set_title(db.pool(), &draft.id, "Reunião").await?;
    Event::set_event_date(db.pool(), &draft.id, "2026-02-15").await?;
    Event::set_start_time(db.pool(), &draft.id, "14:00").await?;
    Event::set_end_time(db.pool(), &draft.id, "16:00").await?;
    Event::set_location(db.pool(), &draft.id, "Escritório").await?;

    let event = Event::find_by_id(db.pool(), &draft.id).await?.unwrap();
    assert_eq!(event.title.as_deref(), Some("Reunião"));
    assert_eq!(event.event_date.as_deref(), Some("2026-02-15"));
    assert_eq!(event.start_time.as_deref(), Some("14:00"));
    assert_eq!(event.end_time.as_deref(), Some("16:00"));
    assert_eq!(event.location.as_deref(), Some("Escritório"));

    Ok(())
}

#[tokio::test]
async fn test_all_day_choice_clears_times() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let draft = Event::create_draft(db.pool(), 200).await?;

    Event::set_start_time(db.pool(), &draft.id, "14:00").await?;
    Event::set_end_time(db.pool(), &draft.id, "16:00").await?;
    Event::apply_all_day(db.pool(), &draft.id, true).await?;

    let event = Event::find_by_id(db.pool(), &draft.id).await?.unwrap();
    assert_eq!(event.all_day, Some(true));
    assert!(event.start_time.is_none());
    assert!(event.end_time.is_none());

    // Switching back to timed keeps the times cleared
    Event::apply_all_day(db.pool(), &draft.id, false).await?;
    let event = Event::find_by_id(db.pool(), &draft.id).await?.unwrap();
    assert_eq!(event.all_day, Some(false));
    assert!(event.start_time.is_none());

    Ok(())
}

#[tokio::test]
async fn test_event_status_transitions() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let user_id = 200i64;

    let draft = Event::create_draft(db.pool(), user_id).await?;
    Event::set_status(db.pool(), &draft.id, EventStatus::Confirmed).await?;

    let event = Event::find_by_id(db.pool(), &draft.id).await?.unwrap();
    assert_eq!(event.status, "confirmed");
    assert!(!event.is_draft());

    // Confirming frees the draft slot
    assert!(Event::find_draft(db.pool(), user_id).await?.is_none());
    let next = Event::create_draft(db.pool(), user_id).await?;
    assert_ne!(next.id, draft.id);

    Event::set_status(db.pool(), &next.id, EventStatus::Cancelled).await?;
    let event = Event::find_by_id(db.pool(), &next.id).await?.unwrap();
    assert_eq!(event.status, "cancelled");

    Ok(())
}

// --- health ---

#[tokio::test]
async fn test_sleep_log_create_and_query() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let user_id = 300i64;

    let sleep = SleepLog::create(db.pool(), user_id, SleepKind::Sleep).await?;
    let wake = SleepLog::create(db.pool(), user_id, SleepKind::Wake).await?;
    assert_eq!(sleep.kind, "sleep");
    assert_eq!(wake.kind, "wake");

    let last_wake = SleepLog::last_of_kind(db.pool(), user_id, SleepKind::Wake).await?;
    assert_eq!(last_wake.map(|l| l.id), Some(wake.id));

    let logs = SleepLog::since(db.pool(), user_id, FOREVER.0).await?;
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].kind, "sleep"); // oldest first
    assert!(logs[0].logged_at_utc().is_some());

    // Another user's logs stay invisible
    let other = SleepLog::since(db.pool(), user_id + 1, FOREVER.0).await?;
    assert!(other.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_water_totals_respect_bounds() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let user_id = 300i64;

    WaterLog::create(db.pool(), user_id, 300).await?;
    WaterLog::create(db.pool(), user_id, 500).await?;

    let total = WaterLog::total_between(db.pool(), user_id, FOREVER.0, FOREVER.1).await?;
    assert_eq!(total, 800);

    // A window in the past holds nothing
    let past = WaterLog::total_between(
        db.pool(),
        user_id,
        "1990-01-01T00:00:00+00:00",
        "1991-01-01T00:00:00+00:00",
    )
    .await?;
    assert_eq!(past, 0);

    let none = WaterLog::total_between(db.pool(), user_id + 1, FOREVER.0, FOREVER.1).await?;
    assert_eq!(none, 0);

    let recent = WaterLog::recent(db.pool(), user_id, 1).await?;
    assert_eq!(recent.len(), 1);

    Ok(())
}

// --- finance ---

#[tokio::test]
async fn test_category_lookup_is_case_insensitive() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let user_id = 400i64;

    let created =
        Category::create(db.pool(), user_id, "Mercado", "🛒", TransactionKind::Expense).await?;

    let found = Category::find_by_name(db.pool(), user_id, "mercado", TransactionKind::Expense)
        .await?
        .unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.emoji, "🛒");

    // Same name under the other kind is a different category
    let other_kind =
        Category::find_by_name(db.pool(), user_id, "mercado", TransactionKind::Income).await?;
    assert!(other_kind.is_none());

    Category::create(db.pool(), user_id, "Salário", "💰", TransactionKind::Income).await?;
    let expenses = Category::list(db.pool(), user_id, Some(TransactionKind::Expense)).await?;
    assert_eq!(expenses.len(), 1);
    let all = Category::list(db.pool(), user_id, None).await?;
    assert_eq!(all.len(), 2);

    Category::delete(db.pool(), created.id).await?;
    let gone = Category::find_by_name(db.pool(), user_id, "Mercado", TransactionKind::Expense).await?;
    assert!(gone.is_none());

    Ok(())
}

#[tokio::test]
async fn test_transactions_statement_and_summary() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let user_id = 400i64;

    let cat = Category::create(db.pool(), user_id, "Mercado", "🛒", TransactionKind::Expense).await?;
    Transaction::create(
        db.pool(),
        user_id,
        None,
        TransactionKind::Income,
        3000.0,
        Some("Salário"),
    )
    .await?;
    Transaction::create(
        db.pool(),
        user_id,
        Some(cat.id),
        TransactionKind::Expense,
        250.0,
        Some("Compras da semana"),
    )
    .await?;

    let entries = Transaction::statement(db.pool(), user_id, FOREVER.0, FOREVER.1, 10).await?;
    assert_eq!(entries.len(), 2);
    // Newest first, and the joined category comes along
    assert_eq!(entries[0].kind, "saida");
    assert_eq!(entries[0].category_name.as_deref(), Some("Mercado"));
    assert_eq!(entries[0].category_emoji.as_deref(), Some("🛒"));
    assert_eq!(entries[1].kind, "entrada");
    assert!(entries[1].category_name.is_none());

    let summary = Transaction::month_summary(db.pool(), user_id, FOREVER.0, FOREVER.1).await?;
    assert_eq!(summary.total_income, 3000.0);
    assert_eq!(summary.total_expense, 250.0);
    assert_eq!(summary.balance(), 2750.0);

    // Empty window sums to zero
    let empty = Transaction::month_summary(
        db.pool(),
        user_id,
        "1990-01-01T00:00:00+00:00",
        "1991-01-01T00:00:00+00:00",
    )
    .await?;
    assert_eq!(empty.total_income, 0.0);
    assert_eq!(empty.balance(), 0.0);

    Ok(())
}

#[tokio::test]
async fn test_expenses_grouped_by_category() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let user_id = 400i64;

    let market = Category::create(db.pool(), user_id, "Mercado", "🛒", TransactionKind::Expense).await?;
    let transport = Category::create(db.pool(), user_id, "Transporte", "🚗", TransactionKind::Expense).await?;

    Transaction::create(db.pool(), user_id, Some(market.id), TransactionKind::Expense, 200.0, None).await?;
    Transaction::create(db.pool(), user_id, Some(market.id), TransactionKind::Expense, 150.0, None).await?;
    Transaction::create(db.pool(), user_id, Some(transport.id), TransactionKind::Expense, 80.0, None).await?;
    Transaction::create(db.pool(), user_id, None, TransactionKind::Expense, 40.0, None).await?;
    // Income never shows up in the expense report
    Transaction::create(db.pool(), user_id, None, TransactionKind::Income, 5000.0, None).await?;

    let buckets = Transaction::expenses_by_category(db.pool(), user_id, FOREVER.0, FOREVER.1, 10).await?;
    assert_eq!(buckets.len(), 3);
    assert_eq!(buckets[0].name, "Mercado");
    assert_eq!(buckets[0].total, 350.0);
    assert_eq!(buckets[1].name, "Transporte");
    assert_eq!(buckets[2].name, "Sem categoria");
    assert_eq!(buckets[2].emoji, "📦");
    assert_eq!(buckets[2].total, 40.0);

    Ok(())
}

#[tokio::test]
async fn test_fixed_bill_lifecycle() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let user_id = 500i64;

    let rent = FixedBill::create(
        db.pool(),
        user_id,
        "Aluguel",
        "🏠",
        Some(1500.0),
        false,
        None,
        5,
        None,
    )
    .await?;
    FixedBill::create(
        db.pool(),
        user_id,
        "Luz",
        "💡",
        None,
        true,
        Some(180.0),
        20,
        Some(12),
    )
    .await?;

    let bills = FixedBill::list_active(db.pool(), user_id).await?;
    assert_eq!(bills.len(), 2);
    // Ordered by due day
    assert_eq!(bills[0].name, "Aluguel");
    assert_eq!(bills[1].name, "Luz");
    assert!(bills[1].is_variable);
    assert_eq!(bills[1].estimated_amount, Some(180.0));

    FixedBill::deactivate(db.pool(), &rent.id).await?;
    let bills = FixedBill::list_active(db.pool(), user_id).await?;
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0].name, "Luz");

    Ok(())
}

#[tokio::test]
async fn test_bill_value_upsert_preserves_paid_flag() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let bill = FixedBill::create(db.pool(), 500, "Luz", "💡", None, true, Some(180.0), 20, None).await?;

    BillValue::set(db.pool(), &bill.id, 2, 2026, 195.5).await?;
    let value = BillValue::get(db.pool(), &bill.id, 2, 2026).await?.unwrap();
    assert_eq!(value.amount, 195.5);
    assert!(!value.is_paid);
    assert!(value.paid_at.is_none());

    BillValue::mark_paid(db.pool(), &bill.id, 2, 2026).await?;
    let value = BillValue::get(db.pool(), &bill.id, 2, 2026).await?.unwrap();
    assert!(value.is_paid);
    assert!(value.paid_at.is_some());

    // Correcting the amount afterwards must not reset the paid flag
    BillValue::set(db.pool(), &bill.id, 2, 2026, 201.0).await?;
    let value = BillValue::get(db.pool(), &bill.id, 2, 2026).await?.unwrap();
    assert_eq!(value.amount, 201.0);
    assert!(value.is_paid);

    // Other months stay independent
    assert!(BillValue::get(db.pool(), &bill.id, 3, 2026).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_goal_progress_and_completion() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let user_id = 600i64;

    let goal = FinancialGoal::create(db.pool(), user_id, "Reserva de emergência", 1000.0).await?;
    assert_eq!(goal.current_amount, 0.0);
    assert!(!goal.is_completed);

    FinancialGoal::add_progress(db.pool(), &goal.id, 400.0).await?;
    let active = FinancialGoal::list_active(db.pool(), user_id).await?;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].current_amount, 400.0);
    assert!(!active[0].is_completed);

    // Crossing the target completes the goal and hides it from the list
    FinancialGoal::add_progress(db.pool(), &goal.id, 600.0).await?;
    let active = FinancialGoal::list_active(db.pool(), user_id).await?;
    assert!(active.is_empty());

    let completed = sqlx::query_as::<_, FinancialGoal>(
        "SELECT id, user_id, name, target_amount, current_amount, is_completed, created_at, completed_at FROM financial_goals WHERE id = ?",
    )
    .bind(&goal.id)
    .fetch_one(db.pool())
    .await?;
    assert!(completed.is_completed);
    assert_eq!(completed.current_amount, 1000.0);
    assert!(completed.completed_at.is_some());

    FinancialGoal::delete(db.pool(), &goal.id).await?;
    let rows = sqlx::query("SELECT id FROM financial_goals WHERE id = ?")
        .bind(&goal.id)
        .fetch_all(db.pool())
        .await?;
    assert!(rows.is_empty());

    Ok(())
}
