use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Direction of money flow. Stored as the product's Portuguese terms so the
/// classifier output and the UI share one vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "entrada",
            TransactionKind::Expense => "saida",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "entrada" => Some(TransactionKind::Income),
            "saida" | "saída" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub emoji: String,
    pub kind: String,
    pub created_at: String,
}

impl Category {
    pub async fn list(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        kind: Option<TransactionKind>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        match kind {
            Some(kind) => {
                sqlx::query_as::<_, Category>(
                    "SELECT id, user_id, name, emoji, kind, created_at FROM finance_categories WHERE user_id = ? AND kind = ? ORDER BY name"
                )
                .bind(user_id)
                .bind(kind.as_str())
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Category>(
                    "SELECT id, user_id, name, emoji, kind, created_at FROM finance_categories WHERE user_id = ? ORDER BY kind, name"
                )
                .bind(user_id)
                .fetch_all(pool)
                .await
            }
        }
    }

    /// Case-insensitive lookup so the classifier's "mercado" matches an
    /// existing "Mercado".
    pub async fn find_by_name(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        name: &str,
        kind: TransactionKind,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "SELECT id, user_id, name, emoji, kind, created_at FROM finance_categories WHERE user_id = ? AND kind = ? AND LOWER(name) = LOWER(?) LIMIT 1"
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(name.trim())
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        name: &str,
        emoji: &str,
        kind: TransactionKind,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        let id = sqlx::query(
            "INSERT INTO finance_categories (user_id, name, emoji, kind, created_at) VALUES (?, ?, ?, ?, ?)"
        )
        .bind(user_id)
        .bind(name.trim())
        .bind(emoji)
        .bind(kind.as_str())
        .bind(&now)
        .execute(pool)
        .await?
        .last_insert_rowid();

        Ok(Category {
            id,
            user_id,
            name: name.trim().to_string(),
            emoji: emoji.to_string(),
            kind: kind.as_str().to_string(),
            created_at: now,
        })
    }

    pub async fn delete(pool: &sqlx::SqlitePool, category_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM finance_categories WHERE id = ?")
            .bind(category_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub kind: String,
    pub amount: f64,
    pub description: Option<String>,
    pub occurred_at: String,
}

/// A month's transaction joined with its category for display.
#[derive(Debug, Clone, FromRow)]
pub struct StatementEntry {
    pub id: String,
    pub kind: String,
    pub amount: f64,
    pub description: Option<String>,
    pub occurred_at: String,
    pub category_name: Option<String>,
    pub category_emoji: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct MonthSummary {
    pub total_income: f64,
    pub total_expense: f64,
}

impl MonthSummary {
    pub fn balance(&self) -> f64 {
        self.total_income - self.total_expense
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CategoryTotal {
    pub name: String,
    pub emoji: String,
    pub total: f64,
}

impl Transaction {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        category_id: Option<i64>,
        kind: TransactionKind,
        amount: f64,
        description: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO finance_transactions (id, user_id, category_id, kind, amount, description, occurred_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(category_id)
        .bind(kind.as_str())
        .bind(amount)
        .bind(description)
        .bind(&now)
        .execute(pool)
        .await?;

        Ok(Transaction {
            id,
            user_id,
            category_id,
            kind: kind.as_str().to_string(),
            amount,
            description: description.map(|d| d.to_string()),
            occurred_at: now,
        })
    }

    /// Newest-first entries within [from, to) (RFC3339, UTC).
    pub async fn statement(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        from: &str,
        to: &str,
        limit: i64,
    ) -> Result<Vec<StatementEntry>, sqlx::Error> {
        sqlx::query_as::<_, StatementEntry>(
            r#"
            SELECT t.id, t.kind, t.amount, t.description, t.occurred_at,
                   c.name AS category_name, c.emoji AS category_emoji
            FROM finance_transactions t
            LEFT JOIN finance_categories c ON c.id = t.category_id
            WHERE t.user_id = ? AND t.occurred_at >= ? AND t.occurred_at < ?
            ORDER BY t.occurred_at DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn month_summary(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        from: &str,
        to: &str,
    ) -> Result<MonthSummary, sqlx::Error> {
        sqlx::query_as::<_, MonthSummary>(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN kind = 'entrada' THEN amount ELSE 0.0 END), 0.0) AS total_income,
                COALESCE(SUM(CASE WHEN kind = 'saida' THEN amount ELSE 0.0 END), 0.0) AS total_expense
            FROM finance_transactions
            WHERE user_id = ? AND occurred_at >= ? AND occurred_at < ?
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await
    }

    /// Expense totals grouped by category, largest first. Uncategorized
    /// spending shows up as its own bucket.
    pub async fn expenses_by_category(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        from: &str,
        to: &str,
        limit: i64,
    ) -> Result<Vec<CategoryTotal>, sqlx::Error> {
        sqlx::query_as::<_, CategoryTotal>(
            r#"
            SELECT COALESCE(c.name, 'Sem categoria') AS name,
                   COALESCE(c.emoji, '📦') AS emoji,
                   SUM(t.amount) AS total
            FROM finance_transactions t
            LEFT JOIN finance_categories c ON c.id = t.category_id
            WHERE t.user_id = ? AND t.kind = 'saida' AND t.occurred_at >= ? AND t.occurred_at < ?
            GROUP BY c.id
            ORDER BY total DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &sqlx::SqlitePool, transaction_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM finance_transactions WHERE id = ?")
            .bind(transaction_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

/// A recurring monthly bill. Variable bills carry an estimate until the
/// month's real value is recorded in `bill_values`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FixedBill {
    pub id: String,
    pub user_id: i64,
    pub name: String,
    pub emoji: String,
    pub amount: Option<f64>,
    pub is_variable: bool,
    pub estimated_amount: Option<f64>,
    pub due_day: i64,
    pub billing_day: Option<i64>,
    pub is_active: bool,
    pub created_at: String,
}

impl FixedBill {
    pub async fn list_active(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, FixedBill>(
            "SELECT id, user_id, name, emoji, amount, is_variable, estimated_amount, due_day, billing_day, is_active, created_at FROM fixed_bills WHERE user_id = ? AND is_active = 1 ORDER BY due_day"
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        name: &str,
        emoji: &str,
        amount: Option<f64>,
        is_variable: bool,
        estimated_amount: Option<f64>,
        due_day: i64,
        billing_day: Option<i64>,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO fixed_bills (id, user_id, name, emoji, amount, is_variable, estimated_amount, due_day, billing_day, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(name)
        .bind(emoji)
        .bind(amount)
        .bind(is_variable)
        .bind(estimated_amount)
        .bind(due_day)
        .bind(billing_day)
        .bind(&now)
        .execute(pool)
        .await?;

        Ok(FixedBill {
            id,
            user_id,
            name: name.to_string(),
            emoji: emoji.to_string(),
            amount,
            is_variable,
            estimated_amount,
            due_day,
            billing_day,
            is_active: true,
            created_at: now,
        })
    }

    /// Soft delete: history keeps referencing the bill.
    pub async fn deactivate(pool: &sqlx::SqlitePool, bill_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE fixed_bills SET is_active = 0 WHERE id = ?")
            .bind(bill_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

/// The concrete value of a bill in one month, and whether it was paid.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BillValue {
    pub id: String,
    pub bill_id: String,
    pub month: i64,
    pub year: i64,
    pub amount: f64,
    pub is_paid: bool,
    pub paid_at: Option<String>,
    pub defined_at: String,
}

impl BillValue {
    pub async fn get(
        pool: &sqlx::SqlitePool,
        bill_id: &str,
        month: i64,
        year: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, BillValue>(
            "SELECT id, bill_id, month, year, amount, is_paid, paid_at, defined_at FROM bill_values WHERE bill_id = ? AND month = ? AND year = ?"
        )
        .bind(bill_id)
        .bind(month)
        .bind(year)
        .fetch_optional(pool)
        .await
    }

    /// Upserts the month's value, leaving paid status untouched on update.
    pub async fn set(
        pool: &sqlx::SqlitePool,
        bill_id: &str,
        month: i64,
        year: i64,
        amount: f64,
    ) -> Result<(), sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO bill_values (id, bill_id, month, year, amount, is_paid, defined_at)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            ON CONFLICT(bill_id, month, year) DO UPDATE SET
                amount = excluded.amount,
                defined_at = excluded.defined_at
            "#,
        )
        .bind(&id)
        .bind(bill_id)
        .bind(month)
        .bind(year)
        .bind(amount)
        .bind(&now)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn mark_paid(
        pool: &sqlx::SqlitePool,
        bill_id: &str,
        month: i64,
        year: i64,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE bill_values SET is_paid = 1, paid_at = ? WHERE bill_id = ? AND month = ? AND year = ?",
        )
        .bind(&now)
        .bind(bill_id)
        .bind(month)
        .bind(year)
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FinancialGoal {
    pub id: String,
    pub user_id: i64,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub is_completed: bool,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl FinancialGoal {
    pub async fn list_active(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, FinancialGoal>(
            "SELECT id, user_id, name, target_amount, current_amount, is_completed, created_at, completed_at FROM financial_goals WHERE user_id = ? AND is_completed = 0 ORDER BY created_at"
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        name: &str,
        target_amount: f64,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO financial_goals (id, user_id, name, target_amount, current_amount, is_completed, created_at)
            VALUES (?, ?, ?, ?, 0, 0, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(name)
        .bind(target_amount)
        .bind(&now)
        .execute(pool)
        .await?;

        Ok(FinancialGoal {
            id,
            user_id,
            name: name.to_string(),
            target_amount,
            current_amount: 0.0,
            is_completed: false,
            created_at: now,
            completed_at: None,
        })
    }

    /// Adds to the saved amount, marking the goal completed once the target
    /// is reached.
    pub async fn add_progress(
        pool: &sqlx::SqlitePool,
        goal_id: &str,
        amount: f64,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            UPDATE financial_goals SET
                current_amount = current_amount + ?,
                is_completed = CASE WHEN current_amount + ? >= target_amount THEN 1 ELSE 0 END,
                completed_at = CASE WHEN current_amount + ? >= target_amount THEN ? ELSE completed_at END
            WHERE id = ?
            "#,
        )
        .bind(amount)
        .bind(amount)
        .bind(amount)
        .bind(&now)
        .bind(goal_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn delete(pool: &sqlx::SqlitePool, goal_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM financial_goals WHERE id = ?")
            .bind(goal_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
