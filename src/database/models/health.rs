use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::datetime::parse_rfc3339_utc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepKind {
    Sleep,
    Wake,
}

impl SleepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SleepKind::Sleep => "sleep",
            SleepKind::Wake => "wake",
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SleepLog {
    pub id: String,
    pub user_id: i64,
    pub kind: String,
    pub logged_at: String,
}

impl SleepLog {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        kind: SleepKind,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO sleep_logs (id, user_id, kind, logged_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(user_id)
            .bind(kind.as_str())
            .bind(&now)
            .execute(pool)
            .await?;

        Ok(SleepLog {
            id,
            user_id,
            kind: kind.as_str().to_string(),
            logged_at: now,
        })
    }

    pub async fn last_of_kind(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        kind: SleepKind,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SleepLog>(
            "SELECT id, user_id, kind, logged_at FROM sleep_logs WHERE user_id = ? AND kind = ? ORDER BY logged_at DESC LIMIT 1"
        )
        .bind(user_id)
        .bind(kind.as_str())
        .fetch_optional(pool)
        .await
    }

    /// Logs at or after `since` (RFC3339, UTC), oldest first so sleep/wake
    /// pairs can be walked in order.
    pub async fn since(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        since: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, SleepLog>(
            "SELECT id, user_id, kind, logged_at FROM sleep_logs WHERE user_id = ? AND logged_at >= ? ORDER BY logged_at"
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(pool)
        .await
    }

    pub fn logged_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_rfc3339_utc(&self.logged_at)
    }
}

/// One completed night: when the user woke and how long they slept.
#[derive(Debug, Clone, PartialEq)]
pub struct Night {
    pub woke_at: DateTime<Utc>,
    pub minutes: i64,
}

/// Pairs sleep logs with the following wake log. Spans of a day or more are
/// discarded as missed check-ins rather than sleep.
pub fn pair_nights(logs: &[SleepLog]) -> Vec<Night> {
    let mut nights = Vec::new();
    let mut pending_sleep: Option<DateTime<Utc>> = None;

    for log in logs {
        let Some(at) = log.logged_at_utc() else {
            continue;
        };
        match log.kind.as_str() {
            "sleep" => pending_sleep = Some(at),
            "wake" => {
                if let Some(slept_at) = pending_sleep.take() {
                    let minutes = (at - slept_at).num_minutes();
                    if (0..24 * 60).contains(&minutes) {
                        nights.push(Night {
                            woke_at: at,
                            minutes,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    nights
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WaterLog {
    pub id: String,
    pub user_id: i64,
    pub amount_ml: i64,
    pub logged_at: String,
}

impl WaterLog {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        amount_ml: i64,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO water_logs (id, user_id, amount_ml, logged_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(amount_ml)
        .bind(&now)
        .execute(pool)
        .await?;

        Ok(WaterLog {
            id,
            user_id,
            amount_ml,
            logged_at: now,
        })
    }

    /// Total intake in ml within [from, to) (RFC3339, UTC).
    pub async fn total_between(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        from: &str,
        to: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(amount_ml), 0) FROM water_logs WHERE user_id = ? AND logged_at >= ? AND logged_at < ?"
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await
    }

    pub async fn recent(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, WaterLog>(
            "SELECT id, user_id, amount_ml, logged_at FROM water_logs WHERE user_id = ? ORDER BY logged_at DESC LIMIT ?"
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub fn logged_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_rfc3339_utc(&self.logged_at)
    }
}
