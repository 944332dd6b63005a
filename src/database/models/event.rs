use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Draft,
    Confirmed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Confirmed => "confirmed",
            EventStatus::Cancelled => "cancelled",
        }
    }
}

/// A calendar event. Fields stay NULL while the creation wizard collects
/// them; `status` moves draft -> confirmed | cancelled exactly once.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub user_id: i64,
    pub title: Option<String>,
    /// ISO date, "YYYY-MM-DD".
    pub event_date: Option<String>,
    /// "HH:MM", empty for all-day events.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub all_day: Option<bool>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Event {
    /// Returns the user's open draft, creating one when none exists. The
    /// partial unique index on (user_id, status = 'draft') makes concurrent
    /// calls converge on a single row.
    pub async fn create_draft(pool: &sqlx::SqlitePool, user_id: i64) -> Result<Self, sqlx::Error> {
        if let Some(existing) = Self::find_draft(pool, user_id).await? {
            return Ok(existing);
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let inserted = sqlx::query(
            r#"
            INSERT INTO events (id, user_id, status, created_at, updated_at)
            VALUES (?, ?, 'draft', ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await;

        match inserted {
            Ok(_) => Self::find_by_id(pool, &id)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
            // Lost the race against another insert; the index guarantees the
            // winner's row is the draft.
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => {
                Self::find_draft(pool, user_id)
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn find_draft(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            "SELECT id, user_id, title, event_date, start_time, end_time, location, all_day, status, created_at, updated_at FROM events WHERE user_id = ? AND status = 'draft'"
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        event_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            "SELECT id, user_id, title, event_date, start_time, end_time, location, all_day, status, created_at, updated_at FROM events WHERE id = ?"
        )
        .bind(event_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn set_title(
        pool: &sqlx::SqlitePool,
        event_id: &str,
        title: &str,
    ) -> Result<(), sqlx::Error> {
        Self::set_column(pool, event_id, "title", Some(title)).await
    }

    /// `event_date` is the ISO form, "YYYY-MM-DD".
    pub async fn set_event_date(
        pool: &sqlx::SqlitePool,
        event_id: &str,
        event_date: &str,
    ) -> Result<(), sqlx::Error> {
        Self::set_column(pool, event_id, "event_date", Some(event_date)).await
    }

    pub async fn set_start_time(
        pool: &sqlx::SqlitePool,
        event_id: &str,
        start_time: &str,
    ) -> Result<(), sqlx::Error> {
        Self::set_column(pool, event_id, "start_time", Some(start_time)).await
    }

    pub async fn set_end_time(
        pool: &sqlx::SqlitePool,
        event_id: &str,
        end_time: &str,
    ) -> Result<(), sqlx::Error> {
        Self::set_column(pool, event_id, "end_time", Some(end_time)).await
    }

    pub async fn set_location(
        pool: &sqlx::SqlitePool,
        event_id: &str,
        location: &str,
    ) -> Result<(), sqlx::Error> {
        Self::set_column(pool, event_id, "location", Some(location)).await
    }

    /// Records the all-day choice. Choosing all-day clears any captured
    /// times so the two can never coexist.
    pub async fn apply_all_day(
        pool: &sqlx::SqlitePool,
        event_id: &str,
        all_day: bool,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        if all_day {
            sqlx::query(
                "UPDATE events SET all_day = 1, start_time = NULL, end_time = NULL, updated_at = ? WHERE id = ?",
            )
            .bind(now)
            .bind(event_id)
            .execute(pool)
            .await?;
        } else {
            sqlx::query("UPDATE events SET all_day = 0, updated_at = ? WHERE id = ?")
                .bind(now)
                .bind(event_id)
                .execute(pool)
                .await?;
        }
        Ok(())
    }

    pub async fn set_status(
        pool: &sqlx::SqlitePool,
        event_id: &str,
        status: EventStatus,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE events SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(now)
            .bind(event_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub fn is_draft(&self) -> bool {
        self.status == EventStatus::Draft.as_str()
    }

    async fn set_column(
        pool: &sqlx::SqlitePool,
        event_id: &str,
        column: &str,
        value: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        // Column names come from the fixed setter list above, never from input.
        let sql = format!("UPDATE events SET {column} = ?, updated_at = ? WHERE id = ?");
        sqlx::query(&sql)
            .bind(value)
            .bind(now)
            .bind(event_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
