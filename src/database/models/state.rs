use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-user interaction bookkeeping: the serialized wizard state (NULL when
/// idle) plus the message ids the bot needs to edit or clean up later.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BotState {
    pub user_id: i64,
    pub state: Option<String>,
    pub anchor_message_id: Option<i64>,
    pub prompt_message_id: Option<i64>,
    pub last_message_id: Option<i64>,
    pub updated_at: String,
}

impl BotState {
    pub async fn load(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, BotState>(
            "SELECT user_id, state, anchor_message_id, prompt_message_id, last_message_id, updated_at FROM bot_states WHERE user_id = ?"
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Stores the serialized wizard state; `None` marks the user idle.
    pub async fn set_state(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        state_json: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO bot_states (user_id, state, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET state = excluded.state, updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(state_json)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn clear_state(pool: &sqlx::SqlitePool, user_id: i64) -> Result<(), sqlx::Error> {
        Self::set_state(pool, user_id, None).await
    }

    /// Records the message currently hosting the dashboard card. The anchor
    /// doubles as the most recent bot message.
    pub async fn record_anchor(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        message_id: i64,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO bot_states (user_id, anchor_message_id, last_message_id, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                anchor_message_id = excluded.anchor_message_id,
                last_message_id = excluded.last_message_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(message_id)
        .bind(message_id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn set_prompt_message(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        message_id: Option<i64>,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO bot_states (user_id, prompt_message_id, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                prompt_message_id = excluded.prompt_message_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(message_id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn set_last_message(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        message_id: i64,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO bot_states (user_id, last_message_id, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                last_message_id = excluded.last_message_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(message_id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(())
    }
}
