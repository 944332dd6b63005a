use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{ForceReply, MessageId, ParseMode, ReplyMarkup};
use teloxide::{ApiError, RequestError};
use tracing::debug;

use super::cards::Card;
use crate::database::models::BotState;

/// Sends and edits messages for one chat, keeping the anchor bookkeeping in
/// `bot_states` in sync. The anchor is the message hosting the current card;
/// cards are edited in place so the chat stays a single living dashboard.
pub struct Transport {
    bot: Bot,
    chat_id: ChatId,
    pool: sqlx::SqlitePool,
}

impl Transport {
    pub fn new(bot: Bot, chat_id: ChatId, pool: sqlx::SqlitePool) -> Self {
        Transport { bot, chat_id, pool }
    }

    pub fn user_id(&self) -> i64 {
        self.chat_id.0
    }

    /// Renders a card into the anchor message, falling back to a fresh send
    /// when there is no anchor or Telegram no longer knows it. Re-rendering
    /// identical content is not an error.
    pub async fn show_card(&self, card: &Card) -> Result<()> {
        let anchor = BotState::load(&self.pool, self.user_id())
            .await?
            .and_then(|s| s.anchor_message_id);

        let Some(anchor) = anchor else {
            self.send_card(card).await?;
            return Ok(());
        };

        match self
            .bot
            .edit_message_text(self.chat_id, MessageId(anchor as i32), card.text.clone())
            .parse_mode(ParseMode::Html)
            .reply_markup(card.keyboard.clone())
            .await
        {
            Ok(_) => Ok(()),
            Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
            Err(RequestError::Api(ApiError::MessageToEditNotFound)) => {
                self.send_card(card).await?;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Sends a card as a new message and makes it the anchor.
    pub async fn send_card(&self, card: &Card) -> Result<MessageId> {
        let message = self
            .bot
            .send_message(self.chat_id, card.text.clone())
            .parse_mode(ParseMode::Html)
            .reply_markup(card.keyboard.clone())
            .await?;
        BotState::record_anchor(&self.pool, self.user_id(), i64::from(message.id.0)).await?;
        Ok(message.id)
    }

    /// Sends a wizard question as a force-reply message so the client opens
    /// the keyboard with the given placeholder.
    pub async fn send_prompt(&self, text: &str, placeholder: &str) -> Result<MessageId> {
        let mut force_reply = ForceReply::new();
        force_reply.input_field_placeholder = Some(placeholder.to_string());

        let message = self
            .bot
            .send_message(self.chat_id, text.to_string())
            .parse_mode(ParseMode::Html)
            .reply_markup(ReplyMarkup::ForceReply(force_reply))
            .await?;

        let id = i64::from(message.id.0);
        BotState::set_prompt_message(&self.pool, self.user_id(), Some(id)).await?;
        BotState::set_last_message(&self.pool, self.user_id(), id).await?;
        Ok(message.id)
    }

    /// Plain HTML message outside the anchor, e.g. a classifier reply.
    pub async fn send_line(&self, text: &str) -> Result<MessageId> {
        let message = self
            .bot
            .send_message(self.chat_id, text.to_string())
            .parse_mode(ParseMode::Html)
            .await?;
        BotState::set_last_message(&self.pool, self.user_id(), i64::from(message.id.0)).await?;
        Ok(message.id)
    }

    /// Deletion is cleanup, not correctness; a message that is already gone
    /// only gets a debug line.
    pub async fn delete_quietly(&self, message_id: i64) {
        if let Err(err) = self
            .bot
            .delete_message(self.chat_id, MessageId(message_id as i32))
            .await
        {
            debug!("Could not delete message {}: {}", message_id, err);
        }
    }

    /// Removes the outstanding force-reply prompt, if any.
    pub async fn clear_prompt(&self) -> Result<()> {
        let prompt = BotState::load(&self.pool, self.user_id())
            .await?
            .and_then(|s| s.prompt_message_id);

        if let Some(prompt_id) = prompt {
            self.delete_quietly(prompt_id).await;
            BotState::set_prompt_message(&self.pool, self.user_id(), None).await?;
        }
        Ok(())
    }
}
