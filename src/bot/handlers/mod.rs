pub mod callback;
pub mod event;
pub mod finance;
pub mod health;
pub mod hub;
pub mod message;
pub mod text;

use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;

use crate::bot::commands::Command;
use crate::config::Config;
use crate::database::DatabaseManager;
use crate::services::{IntentClassifier, UserSessions};

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Everything a handler needs, cloned once per dptree branch.
#[derive(Clone)]
pub struct HandlerContext {
    pub db: DatabaseManager,
    pub config: Arc<Config>,
    pub sessions: Arc<UserSessions>,
    pub classifier: Arc<IntentClassifier>,
}

pub struct BotHandler {
    ctx: HandlerContext,
}

impl BotHandler {
    pub fn new(
        db: DatabaseManager,
        config: Arc<Config>,
        sessions: Arc<UserSessions>,
        classifier: Arc<IntentClassifier>,
    ) -> Self {
        BotHandler {
            ctx: HandlerContext {
                db,
                config,
                sessions,
                classifier,
            },
        }
    }

    /// Commands first, then button taps, then free text. The free-text
    /// branch is last so commands never reach the classifier.
    pub fn schema(&self) -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
        let ctx_command = self.ctx.clone();
        let ctx_callback = self.ctx.clone();
        let ctx_text = self.ctx.clone();

        dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                        let ctx = ctx_command.clone();
                        async move { message::command_handler(bot, msg, cmd, ctx).await }
                    }),
            )
            .branch(
                Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
                    let ctx = ctx_callback.clone();
                    async move { callback::callback_handler(bot, q, ctx).await }
                }),
            )
            .branch(
                Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
                    let ctx = ctx_text.clone();
                    async move { text::text_handler(bot, msg, ctx).await }
                }),
            )
    }
}
