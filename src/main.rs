//! # Elite Assistant Bot Main Entry Point
//!
//! This is the main entry point for the assistant bot application.
//! It initializes logging, loads configuration, sets up the database,
//! starts the HTTP service and runs the Telegram bot dispatcher.

use anyhow::Result;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use elite_assistant_bot::bot::handlers::BotHandler;
use elite_assistant_bot::config::Config;
use elite_assistant_bot::database::DatabaseManager;
use elite_assistant_bot::services::{HttpService, IntentClassifier, UserSessions};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "elite_assistant_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Elite Assistant Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}",
        config.database_url, config.http_port
    );

    // Initialize database
    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    info!("Running database migrations...");
    db_manager.run_migrations().await?;
    let db_arc = Arc::new(db_manager);
    info!("Database initialized successfully");

    let config_arc = Arc::new(config);

    // Initialize bot
    info!("Initializing Telegram bot...");
    let bot = Bot::new(&config_arc.telegram_bot_token);
    let sessions = Arc::new(UserSessions::new());
    let classifier = Arc::new(IntentClassifier::new(&config_arc)?);
    let handler = BotHandler::new(
        db_arc.as_ref().clone(),
        config_arc.clone(),
        sessions,
        classifier,
    );
    info!("Telegram bot initialized successfully");

    // Initialize HTTP service (health check + deploy webhook)
    let http_service = HttpService::new(db_arc.clone(), config_arc.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config_arc.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config_arc.http_port, e))?;

    info!("HTTP server starting on port {}", config_arc.http_port);

    // Run both the bot and the HTTP server concurrently
    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(bot, handler.schema())
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let http_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, http_service.router()).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    // Wait for either task to complete (which would indicate shutdown)
    tokio::select! {
        result1 = bot_task => {
            if let Err(e) = result1 {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result2 = http_task => {
            if let Err(e) = result2 {
                tracing::error!("HTTP task error: {}", e);
            }
        }
    }

    info!("Application stopped");
    Ok(())
}
