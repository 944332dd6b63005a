//! # Elite Assistant Bot
//!
//! A personal assistant Telegram bot built around a single "hub" dashboard
//! message that the user navigates with inline buttons.
//!
//! ## Features
//! - Hub dashboard with greeting, date and water intake summary
//! - Health tracking: sleep sessions, water intake, quick-log buttons
//! - Finance tracking: transactions, fixed bills, categories, goals, reports
//! - Guided event creation wizard with ForceReply prompts
//! - Free-text capture routed through an LLM intent classifier
//! - Deploy webhook endpoint for GitHub push events
//! - Persistent storage with SQLite

/// Card builders, update handlers and the event wizard
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and migrations
pub mod database;
/// Intent classification, HTTP endpoints and per-user sessions
pub mod services;
/// Utility functions for datetime handling and text formatting
pub mod utils;
