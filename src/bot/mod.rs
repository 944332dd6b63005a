/// Card builders for every bot surface (hub, health, finance, events)
pub mod cards;
/// Slash command definitions
pub mod commands;
/// Update handlers and the dispatcher schema
pub mod handlers;
/// Anchor-message transport between the bot and a chat
pub mod transport;
/// Event creation wizard state machine
pub mod wizard;
