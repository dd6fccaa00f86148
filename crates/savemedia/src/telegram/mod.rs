//! Telegram integration: bot setup, handlers and presentation.

pub mod bot;
pub mod handlers;
pub mod preview;

pub use bot::{create_bot, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
