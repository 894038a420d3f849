//! Telegram front end
//!
//! Parses chat commands, applies them to the subscriber store and scheduler,
//! and delivers replies and alerts through the Bot API.

pub mod commands;
pub mod handler;
pub mod poller;
pub mod telegram;

pub use commands::{Command, CommandError};
pub use handler::CommandHandler;
pub use poller::UpdatePoller;
pub use telegram::{BotUser, TelegramClient, TelegramError, Update};
