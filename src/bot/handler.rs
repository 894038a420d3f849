//! Maps chat commands onto the subscriber store and scheduler

use std::sync::Arc;

use super::commands::{Command, CommandError};
use crate::alerts::{
    format_threshold, ChatId, Scheduler, SchedulerError, SubscriberStore, SubscriptionError,
    MAX_INTERVAL_MINUTES,
};

const ALERT_USAGE: &str = "⚠️ Usage: /alert <threshold> [from_hour] [to_hour]\nExample: /alert 440 9 18";
const SETINTERVAL_USAGE: &str = "⚠️ Usage: /setinterval <minutes>";

/// Executes commands and produces the reply text
pub struct CommandHandler {
    store: SubscriberStore,
    scheduler: Arc<Scheduler>,
    currency: String,
    quote_currency: String,
    default_interval: u32,
    /// `@name` a command suffix must carry; unknown means any suffix is accepted
    bot_username: Option<String>,
}

impl CommandHandler {
    pub fn new(
        store: SubscriberStore,
        scheduler: Arc<Scheduler>,
        currency: impl Into<String>,
        quote_currency: impl Into<String>,
        default_interval: u32,
    ) -> Self {
        Self {
            store,
            scheduler,
            currency: currency.into(),
            quote_currency: quote_currency.into(),
            default_interval,
            bot_username: None,
        }
    }

    /// Only answer `/command@name` when `name` is this bot
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    /// Handle one incoming message; `None` means no reply
    pub fn handle(&self, chat: ChatId, text: &str) -> Option<String> {
        let command = match Command::parse_addressed(text, self.bot_username.as_deref()) {
            Ok(command) => command,
            Err(CommandError::AlertUsage) => return Some(ALERT_USAGE.to_string()),
            Err(CommandError::SetIntervalUsage) => return Some(SETINTERVAL_USAGE.to_string()),
            Err(CommandError::Unknown(name)) => {
                tracing::debug!(chat_id = chat, command = %name, "Ignoring unknown command");
                return None;
            }
            Err(CommandError::OtherBot(name)) => {
                tracing::debug!(chat_id = chat, bot = %name, "Ignoring command for another bot");
                return None;
            }
            Err(CommandError::NotACommand) => return None,
        };

        tracing::info!(chat_id = chat, ?command, "Handling command");
        Some(self.execute(chat, command))
    }

    fn execute(&self, chat: ChatId, command: Command) -> String {
        match command {
            Command::Start | Command::Help => self.usage(),
            Command::Alert {
                threshold,
                from_hour,
                to_hour,
            } => match self.store.upsert(chat, threshold, from_hour, to_hour) {
                Ok(_) => format!(
                    "✅ Subscribed to alerts when {} > {} {} between {}:00–{}:00.",
                    self.currency,
                    format_threshold(threshold),
                    self.quote_currency,
                    from_hour,
                    to_hour
                ),
                Err(SubscriptionError::InvalidHours { .. }) => {
                    "❌ Invalid hours. Use 0-23 and from_hour < to_hour.".to_string()
                }
                Err(SubscriptionError::InvalidThreshold(_)) => {
                    "❌ Invalid threshold. Use a positive number.".to_string()
                }
            },
            Command::Unsubscribe => {
                if self.store.remove(chat) {
                    "🛑 You have been unsubscribed from alerts.".to_string()
                } else {
                    "ℹ️ You are not subscribed.".to_string()
                }
            }
            Command::SetInterval { minutes } => match self.scheduler.set_interval(minutes) {
                Ok(minutes) => format!("✅ Check interval updated to every {} minutes.", minutes),
                Err(e) => {
                    tracing::debug!(chat_id = chat, error = %e, "Rejected interval");
                    match e {
                        SchedulerError::IntervalTooShort(_) => {
                            "❌ Interval must be at least 1 minute.".to_string()
                        }
                        SchedulerError::IntervalTooLong(_) => format!(
                            "❌ Interval must be at most {} minutes.",
                            MAX_INTERVAL_MINUTES
                        ),
                    }
                }
            },
        }
    }

    fn usage(&self) -> String {
        format!(
            "Welcome! Use /alert <threshold> [from_hour] [to_hour] to subscribe.\n\
             Example: /alert 435 9 18\n\
             Use /unsubscribe to stop alerts.\n\
             Use /setinterval <minutes> to change check interval (default {}).",
            self.default_interval
        )
    }
}
