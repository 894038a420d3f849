use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::handler::CommandHandler;
use super::telegram::{TelegramClient, TelegramError};

/// Server-side long-poll wait
const POLL_TIMEOUT: Duration = Duration::from_secs(30);
/// Pause after a failed poll so a dead network does not spin
const ERROR_PAUSE: Duration = Duration::from_secs(5);

/// Long-polls Telegram for commands and replies to them
pub struct UpdatePoller {
    telegram: TelegramClient,
    handler: CommandHandler,
    running: Arc<AtomicBool>,
}

impl UpdatePoller {
    pub fn new(telegram: TelegramClient, handler: CommandHandler) -> Self {
        Self {
            telegram,
            handler,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the background poll loop
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);

        tokio::spawn(async move {
            tracing::info!("Update poller started");
            let mut offset = None;

            while self.running.load(Ordering::SeqCst) {
                if let Err(e) = self.poll_once(&mut offset, POLL_TIMEOUT).await {
                    tracing::warn!(error = %e, "Polling for updates failed");
                    tokio::time::sleep(ERROR_PAUSE).await;
                }
            }

            tracing::info!("Update poller stopped");
        })
    }

    /// Stop after the current poll returns
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Fetch one batch of updates and answer every command in it
    ///
    /// Returns the number of updates consumed and advances `offset` past them.
    pub async fn poll_once(
        &self,
        offset: &mut Option<i64>,
        poll_timeout: Duration,
    ) -> Result<usize, TelegramError> {
        let updates = self.telegram.get_updates(*offset, poll_timeout).await?;

        for update in &updates {
            *offset = Some(update.update_id + 1);

            let Some(message) = &update.message else {
                continue;
            };
            let Some(text) = message.text.as_deref() else {
                continue;
            };

            if let Some(reply) = self.handler.handle(message.chat.id, text) {
                if let Err(e) = self.telegram.send_message(message.chat.id, &reply).await {
                    tracing::error!(chat_id = message.chat.id, error = %e, "Failed to send reply");
                }
            }
        }

        Ok(updates.len())
    }
}
