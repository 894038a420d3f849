//! Minimal Telegram Bot API client

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::alerts::ChatId;

/// Client for the Bot API methods the notifier needs
#[derive(Clone)]
pub struct TelegramClient {
    http_client: reqwest::Client,
    /// `{api_url}/bot{token}`
    base_url: String,
    request_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

/// The bot's own account, from `getMe`
#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: i64,
    pub username: Option<String>,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: ChatId,
    text: &'a str,
}

#[derive(Serialize)]
struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

impl TelegramClient {
    pub fn new(
        api_url: &str,
        token: &str,
        request_timeout: Duration,
    ) -> Result<Self, TelegramError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(request_timeout)
            .build()
            .map_err(|e| TelegramError::Http(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            request_timeout,
        })
    }

    /// Fetch the bot's own account; its username addresses group commands
    pub async fn get_me(&self) -> Result<BotUser, TelegramError> {
        self.call("getMe", &serde_json::json!({}), self.request_timeout)
            .await
    }

    /// Send a plain text message to `chat_id`
    pub async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), TelegramError> {
        let request = SendMessageRequest { chat_id, text };
        let _: serde_json::Value = self
            .call("sendMessage", &request, self.request_timeout)
            .await?;

        tracing::debug!(chat_id, "Message sent");
        Ok(())
    }

    /// Long-poll for new updates
    ///
    /// `poll_timeout` is passed to the server; the HTTP request waits
    /// slightly longer than that.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        poll_timeout: Duration,
    ) -> Result<Vec<Update>, TelegramError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: poll_timeout.as_secs(),
            allowed_updates: ["message"],
        };
        self.call("getUpdates", &request, poll_timeout + self.request_timeout)
            .await
    }

    async fn call<B, T>(&self, method: &str, body: &B, timeout: Duration) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, method);

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .timeout(timeout)
            .send()
            .await
            // reqwest errors embed the URL, which carries the token
            .map_err(|e| TelegramError::Http(e.without_url().to_string()))?;

        let status = response.status();
        let parsed: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| TelegramError::Http(e.without_url().to_string()))?;

        match parsed {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(TelegramError::Api {
                method: method.to_string(),
                status: status.as_u16(),
                description: description.unwrap_or_default(),
            }),
        }
    }
}

/// Telegram API errors
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("{method} failed with status {status}: {description}")]
    Api {
        method: String,
        status: u16,
        description: String,
    },
}
