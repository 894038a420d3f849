//! fxwatch: exchange-rate threshold alerts over Telegram
//!
//! Polls a remote rate listing on a timer and messages every subscribed chat
//! once per episode in which the rate sits above that chat's threshold during
//! its active hours.
//!
//! # Components
//!
//! - **Rate source** ([`rates`]): SOAP request and XML extraction of one currency
//! - **Alerts** ([`alerts`]): subscriber store, evaluator, checker and the
//!   recurring job
//! - **Bot** ([`bot`]): command parsing, replies and Telegram long polling
//! - **Status API** ([`api`]): optional `/health` and `/status` endpoints
//!
//! All state is held in memory and lost on restart.
//!
//! # Example
//!
//! ```
//! use fxwatch::alerts::SubscriberStore;
//!
//! let store = SubscriberStore::new();
//! store.upsert(42, 435.0, 9, 18).unwrap();
//! assert!(store.upsert(42, 435.0, 18, 9).is_err());
//! assert!(store.remove(42));
//! ```

pub mod alerts;
pub mod api;
pub mod bot;
pub mod config;
pub mod rates;

// Re-export commonly used types
pub use alerts::{AlertChecker, Scheduler, SubscriberStore, Subscription};
pub use bot::{CommandHandler, TelegramClient, UpdatePoller};
pub use config::{Config, ConfigError};
pub use rates::{FetchError, RateClient};
