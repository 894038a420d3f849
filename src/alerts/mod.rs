//! Threshold alerting
//!
//! Subscriptions live in a shared in-memory store. A recurring job fetches
//! the current rate, evaluates every subscription and sends at most one alert
//! per above-threshold episode.

pub mod checker;
pub mod config;
pub mod evaluator;
pub mod scheduler;
pub mod store;

pub use checker::{AlertChecker, CycleReport, RateObservation};
pub use config::{ActiveWindow, ChatId, Subscription, SubscriptionError};
pub use evaluator::{format_threshold, Evaluator, Notification, Outcome};
pub use scheduler::{Scheduler, SchedulerError, MAX_INTERVAL_MINUTES};
pub use store::SubscriberStore;
