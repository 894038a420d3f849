//! Evaluation cycle: fetch, evaluate, notify

use chrono::{DateTime, FixedOffset, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use super::evaluator::{Evaluator, Notification};
use super::store::SubscriberStore;
use crate::bot::TelegramClient;
use crate::rates::RateClient;

/// Most recent successfully fetched rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateObservation {
    pub rate: f64,
    pub observed_at: DateTime<Utc>,
}

/// Summary of one completed cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub rate: f64,
    pub notified: usize,
    pub failed: usize,
}

/// Runs evaluation cycles against the shared subscriber store
pub struct AlertChecker {
    rates: RateClient,
    store: SubscriberStore,
    telegram: TelegramClient,
    evaluator: Evaluator,
    utc_offset: FixedOffset,
    last_observation: RwLock<Option<RateObservation>>,
    /// Serializes cycles so an old job never overlaps a new one
    run_guard: tokio::sync::Mutex<()>,
}

impl AlertChecker {
    pub fn new(
        rates: RateClient,
        store: SubscriberStore,
        telegram: TelegramClient,
        evaluator: Evaluator,
        utc_offset: FixedOffset,
    ) -> Self {
        Self {
            rates,
            store,
            telegram,
            evaluator,
            utc_offset,
            last_observation: RwLock::new(None),
            run_guard: tokio::sync::Mutex::new(()),
        }
    }

    pub fn store(&self) -> &SubscriberStore {
        &self.store
    }

    pub fn last_observation(&self) -> Option<RateObservation> {
        *self.last_observation.read()
    }

    /// Run one fetch + evaluate + notify cycle
    ///
    /// Returns `None` when the rate could not be fetched; the cycle is then
    /// skipped without touching any subscription.
    pub async fn run_cycle(&self) -> Option<CycleReport> {
        let _running = self.run_guard.lock().await;

        let rate = match self.rates.fetch_rate().await {
            Ok(rate) => rate,
            Err(e) => {
                tracing::error!(
                    currency = %self.rates.currency(),
                    error = %e,
                    "Failed to fetch rate, skipping cycle"
                );
                return None;
            }
        };

        let now = Utc::now();
        let notifications = self.apply(rate, now);

        let mut failed = 0;
        for notification in &notifications {
            if let Err(e) = self
                .telegram
                .send_message(notification.chat_id, &notification.text)
                .await
            {
                failed += 1;
                tracing::error!(
                    chat_id = notification.chat_id,
                    error = %e,
                    "Failed to send alert"
                );
            }
        }

        tracing::info!(
            rate,
            subscribers = self.store.len(),
            notified = notifications.len() - failed,
            "Rate check complete"
        );

        Some(CycleReport {
            rate,
            notified: notifications.len() - failed,
            failed,
        })
    }

    /// Record an observation and evaluate every subscription under the store lock
    pub fn apply(&self, rate: f64, now: DateTime<Utc>) -> Vec<Notification> {
        *self.last_observation.write() = Some(RateObservation {
            rate,
            observed_at: now,
        });

        let local = now.with_timezone(&self.utc_offset);
        self.store
            .with_subscriptions(|subs| self.evaluator.evaluate(subs, rate, &local))
    }
}
