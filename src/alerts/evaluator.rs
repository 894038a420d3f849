//! Per-subscriber threshold evaluation

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Timelike};

use super::config::{ChatId, Subscription};

/// Outcome of evaluating one subscription against one observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Rate crossed above threshold: send an alert
    Fire,
    /// Rate back at or below threshold: armed for the next crossing
    Rearm,
    /// Outside the active window: latch cleared
    Disarm,
    Unchanged,
}

/// Alert message addressed to one chat
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub chat_id: ChatId,
    pub text: String,
}

/// Apply one observation to a subscription, updating its `notified` latch
pub fn step(subscription: &mut Subscription, rate: f64, hour: u32) -> Outcome {
    if !subscription.window.contains(hour) {
        // Cleared on every outside cycle, not only on the exit transition
        subscription.notified = false;
        return Outcome::Disarm;
    }

    if rate > subscription.threshold && !subscription.notified {
        subscription.notified = true;
        Outcome::Fire
    } else if rate <= subscription.threshold && subscription.notified {
        subscription.notified = false;
        Outcome::Rearm
    } else {
        Outcome::Unchanged
    }
}

/// Render a threshold for chat text; whole numbers keep a trailing `.0`
pub fn format_threshold(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Evaluates every subscription and renders alert text
#[derive(Debug, Clone)]
pub struct Evaluator {
    currency: String,
    quote_currency: String,
}

impl Evaluator {
    pub fn new(currency: impl Into<String>, quote_currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            quote_currency: quote_currency.into(),
        }
    }

    /// Run one evaluation pass, returning the alerts to send
    pub fn evaluate(
        &self,
        subscriptions: &mut HashMap<ChatId, Subscription>,
        rate: f64,
        now: &DateTime<FixedOffset>,
    ) -> Vec<Notification> {
        let hour = now.hour();
        let mut notifications = Vec::new();

        for (chat_id, subscription) in subscriptions.iter_mut() {
            match step(subscription, rate, hour) {
                Outcome::Fire => notifications.push(Notification {
                    chat_id: *chat_id,
                    text: self.format_alert(subscription.threshold, rate, now),
                }),
                Outcome::Rearm => {
                    tracing::debug!(chat_id = *chat_id, rate, "Alert re-armed");
                }
                Outcome::Disarm | Outcome::Unchanged => {}
            }
        }

        notifications
    }

    /// Alert text: threshold, rate to two decimals, local `HH:MM`
    pub fn format_alert(&self, threshold: f64, rate: f64, now: &DateTime<FixedOffset>) -> String {
        format!(
            "🚨 {} > {} {}!\nCurrent: {:.2} {} ({})",
            self.currency,
            format_threshold(threshold),
            self.quote_currency,
            rate,
            self.quote_currency,
            now.format("%H:%M")
        )
    }
}
