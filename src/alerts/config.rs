//! Subscription types

use serde::{Deserialize, Serialize};

/// Telegram chat identifier
pub type ChatId = i64;

/// Half-open local hour range `[from_hour, to_hour)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveWindow {
    from_hour: u8,
    to_hour: u8,
}

impl ActiveWindow {
    /// Validate and build a window; both hours must be in `0..=23` and
    /// `from_hour < to_hour`
    pub fn new(from_hour: i64, to_hour: i64) -> Result<Self, SubscriptionError> {
        let in_range = |h: i64| (0..=23).contains(&h);
        if !in_range(from_hour) || !in_range(to_hour) || from_hour >= to_hour {
            return Err(SubscriptionError::InvalidHours { from_hour, to_hour });
        }
        Ok(Self {
            from_hour: from_hour as u8,
            to_hour: to_hour as u8,
        })
    }

    pub fn from_hour(&self) -> u8 {
        self.from_hour
    }

    pub fn to_hour(&self) -> u8 {
        self.to_hour
    }

    /// Whether `hour` falls inside the window
    pub fn contains(&self, hour: u32) -> bool {
        (self.from_hour as u32) <= hour && hour < (self.to_hour as u32)
    }
}

impl Default for ActiveWindow {
    fn default() -> Self {
        Self {
            from_hour: 0,
            to_hour: 23,
        }
    }
}

/// A subscriber's alert parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Rate level that triggers alerting
    pub threshold: f64,
    /// Local hours during which alerting is armed
    pub window: ActiveWindow,
    /// Set once an alert fired for the current above-threshold episode
    #[serde(default)]
    pub notified: bool,
}

impl Subscription {
    /// Create a new, unnotified subscription
    pub fn new(threshold: f64, window: ActiveWindow) -> Result<Self, SubscriptionError> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(SubscriptionError::InvalidThreshold(threshold));
        }
        Ok(Self {
            threshold,
            window,
            notified: false,
        })
    }
}

/// Subscription validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubscriptionError {
    #[error("Invalid hours {from_hour}-{to_hour}: use 0-23 and from_hour < to_hour")]
    InvalidHours { from_hour: i64, to_hour: i64 },

    #[error("Invalid threshold {0}: must be a positive number")]
    InvalidThreshold(f64),
}
