//! In-memory subscriber store

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::config::{ActiveWindow, ChatId, Subscription, SubscriptionError};

/// Shared mapping from chat to subscription
///
/// Cloning yields another handle to the same map. Every access takes the
/// store-wide lock, so a subscribe or unsubscribe never interleaves with an
/// evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct SubscriberStore {
    inner: Arc<Mutex<HashMap<ChatId, Subscription>>>,
}

impl SubscriberStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite the subscription for `chat`
    ///
    /// On validation failure the previous subscription is left untouched.
    pub fn upsert(
        &self,
        chat: ChatId,
        threshold: f64,
        from_hour: i64,
        to_hour: i64,
    ) -> Result<Subscription, SubscriptionError> {
        let window = ActiveWindow::new(from_hour, to_hour)?;
        let subscription = Subscription::new(threshold, window)?;

        self.inner.lock().insert(chat, subscription.clone());
        tracing::info!(
            chat_id = chat,
            threshold,
            from_hour,
            to_hour,
            "Subscription saved"
        );
        Ok(subscription)
    }

    /// Remove the subscription for `chat`, returning whether one existed
    pub fn remove(&self, chat: ChatId) -> bool {
        let removed = self.inner.lock().remove(&chat).is_some();
        if removed {
            tracing::info!(chat_id = chat, "Subscription removed");
        }
        removed
    }

    pub fn get(&self, chat: ChatId) -> Option<Subscription> {
        self.inner.lock().get(&chat).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Copy of every subscription
    pub fn snapshot(&self) -> HashMap<ChatId, Subscription> {
        self.inner.lock().clone()
    }

    /// Run `f` with exclusive access to the whole map
    pub(crate) fn with_subscriptions<R>(
        &self,
        f: impl FnOnce(&mut HashMap<ChatId, Subscription>) -> R,
    ) -> R {
        let mut subscriptions = self.inner.lock();
        f(&mut subscriptions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_and_remove() {
        let store = SubscriberStore::new();
        store.upsert(1, 435.0, 9, 18).unwrap();
        assert_eq!(store.len(), 1);

        assert!(store.remove(1));
        assert!(store.is_empty());
        assert!(!store.remove(1));
    }

    #[test]
    fn test_invalid_hours_leave_store_unchanged() {
        let store = SubscriberStore::new();
        assert!(store.upsert(1, 435.0, 18, 9).is_err());
        assert!(store.is_empty());

        store.upsert(1, 440.0, 9, 18).unwrap();
        let before = store.get(1).unwrap();
        assert!(matches!(
            store.upsert(1, 450.0, 18, 9),
            Err(SubscriptionError::InvalidHours { .. })
        ));
        assert_eq!(store.get(1).unwrap(), before);
    }

    #[test]
    fn test_upsert_overwrites_and_clears_notified() {
        let store = SubscriberStore::new();
        store.upsert(7, 435.0, 0, 23).unwrap();
        store.with_subscriptions(|subs| subs.get_mut(&7).unwrap().notified = true);

        store.upsert(7, 445.0, 10, 12).unwrap();
        let sub = store.get(7).unwrap();
        assert_eq!(sub.threshold, 445.0);
        assert_eq!(sub.window, ActiveWindow::new(10, 12).unwrap());
        assert!(!sub.notified);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let store = SubscriberStore::new();
        let other = store.clone();
        store.upsert(3, 1.5, 0, 23).unwrap();
        assert_eq!(other.len(), 1);
    }
}
