//! Live message feeds.
//!
//! Each feed key (a chat, or the global room) maps to a watch channel
//! carrying the full ordered message list. Publishing replaces the
//! snapshot; subscribers observe the latest state and never a partial
//! delta, so a slow consumer can only skip intermediate snapshots, not
//! reorder them. Dropping a subscription is the unsubscribe.

use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::watch;
use tracing::debug;

/// Registry of live feeds, one watch channel per key.
pub struct FeedRegistry<T> {
    feeds: Mutex<HashMap<String, watch::Sender<Vec<T>>>>,
}

impl<T: Clone> Default for FeedRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FeedRegistry<T> {
    pub fn new() -> Self {
        Self {
            feeds: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe to a feed, seeding the channel with `initial` if no one
    /// is watching it yet.
    pub fn subscribe(&self, key: &str, initial: Vec<T>) -> FeedSubscription<T> {
        let mut feeds = self.feeds.lock().unwrap_or_else(|e| e.into_inner());

        let receiver = match feeds.get(key) {
            Some(sender) => sender.subscribe(),
            None => {
                let (sender, receiver) = watch::channel(initial);
                feeds.insert(key.to_string(), sender);
                receiver
            }
        };

        debug!(key = %key, "feed subscription opened");
        FeedSubscription { receiver }
    }

    /// Push a new snapshot to a feed's subscribers. A feed nobody is
    /// watching is dropped from the registry instead.
    pub fn publish(&self, key: &str, snapshot: Vec<T>) {
        let mut feeds = self.feeds.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(sender) = feeds.get(key) {
            if sender.receiver_count() == 0 {
                feeds.remove(key);
                return;
            }
            // send only errs when all receivers are gone, checked above
            let _ = sender.send(snapshot);
        }
    }

    /// Drop every feed whose subscribers have all gone away.
    pub fn prune(&self) {
        let mut feeds = self.feeds.lock().unwrap_or_else(|e| e.into_inner());
        feeds.retain(|_, sender| sender.receiver_count() > 0);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.feeds.lock().unwrap().len()
    }
}

/// A live view onto one feed. Dropping it unsubscribes.
pub struct FeedSubscription<T> {
    receiver: watch::Receiver<Vec<T>>,
}

impl<T: Clone> FeedSubscription<T> {
    /// The latest snapshot, without waiting.
    pub fn current(&self) -> Vec<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next snapshot. Returns `None` once the feed is gone
    /// and no further updates can arrive.
    pub async fn next(&mut self) -> Option<Vec<T>> {
        match self.receiver.changed().await {
            Ok(()) => Some(self.receiver.borrow_and_update().clone()),
            Err(_) => None,
        }
    }
}
