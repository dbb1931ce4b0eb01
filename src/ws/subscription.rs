//! Per-connection subscription manager.
//!
//! Tracks which clean topics a WebSocket client is subscribed to and
//! provides server-side event filtering.

use std::collections::HashSet;

use crate::domain::Topic;

/// Manages the set of topic subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed topics. If `subscribe_all` is true, this set is ignored.
    topics: HashSet<Topic>,
    /// Whether the client subscribes to every clean topic (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds topics to the subscription set. `wildcard` enables `"*"`.
    pub fn subscribe(&mut self, topics: &[Topic], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.topics.extend(topics.iter().copied());
    }

    /// Removes topics from the subscription set. `wildcard` clears
    /// everything, including the wildcard itself.
    pub fn unsubscribe(&mut self, topics: &[Topic], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
            self.topics.clear();
            return;
        }
        for topic in topics {
            self.topics.remove(topic);
        }
    }

    /// Returns `true` if events on `topic` should be forwarded.
    #[must_use]
    pub fn matches(&self, topic: Topic) -> bool {
        self.subscribe_all || self.topics.contains(&topic)
    }

    /// Currently subscribed topics, in a stable order.
    #[must_use]
    pub fn active(&self) -> Vec<Topic> {
        Topic::CLEAN
            .into_iter()
            .filter(|t| self.matches(*t))
            .collect()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(Topic::CLEAN.iter().all(|t| !mgr.matches(*t)));
    }

    #[test]
    fn subscribe_specific_topic() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[Topic::CleanCombined], false);
        assert!(mgr.matches(Topic::CleanCombined));
        assert!(!mgr.matches(Topic::CleanPrice));
    }

    #[test]
    fn wildcard_matches_every_clean_topic() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        assert_eq!(mgr.active(), Topic::CLEAN.to_vec());
    }

    #[test]
    fn unsubscribe_removes_topic() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[Topic::CleanStation, Topic::CleanPrice], false);
        mgr.unsubscribe(&[Topic::CleanStation], false);
        assert_eq!(mgr.active(), vec![Topic::CleanPrice]);
    }

    #[test]
    fn wildcard_unsubscribe_clears_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[Topic::CleanStation], true);
        mgr.unsubscribe(&[], true);
        assert!(!mgr.is_subscribed_all());
        assert!(mgr.active().is_empty());
    }
}
