//! Activity Counter: counts ordinary messages per chat.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use crate::client::ChatId;
use crate::dispatcher::{EventHandler, Outcome};
use crate::events::ChatEvent;
use crate::state::ChatStateStore;

pub struct ActivityCounter<I> {
    store: Arc<ChatStateStore<I>>,
}

impl<I: Clone> ActivityCounter<I> {
    pub fn new(store: Arc<ChatStateStore<I>>) -> Self {
        Self { store }
    }

    /// Count one ordinary message; returns the new count.
    pub fn observe(&self, chat: ChatId) -> u64 {
        self.store.update(chat, |state| {
            state.activity_count = state.activity_count.saturating_add(1);
            state.activity_count
        })
    }

    pub fn reset(&self, chat: ChatId) {
        self.store.update(chat, |state| state.activity_count = 0);
    }

    pub fn current(&self, chat: ChatId) -> u64 {
        self.store
            .snapshot(chat)
            .map_or(0, |state| state.activity_count)
    }
}

#[async_trait]
impl<I: Clone + Send + Sync + 'static> EventHandler for ActivityCounter<I> {
    fn name(&self) -> &'static str {
        "activity"
    }

    fn accepts(&self, event: &ChatEvent) -> bool {
        matches!(event, ChatEvent::OrdinaryMessage { .. })
    }

    async fn handle(&self, event: &ChatEvent) -> Outcome {
        let count = self.observe(event.chat());
        trace!(chat = %event.chat(), count, "Counted ordinary message");
        Outcome::Observed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> ActivityCounter<u64> {
        ActivityCounter::new(Arc::new(ChatStateStore::new()))
    }

    #[test]
    fn test_observe_increments_per_chat() {
        let counter = counter();
        assert_eq!(counter.observe(ChatId(1)), 1);
        assert_eq!(counter.observe(ChatId(1)), 2);
        assert_eq!(counter.observe(ChatId(2)), 1);
        assert_eq!(counter.current(ChatId(1)), 2);
    }

    #[test]
    fn test_reset_zeroes_only_that_chat() {
        let counter = counter();
        counter.observe(ChatId(1));
        counter.observe(ChatId(2));
        counter.reset(ChatId(1));

        assert_eq!(counter.current(ChatId(1)), 0);
        assert_eq!(counter.current(ChatId(2)), 1);
    }

    #[test]
    fn test_current_of_unseen_chat_is_zero() {
        assert_eq!(counter().current(ChatId(99)), 0);
    }

    #[tokio::test]
    async fn test_handler_counts_only_ordinary_messages() {
        let counter = counter();
        let join = ChatEvent::MembershipChange {
            chat: ChatId(1),
            added_users: vec![],
        };
        let msg = ChatEvent::OrdinaryMessage {
            chat: ChatId(1),
            text: String::new(),
        };

        assert!(!counter.accepts(&join));
        assert!(counter.accepts(&msg));
        assert_eq!(counter.handle(&msg).await, Outcome::Observed);
        assert_eq!(counter.current(ChatId(1)), 1);
    }
}
