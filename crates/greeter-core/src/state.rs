//! Per-chat gating state.
//!
//! One [`ChatState`] record per chat, each behind its own mutex, so unrelated
//! chats never contend. Records are created lazily on first access and live
//! for the process lifetime.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::client::{ChatId, MessageRef};

/// Counters and timestamps that drive the gates for one chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatState<I> {
    /// Ordinary messages observed since the last emitted greeting (or startup).
    pub activity_count: u64,
    /// Most recently posted greeting that has not been deleted yet.
    pub last_greeting: Option<MessageRef>,
    /// When the keyword reply last fired; `None` means never.
    pub last_trigger_fired_at: Option<I>,
}

impl<I> Default for ChatState<I> {
    fn default() -> Self {
        Self {
            activity_count: 0,
            last_greeting: None,
            last_trigger_fired_at: None,
        }
    }
}

/// Arena of per-chat state records keyed by chat identity.
#[derive(Debug)]
pub struct ChatStateStore<I> {
    chats: DashMap<ChatId, Arc<Mutex<ChatState<I>>>>,
    // Records are never removed, so counting insertions is exact.
    created: AtomicUsize,
}

impl<I> Default for ChatStateStore<I> {
    fn default() -> Self {
        Self {
            chats: DashMap::new(),
            created: AtomicUsize::new(0),
        }
    }
}

impl<I: Clone> ChatStateStore<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` as one critical section over the chat's record.
    ///
    /// Never await inside `f`: the lock must not be held across platform I/O.
    pub fn update<R>(&self, chat: ChatId, f: impl FnOnce(&mut ChatState<I>) -> R) -> R {
        let record = self.record(chat);
        let mut state = record.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Copy of the chat's record, if the chat has been seen.
    pub fn snapshot(&self, chat: ChatId) -> Option<ChatState<I>> {
        let record = self.chats.get(&chat).map(|r| Arc::clone(r.value()))?;
        let state = record.lock().unwrap_or_else(PoisonError::into_inner);
        Some(state.clone())
    }

    /// Number of chats with a state record. Does not touch the map shards.
    pub fn len(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // The map shard guard is released before the record is locked.
    fn record(&self, chat: ChatId) -> Arc<Mutex<ChatState<I>>> {
        if let Some(existing) = self.chats.get(&chat) {
            return Arc::clone(existing.value());
        }
        match self.chats.entry(chat) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                self.created.fetch_add(1, Ordering::Relaxed);
                Arc::clone(entry.insert(Arc::default()).value())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ChatStateStore<u64> {
        ChatStateStore::new()
    }

    #[test]
    fn test_record_created_lazily() {
        let store = store();
        assert!(store.is_empty());
        assert!(store.snapshot(ChatId(1)).is_none());

        store.update(ChatId(1), |_| ());
        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot(ChatId(1)), Some(ChatState::default()));
    }

    #[test]
    fn test_chats_are_isolated() {
        let store = store();
        store.update(ChatId(1), |s| s.activity_count = 5);
        store.update(ChatId(2), |s| s.activity_count += 1);

        assert_eq!(store.snapshot(ChatId(1)).unwrap().activity_count, 5);
        assert_eq!(store.snapshot(ChatId(2)).unwrap().activity_count, 1);
    }

    #[test]
    fn test_update_returns_closure_result() {
        let store = store();
        let after = store.update(ChatId(7), |s| {
            s.activity_count += 2;
            s.activity_count
        });
        assert_eq!(after, 2);
    }

    #[test]
    fn test_concurrent_updates_do_not_lose_increments() {
        let store = Arc::new(store());
        std::thread::scope(|scope| {
            for _ in 0..8 {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    for _ in 0..1000 {
                        store.update(ChatId(1), |s| s.activity_count += 1);
                    }
                });
            }
        });
        assert_eq!(store.snapshot(ChatId(1)).unwrap().activity_count, 8000);
    }

    #[test]
    fn test_len_counts_each_chat_once_under_contention() {
        let store = Arc::new(store());
        std::thread::scope(|scope| {
            for _ in 0..8 {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    for chat in 0..50 {
                        store.update(ChatId(chat), |s| s.activity_count += 1);
                    }
                });
            }
        });
        assert_eq!(store.len(), 50);
        assert_eq!(store.snapshot(ChatId(49)).unwrap().activity_count, 8);
    }
}
