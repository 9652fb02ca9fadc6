//! In-memory [`ChatClient`] for tests.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::client::{ChatClient, ChatId, MessageRef, SendOptions};

#[derive(Debug, Clone)]
pub struct MockError(pub String);

impl std::fmt::Display for MockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for MockError {}

/// A message accepted by [`MockChatClient::send_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message: MessageRef,
    pub text: String,
    pub options: SendOptions,
}

/// Records every send and delete. Message ids are assigned from a shared
/// counter starting at 1, so clones observe one consistent history.
#[derive(Debug, Clone)]
pub struct MockChatClient {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    deleted: Arc<Mutex<Vec<MessageRef>>>,
    next_id: Arc<AtomicI32>,
    send_fail_count: Arc<Mutex<u32>>,
    delete_fail_count: Arc<Mutex<u32>>,
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockChatClient {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicI32::new(1)),
            send_fail_count: Arc::new(Mutex::new(0)),
            delete_fail_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Fail the next `n` sends.
    pub fn fail_sends(&self, n: u32) {
        *lock(&self.send_fail_count) = n;
    }

    /// Fail the next `n` deletes.
    pub fn fail_deletes(&self, n: u32) {
        *lock(&self.delete_fail_count) = n;
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        lock(&self.sent).clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        lock(&self.sent).iter().map(|m| m.text.clone()).collect()
    }

    pub fn sent_to(&self, chat: ChatId) -> Vec<SentMessage> {
        lock(&self.sent)
            .iter()
            .filter(|m| m.message.chat == chat)
            .cloned()
            .collect()
    }

    pub fn deleted(&self) -> Vec<MessageRef> {
        lock(&self.deleted).clone()
    }

    /// Sent messages containing `text` that have not been deleted since.
    pub fn live_with_text(&self, chat: ChatId, text: &str) -> Vec<MessageRef> {
        let deleted = self.deleted();
        self.sent_to(chat)
            .into_iter()
            .filter(|m| m.text == text && !deleted.contains(&m.message))
            .map(|m| m.message)
            .collect()
    }

    fn take_failure(counter: &Mutex<u32>) -> bool {
        let mut remaining = lock(counter);
        if *remaining > 0 {
            *remaining -= 1;
            true
        } else {
            false
        }
    }
}

impl ChatClient for MockChatClient {
    type Error = MockError;

    async fn send_message(
        &self,
        chat: ChatId,
        text: String,
        options: SendOptions,
    ) -> Result<MessageRef, MockError> {
        if Self::take_failure(&self.send_fail_count) {
            return Err(MockError(format!("send to {} failed", chat)));
        }
        let message = MessageRef {
            chat,
            message_id: self.next_id.fetch_add(1, Ordering::SeqCst),
        };
        lock(&self.sent).push(SentMessage {
            message,
            text,
            options,
        });
        Ok(message)
    }

    async fn delete_message(&self, message: MessageRef) -> Result<(), MockError> {
        if Self::take_failure(&self.delete_fail_count) {
            return Err(MockError(format!("delete of {} failed", message)));
        }
        lock(&self.deleted).push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_assigns_increasing_ids() {
        let client = MockChatClient::new();
        let a = client
            .send_message(ChatId(1), "a".into(), SendOptions::default())
            .await
            .unwrap();
        let b = client
            .send_message(ChatId(2), "b".into(), SendOptions::default())
            .await
            .unwrap();

        assert_eq!(a.message_id, 1);
        assert_eq!(b.message_id, 2);
        assert_eq!(client.sent_texts(), vec!["a", "b"]);
        assert_eq!(client.sent_to(ChatId(2)).len(), 1);
    }

    #[tokio::test]
    async fn test_mock_fail_sends_then_recovers() {
        let client = MockChatClient::new();
        client.fail_sends(1);

        assert!(client
            .send_message(ChatId(1), "x".into(), SendOptions::default())
            .await
            .is_err());
        assert!(client
            .send_message(ChatId(1), "x".into(), SendOptions::default())
            .await
            .is_ok());
        assert_eq!(client.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_tracks_live_messages() {
        let client = MockChatClient::new();
        let first = client
            .send_message(ChatId(1), "hello".into(), SendOptions::default())
            .await
            .unwrap();
        client.delete_message(first).await.unwrap();
        let second = client
            .send_message(ChatId(1), "hello".into(), SendOptions::default())
            .await
            .unwrap();

        assert_eq!(client.live_with_text(ChatId(1), "hello"), vec![second]);
    }

    #[tokio::test]
    async fn test_mock_failed_delete_is_not_recorded() {
        let client = MockChatClient::new();
        client.fail_deletes(1);
        let r = MessageRef {
            chat: ChatId(1),
            message_id: 9,
        };
        assert!(client.delete_message(r).await.is_err());
        assert!(client.deleted().is_empty());
    }
}
