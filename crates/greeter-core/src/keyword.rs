//! Keyword Trigger Gate: canned reply under a wall-clock cooldown.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::client::{ChatClient, ChatId, SendOptions};
use crate::dispatcher::{EventHandler, Outcome};
use crate::events::ChatEvent;
use crate::state::ChatStateStore;
use crate::time::GetElapsed;

pub struct KeywordTrigger<C, K: GetElapsed> {
    client: C,
    clock: K,
    store: Arc<ChatStateStore<K::Instant>>,
    phrase: String,
    reply: String,
    cooldown: Duration,
}

impl<C: ChatClient, K: GetElapsed> KeywordTrigger<C, K> {
    pub fn new(
        client: C,
        clock: K,
        store: Arc<ChatStateStore<K::Instant>>,
        phrase: impl Into<String>,
        reply: impl Into<String>,
        cooldown: Duration,
    ) -> Self {
        Self {
            client,
            clock,
            store,
            phrase: phrase.into(),
            reply: reply.into(),
            cooldown,
        }
    }

    /// Exact, case-sensitive substring match. An empty phrase never matches.
    pub fn matches(&self, text: &str) -> bool {
        !self.phrase.is_empty() && text.contains(&self.phrase)
    }

    /// Claim the reply slot: true when the cooldown has strictly elapsed,
    /// in which case the fire time is advanced to now.
    fn try_fire(&self, chat: ChatId) -> bool {
        self.store.update(chat, |state| {
            let cooled = state
                .last_trigger_fired_at
                .map_or(true, |fired_at| self.clock.elapsed(fired_at) > self.cooldown);
            if cooled {
                state.last_trigger_fired_at = Some(self.clock.now());
            }
            cooled
        })
    }

    pub async fn on_message(&self, chat: ChatId, text: &str) -> Outcome {
        if !self.matches(text) {
            return Outcome::Skipped;
        }
        if !self.try_fire(chat) {
            debug!(%chat, cooldown = ?self.cooldown, "Trigger reply suppressed by cooldown");
            return Outcome::Suppressed;
        }

        match self
            .client
            .send_message(chat, self.reply.clone(), SendOptions::default())
            .await
        {
            Ok(sent) => {
                info!(%chat, message = %sent, "Trigger reply sent");
                Outcome::Sent(sent)
            }
            Err(e) => {
                warn!(%chat, error = %e, "Failed to send trigger reply");
                Outcome::Failed
            }
        }
    }
}

#[async_trait]
impl<C: ChatClient, K: GetElapsed> EventHandler for KeywordTrigger<C, K> {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn accepts(&self, event: &ChatEvent) -> bool {
        matches!(event, ChatEvent::OrdinaryMessage { .. })
    }

    async fn handle(&self, event: &ChatEvent) -> Outcome {
        match event {
            ChatEvent::OrdinaryMessage { chat, text } => self.on_message(*chat, text).await,
            _ => Outcome::Skipped,
        }
    }
}
