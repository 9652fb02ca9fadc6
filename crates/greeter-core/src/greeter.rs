//! Wires the gates into a [`Dispatcher`] with the fixed priority groups.

use std::sync::Arc;

use tracing::trace;

use crate::activity::ActivityCounter;
use crate::client::{ChatClient, ChatId};
use crate::commands::CommandResponder;
use crate::config::{GateConfig, Messages};
use crate::dispatcher::{Dispatcher, HandlerReport};
use crate::events::{classify, ChatEvent, InboundUpdate};
use crate::greeting::{GreetingDebounce, GreetingGate, GreetingPhase};
use crate::keyword::KeywordTrigger;
use crate::state::{ChatState, ChatStateStore};
use crate::time::GetElapsed;

/// Counting runs strictly before any gate reads the counter.
pub const COUNTING_GROUP: u8 = 0;
pub const GATE_GROUP: u8 = 1;

pub struct Greeter<K: GetElapsed> {
    store: Arc<ChatStateStore<K::Instant>>,
    dispatcher: Dispatcher,
    debounce: GreetingDebounce,
    bot_username: Option<String>,
}

impl<K: GetElapsed> Greeter<K> {
    pub fn new<C: ChatClient>(client: C, clock: K, gate: GateConfig, messages: Messages) -> Self {
        let store = Arc::new(ChatStateStore::new());
        let debounce = GreetingDebounce::new(gate.greeting_threshold);

        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register(
                COUNTING_GROUP,
                Arc::new(ActivityCounter::new(Arc::clone(&store))),
            )
            .register(
                GATE_GROUP,
                Arc::new(KeywordTrigger::new(
                    client.clone(),
                    clock,
                    Arc::clone(&store),
                    gate.trigger_phrase,
                    messages.trigger_reply.clone(),
                    gate.trigger_cooldown,
                )),
            )
            .register(
                GATE_GROUP,
                Arc::new(GreetingGate::new(
                    client.clone(),
                    Arc::clone(&store),
                    debounce,
                    messages.welcome.clone(),
                )),
            )
            .register(GATE_GROUP, Arc::new(CommandResponder::new(client, messages)));

        Self {
            store,
            dispatcher,
            debounce,
            bot_username: None,
        }
    }

    /// Commands addressed to another username are treated as chat activity.
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    /// Classify and dispatch one inbound update.
    pub async fn handle(&self, update: &InboundUpdate) -> Vec<HandlerReport> {
        match classify(update, self.bot_username.as_deref()) {
            Some(event) => self.dispatch(&event).await,
            None => {
                trace!(?update.chat, "Update matched no classification");
                Vec::new()
            }
        }
    }

    pub async fn dispatch(&self, event: &ChatEvent) -> Vec<HandlerReport> {
        self.dispatcher.dispatch(event).await
    }

    pub fn state(&self, chat: ChatId) -> Option<ChatState<K::Instant>> {
        self.store.snapshot(chat)
    }

    pub fn phase(&self, chat: ChatId) -> GreetingPhase {
        self.debounce
            .phase(self.state(chat).map_or(0, |state| state.activity_count))
    }

    pub fn active_chats(&self) -> usize {
        self.store.len()
    }
}
