//! Greeting Gate: activity-debounced onboarding notice.
//!
//! Per chat the gate is either **Armed** (more than `threshold` ordinary
//! messages since the last greeting) or **Cooling**. A membership change in
//! the Armed phase emits the greeting and moves the chat back to Cooling with
//! the counter at zero; in the Cooling phase it does nothing. The decision and
//! the counter reset happen in one critical section, so two concurrent joins
//! cannot both see the Armed phase.
//!
//! A join that adds several users is one event and fires the gate at most once.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::client::{ChatClient, ChatId, Formatting, MessageRef, SendOptions};
use crate::dispatcher::{EventHandler, Outcome};
use crate::events::ChatEvent;
use crate::state::{ChatState, ChatStateStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GreetingPhase {
    Armed,
    Cooling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GreetingDecision {
    /// Still cooling down; nothing changes.
    Suppress { activity: u64 },
    /// Counter already reset. `previous` is the greeting to delete first.
    Emit { previous: Option<MessageRef> },
}

/// The ARMED/COOLING state machine, independent of any platform client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreetingDebounce {
    threshold: u64,
}

impl GreetingDebounce {
    pub fn new(threshold: u64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn phase(&self, activity: u64) -> GreetingPhase {
        if activity > self.threshold {
            GreetingPhase::Armed
        } else {
            GreetingPhase::Cooling
        }
    }

    /// Decide for one join event and apply the transition to `state`.
    pub fn on_join<I>(&self, state: &mut ChatState<I>) -> GreetingDecision {
        match self.phase(state.activity_count) {
            GreetingPhase::Cooling => GreetingDecision::Suppress {
                activity: state.activity_count,
            },
            GreetingPhase::Armed => {
                state.activity_count = 0;
                GreetingDecision::Emit {
                    previous: state.last_greeting.take(),
                }
            }
        }
    }
}

pub struct GreetingGate<C, I> {
    client: C,
    store: Arc<ChatStateStore<I>>,
    debounce: GreetingDebounce,
    welcome: String,
}

impl<C: ChatClient, I: Clone + Send + Sync + 'static> GreetingGate<C, I> {
    pub fn new(
        client: C,
        store: Arc<ChatStateStore<I>>,
        debounce: GreetingDebounce,
        welcome: impl Into<String>,
    ) -> Self {
        Self {
            client,
            store,
            debounce,
            welcome: welcome.into(),
        }
    }

    pub fn phase(&self, chat: ChatId) -> GreetingPhase {
        let activity = self
            .store
            .snapshot(chat)
            .map_or(0, |state| state.activity_count);
        self.debounce.phase(activity)
    }

    /// Evaluate one membership-change event for `chat`.
    pub async fn on_join(&self, chat: ChatId) -> Outcome {
        let decision = self.store.update(chat, |state| self.debounce.on_join(state));

        let previous = match decision {
            GreetingDecision::Suppress { activity } => {
                debug!(
                    %chat,
                    activity,
                    threshold = self.debounce.threshold(),
                    "Greeting suppressed while cooling down"
                );
                return Outcome::Suppressed;
            }
            GreetingDecision::Emit { previous } => previous,
        };

        if let Some(previous) = previous {
            self.delete_best_effort(previous).await;
        }

        let options = SendOptions::default()
            .silent()
            .formatting(Formatting::Markdown);
        let sent = match self
            .client
            .send_message(chat, self.welcome.clone(), options)
            .await
        {
            Ok(sent) => sent,
            Err(e) => {
                warn!(%chat, error = %e, "Failed to send greeting");
                return Outcome::Failed;
            }
        };
        info!(%chat, message = %sent, "Greeting sent");

        // A concurrent greeting may have stored its reference while ours was
        // in flight; keep ours and retire the other.
        let displaced = self
            .store
            .update(chat, |state| state.last_greeting.replace(sent));
        if let Some(displaced) = displaced {
            self.delete_best_effort(displaced).await;
        }

        Outcome::Sent(sent)
    }

    async fn delete_best_effort(&self, message: MessageRef) {
        match self.client.delete_message(message).await {
            Ok(()) => debug!(%message, "Deleted previous greeting"),
            Err(e) => warn!(%message, error = %e, "Failed to delete previous greeting"),
        }
    }
}

#[async_trait]
impl<C: ChatClient, I: Clone + Send + Sync + 'static> EventHandler for GreetingGate<C, I> {
    fn name(&self) -> &'static str {
        "greeting"
    }

    fn accepts(&self, event: &ChatEvent) -> bool {
        matches!(
            event,
            ChatEvent::MembershipChange { added_users, .. } if !added_users.is_empty()
        )
    }

    async fn handle(&self, event: &ChatEvent) -> Outcome {
        self.on_join(event.chat()).await
    }
}
