//! Priority-grouped event dispatch.
//!
//! Handlers are registered into numbered groups. For each event, every handler
//! that accepts it runs; lower groups finish before higher groups start, and
//! handlers within a group run in registration order. This is what guarantees
//! the Activity Counter (group 0) has counted a message before any gate in a
//! later group reads the counter for the same event.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::client::MessageRef;
use crate::events::ChatEvent;

/// What a handler did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// State was updated; nothing was sent.
    Observed,
    /// The event matched but required no action.
    Skipped,
    /// A gate was closed.
    Suppressed,
    Sent(MessageRef),
    /// A platform call failed. Already logged.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerReport {
    pub handler: &'static str,
    pub outcome: Outcome,
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn name(&self) -> &'static str;

    fn accepts(&self, event: &ChatEvent) -> bool;

    /// Must absorb every failure; errors are surfaced only through logging
    /// and [`Outcome::Failed`].
    async fn handle(&self, event: &ChatEvent) -> Outcome;
}

#[derive(Default, Clone)]
pub struct Dispatcher {
    groups: BTreeMap<u8, Vec<Arc<dyn EventHandler>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, group: u8, handler: Arc<dyn EventHandler>) -> &mut Self {
        self.groups.entry(group).or_default().push(handler);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Run every accepting handler in group order. An event no handler
    /// accepts yields an empty report.
    pub async fn dispatch(&self, event: &ChatEvent) -> Vec<HandlerReport> {
        let mut reports = Vec::new();
        for (group, handlers) in &self.groups {
            for handler in handlers.iter().filter(|h| h.accepts(event)) {
                let outcome = handler.handle(event).await;
                debug!(
                    chat = %event.chat(),
                    kind = event.kind(),
                    group,
                    handler = handler.name(),
                    ?outcome,
                    "Handler finished"
                );
                reports.push(HandlerReport {
                    handler: handler.name(),
                    outcome,
                });
            }
        }
        reports
    }
}
