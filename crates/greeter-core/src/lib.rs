//! Event-debounce and gating engine for the chat greeter.
//!
//! The crate is platform-neutral: inbound platform events are projected into
//! [`InboundUpdate`], classified into [`ChatEvent`]s and routed through a
//! priority-ordered [`Dispatcher`]. Outbound messages go through the
//! [`ChatClient`] seam and time is read through [`GetNow`]/[`GetElapsed`],
//! so every gate can be exercised without a network or a real clock.
//!
//! | Component | Type | Reads | Writes |
//! |-----------|------|-------|--------|
//! | Chat State Store | [`ChatStateStore`] | - | - |
//! | Activity Counter | [`ActivityCounter`] | - | `activity_count` |
//! | Greeting Gate | [`GreetingGate`] | `activity_count` | `activity_count`, `last_greeting` |
//! | Keyword Trigger Gate | [`KeywordTrigger`] | `last_trigger_fired_at` | `last_trigger_fired_at` |
//! | Command Responders | [`CommandResponder`] | - | - |

pub mod activity;
pub mod client;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod events;
pub mod greeter;
pub mod greeting;
pub mod keyword;
#[cfg(any(test, feature = "test-support"))]
pub mod mocks;
pub mod state;
pub mod time;

pub use activity::ActivityCounter;
pub use client::{ChatClient, ChatId, Formatting, LinkPreview, MessageRef, SendOptions};
pub use commands::CommandResponder;
pub use config::{ConfigError, GateConfig, Messages};
pub use dispatcher::{Dispatcher, EventHandler, HandlerReport, Outcome};
pub use events::{classify, ChatEvent, Command, InboundUpdate, JoinedUser};
pub use greeter::Greeter;
pub use greeting::{GreetingDebounce, GreetingDecision, GreetingGate, GreetingPhase};
pub use keyword::KeywordTrigger;
pub use state::{ChatState, ChatStateStore};
pub use time::{GetElapsed, GetNow, SystemClock};
