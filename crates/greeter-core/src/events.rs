//! Inbound event model and classification.

use serde::{Deserialize, Serialize};

use crate::client::ChatId;

/// A user added to a chat by a membership-change event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedUser {
    pub id: i64,
    pub is_bot: bool,
    pub display_name: String,
}

/// Platform-neutral projection of one platform event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundUpdate {
    pub chat: Option<ChatId>,
    pub message_id: Option<i32>,
    /// The sender is a bot account (this bot included).
    pub from_bot: bool,
    /// Message text, or the caption of a media message.
    pub text: Option<String>,
    /// Users added by this event, when it is a membership change.
    pub added_users: Option<Vec<JoinedUser>>,
}

/// Explicit bot commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// `/welcome`: post the onboarding notice, ungated.
    Welcome,
    /// `/rules`: post the rules message.
    Rules,
    /// Any other slash command. No responder handles it.
    Other(String),
}

impl Command {
    pub fn parse(name: &str) -> Self {
        match name {
            "welcome" => Command::Welcome,
            "rules" => Command::Rules,
            other => Command::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Command::Welcome => "welcome",
            Command::Rules => "rules",
            Command::Other(name) => name,
        }
    }
}

/// Classified inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    OrdinaryMessage {
        chat: ChatId,
        text: String,
    },
    MembershipChange {
        chat: ChatId,
        added_users: Vec<JoinedUser>,
    },
    Command {
        chat: ChatId,
        command: Command,
        message_id: Option<i32>,
    },
}

impl ChatEvent {
    pub fn chat(&self) -> ChatId {
        match self {
            ChatEvent::OrdinaryMessage { chat, .. }
            | ChatEvent::MembershipChange { chat, .. }
            | ChatEvent::Command { chat, .. } => *chat,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChatEvent::OrdinaryMessage { .. } => "ordinary_message",
            ChatEvent::MembershipChange { .. } => "membership_change",
            ChatEvent::Command { .. } => "command",
        }
    }
}

/// Classify an inbound update. `None` means the update performs no action.
///
/// `bot_username` lets commands addressed to another bot (`/rules@other_bot`)
/// count as ordinary chat activity instead.
pub fn classify(update: &InboundUpdate, bot_username: Option<&str>) -> Option<ChatEvent> {
    let chat = update.chat?;

    if let Some(added) = &update.added_users {
        if added.is_empty() {
            return None;
        }
        return Some(ChatEvent::MembershipChange {
            chat,
            added_users: added.clone(),
        });
    }

    if update.from_bot {
        return None;
    }

    let text = update.text.clone().unwrap_or_default();
    if let Some(command) = parse_command(&text, bot_username) {
        return Some(ChatEvent::Command {
            chat,
            command,
            message_id: update.message_id,
        });
    }

    Some(ChatEvent::OrdinaryMessage { chat, text })
}

fn parse_command(text: &str, bot_username: Option<&str>) -> Option<Command> {
    let head = text.split_whitespace().next()?;
    let invocation = head.strip_prefix('/')?;
    if invocation.is_empty() {
        return None;
    }

    let (name, addressee) = match invocation.split_once('@') {
        Some((name, addressee)) => (name, Some(addressee)),
        None => (invocation, None),
    };

    if let (Some(addressee), Some(ours)) = (addressee, bot_username) {
        if !addressee.eq_ignore_ascii_case(ours) {
            return None;
        }
    }

    Some(Command::parse(&name.to_lowercase()))
}
