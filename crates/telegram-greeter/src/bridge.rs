//! Converts teloxide messages into the transport-neutral [`InboundUpdate`]

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod bridge_tests;

use greeter_core::{ChatId, InboundUpdate, JoinedUser};
use teloxide::types::{Message, User};

/// Media captions count as text so the keyword reply also sees them.
pub fn to_inbound(msg: &Message) -> InboundUpdate {
    InboundUpdate {
        chat: Some(ChatId(msg.chat.id.0)),
        message_id: Some(msg.id.0),
        from_bot: msg.from.as_ref().is_some_and(|u| u.is_bot),
        text: msg.text().or_else(|| msg.caption()).map(str::to_string),
        added_users: msg
            .new_chat_members()
            .map(|users| users.iter().map(joined_user).collect()),
    }
}

pub(crate) fn joined_user(user: &User) -> JoinedUser {
    JoinedUser {
        id: user.id.0 as i64,
        is_bot: user.is_bot,
        display_name: user.full_name(),
    }
}
