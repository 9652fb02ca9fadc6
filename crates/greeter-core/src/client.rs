//! Outbound capability set the gates need from the messaging platform.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

/// Chat identity; the unit of state partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a message the bot posted, retained so it can be deleted later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat: ChatId,
    pub message_id: i32,
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.chat, self.message_id)
    }
}

/// Text markup understood by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formatting {
    #[default]
    Plain,
    Markdown,
    Html,
}

/// Link preview attached to a sent message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LinkPreview {
    #[default]
    Disabled,
    /// Render a large preview of this image URL.
    Image(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SendOptions {
    /// Deliver without a notification sound.
    pub silent: bool,
    pub formatting: Formatting,
    pub preview: LinkPreview,
    /// Post as a reply to this message in the same chat.
    pub reply_to: Option<i32>,
}

impl SendOptions {
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    pub fn formatting(mut self, formatting: Formatting) -> Self {
        self.formatting = formatting;
        self
    }

    pub fn preview(mut self, preview: LinkPreview) -> Self {
        self.preview = preview;
        self
    }

    pub fn reply_to(mut self, message_id: Option<i32>) -> Self {
        self.reply_to = message_id;
        self
    }
}

/// Send and delete messages on the platform.
///
/// Both calls suspend on platform I/O; callers must not hold a state lock
/// across them.
pub trait ChatClient: Send + Sync + Clone + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn send_message(
        &self,
        chat: ChatId,
        text: String,
        options: SendOptions,
    ) -> impl Future<Output = Result<MessageRef, Self::Error>> + Send;

    /// Best-effort; a failure here is never fatal to the caller.
    fn delete_message(
        &self,
        message: MessageRef,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
