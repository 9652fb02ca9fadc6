//! `ChatClient` over the Telegram Bot API

use greeter_core::{ChatClient, ChatId, Formatting, LinkPreview, MessageRef, SendOptions};
use teloxide::prelude::*;
use teloxide::types::{LinkPreviewOptions, MessageId, ParseMode, ReplyParameters};
use tracing::{debug, error, warn};

use crate::errors::{ErrorClass, TelegramError};

#[derive(Clone)]
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

impl ChatClient for TelegramClient {
    type Error = TelegramError;

    async fn send_message(
        &self,
        chat: ChatId,
        text: String,
        options: SendOptions,
    ) -> Result<MessageRef, TelegramError> {
        let mut req = self.bot.send_message(teloxide::types::ChatId(chat.0), text);

        req.disable_notification = Some(options.silent);
        req.parse_mode = convert_formatting(options.formatting);
        req.link_preview_options = Some(convert_preview(options.preview));
        if let Some(reply_to) = options.reply_to {
            req.reply_parameters =
                Some(ReplyParameters::new(MessageId(reply_to)).allow_sending_without_reply());
        }

        match req.await {
            Ok(sent) => Ok(MessageRef {
                chat,
                message_id: sent.id.0,
            }),
            Err(e) => {
                let err = TelegramError::new("send_message", e);
                log_failure(chat, &err);
                Err(err)
            }
        }
    }

    async fn delete_message(&self, message: MessageRef) -> Result<(), TelegramError> {
        let result = self
            .bot
            .delete_message(
                teloxide::types::ChatId(message.chat.0),
                MessageId(message.message_id),
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let err = TelegramError::new("delete_message", e);
                if err.class == ErrorClass::AlreadyGone {
                    debug!(%message, "Message was already gone");
                    return Ok(());
                }
                log_failure(message.chat, &err);
                Err(err)
            }
        }
    }
}

fn log_failure(chat: ChatId, err: &TelegramError) {
    if err.class.is_permanent() {
        error!(%chat, operation = err.operation, class = %err.class, "Telegram request failed permanently");
        return;
    }
    match &err.class {
        ErrorClass::FloodControl(wait) => {
            warn!(%chat, operation = err.operation, ?wait, "Telegram flood control hit")
        }
        _ => warn!(%chat, operation = err.operation, class = %err.class, "Telegram request failed"),
    }
}

pub(crate) fn convert_formatting(formatting: Formatting) -> Option<ParseMode> {
    match formatting {
        Formatting::Plain => None,
        #[allow(deprecated)]
        Formatting::Markdown => Some(ParseMode::Markdown),
        Formatting::Html => Some(ParseMode::Html),
    }
}

pub(crate) fn convert_preview(preview: LinkPreview) -> LinkPreviewOptions {
    match preview {
        LinkPreview::Disabled => LinkPreviewOptions {
            is_disabled: true,
            url: None,
            prefer_small_media: false,
            prefer_large_media: false,
            show_above_text: false,
        },
        LinkPreview::Image(url) => LinkPreviewOptions {
            is_disabled: false,
            url: Some(url),
            prefer_small_media: false,
            prefer_large_media: true,
            show_above_text: false,
        },
    }
}
