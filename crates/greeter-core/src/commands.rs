//! Command Responders: `/welcome` and `/rules`, never gated.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::client::{ChatClient, ChatId, Formatting, LinkPreview, SendOptions};
use crate::config::Messages;
use crate::dispatcher::{EventHandler, Outcome};
use crate::events::{ChatEvent, Command};

/// Stateless: neither responder reads or writes chat state.
pub struct CommandResponder<C> {
    client: C,
    messages: Messages,
}

impl<C: ChatClient> CommandResponder<C> {
    pub fn new(client: C, messages: Messages) -> Self {
        Self { client, messages }
    }

    /// Post the welcome text as a reply to the invoking message.
    pub async fn force_greeting(&self, chat: ChatId, reply_to: Option<i32>) -> Outcome {
        let options = SendOptions::default()
            .formatting(Formatting::Markdown)
            .reply_to(reply_to);
        self.send(chat, self.messages.welcome.clone(), options, "welcome")
            .await
    }

    pub async fn rules(&self, chat: ChatId) -> Outcome {
        let preview = self
            .messages
            .rules_preview_url
            .clone()
            .map_or(LinkPreview::Disabled, LinkPreview::Image);
        let options = SendOptions::default()
            .formatting(Formatting::Html)
            .preview(preview);
        self.send(chat, self.messages.rules.clone(), options, "rules")
            .await
    }

    async fn send(&self, chat: ChatId, text: String, options: SendOptions, command: &str) -> Outcome {
        match self.client.send_message(chat, text, options).await {
            Ok(sent) => {
                info!(%chat, command, message = %sent, "Command reply sent");
                Outcome::Sent(sent)
            }
            Err(e) => {
                warn!(%chat, command, error = %e, "Failed to send command reply");
                Outcome::Failed
            }
        }
    }
}

#[async_trait]
impl<C: ChatClient> EventHandler for CommandResponder<C> {
    fn name(&self) -> &'static str {
        "commands"
    }

    fn accepts(&self, event: &ChatEvent) -> bool {
        matches!(event, ChatEvent::Command { .. })
    }

    async fn handle(&self, event: &ChatEvent) -> Outcome {
        let ChatEvent::Command {
            chat,
            command,
            message_id,
        } = event
        else {
            return Outcome::Skipped;
        };

        match command {
            Command::Welcome => self.force_greeting(*chat, *message_id).await,
            Command::Rules => self.rules(*chat).await,
            Command::Other(name) => {
                debug!(%chat, command = %name, "Ignoring unknown command");
                Outcome::Skipped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockChatClient;

    fn responder(preview: Option<&str>) -> (CommandResponder<MockChatClient>, MockChatClient) {
        let client = MockChatClient::new();
        let messages = Messages {
            welcome: "hello".into(),
            trigger_reply: "reply".into(),
            rules: "<b>rules</b>".into(),
            rules_preview_url: preview.map(str::to_string),
        };
        (CommandResponder::new(client.clone(), messages), client)
    }

    fn command(command: Command) -> ChatEvent {
        ChatEvent::Command {
            chat: ChatId(3),
            command,
            message_id: Some(77),
        }
    }

    #[tokio::test]
    async fn test_force_greeting_replies_every_time() {
        let (responder, client) = responder(None);
        for _ in 0..3 {
            assert!(matches!(
                responder.handle(&command(Command::Welcome)).await,
                Outcome::Sent(_)
            ));
        }

        let sent = client.sent();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|m| m.text == "hello"));
        assert!(sent.iter().all(|m| m.options.reply_to == Some(77)));
        assert!(sent.iter().all(|m| m.options.formatting == Formatting::Markdown));
    }

    #[tokio::test]
    async fn test_rules_attaches_preview_image() {
        let (responder, client) = responder(Some("https://example.org/rules.png"));
        responder.handle(&command(Command::Rules)).await;

        let sent = client.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text, "<b>rules</b>");
        assert_eq!(sent[0].options.formatting, Formatting::Html);
        assert_eq!(
            sent[0].options.preview,
            LinkPreview::Image("https://example.org/rules.png".into())
        );
    }

    #[tokio::test]
    async fn test_rules_without_preview_disables_it() {
        let (responder, client) = responder(None);
        responder.rules(ChatId(3)).await;
        assert_eq!(client.sent()[0].options.preview, LinkPreview::Disabled);
    }

    #[tokio::test]
    async fn test_unknown_command_is_skipped() {
        let (responder, client) = responder(None);
        assert_eq!(
            responder.handle(&command(Command::Other("start".into()))).await,
            Outcome::Skipped
        );
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_reports_failed() {
        let (responder, client) = responder(None);
        client.fail_sends(1);
        assert_eq!(
            responder.force_greeting(ChatId(3), None).await,
            Outcome::Failed
        );
    }
}
