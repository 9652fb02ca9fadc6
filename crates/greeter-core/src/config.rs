//! Gate thresholds and message texts.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("welcome text must not be empty")]
    EmptyWelcome,

    #[error("rules text must not be empty")]
    EmptyRules,

    #[error("trigger reply must not be empty when trigger phrase {0:?} is set")]
    EmptyTriggerReply(String),
}

/// Gate thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// A join re-greets only once more than this many ordinary messages were observed.
    pub greeting_threshold: u64,
    /// Phrase that triggers the canned reply. Empty disables the trigger.
    pub trigger_phrase: String,
    pub trigger_cooldown: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            greeting_threshold: DEFAULT_GREETING_THRESHOLD,
            trigger_phrase: default_trigger_phrase(),
            trigger_cooldown: Duration::from_secs(DEFAULT_TRIGGER_COOLDOWN_SECS),
        }
    }
}

pub const DEFAULT_GREETING_THRESHOLD: u64 = 3;
pub const DEFAULT_TRIGGER_COOLDOWN_SECS: u64 = 10;

pub fn default_trigger_phrase() -> String {
    "조합비".to_string()
}

/// Texts posted by the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Messages {
    /// Onboarding notice (Markdown).
    #[serde(default = "default_welcome")]
    pub welcome: String,
    /// Canned reply to the trigger phrase (plain text).
    #[serde(default = "default_trigger_reply")]
    pub trigger_reply: String,
    /// Rules message (HTML).
    #[serde(default = "default_rules")]
    pub rules: String,
    /// Image rendered as the rules message's link preview.
    #[serde(default)]
    pub rules_preview_url: Option<String>,
}

fn default_welcome() -> String {
    "안녕하세요! 전국민주일반노조 누구나노조지회 채팅방에 오신것을 환영합니다!\n\
     조합비 납부 방법, 계좌번호 등 자주 묻는 질문은 홈페이지를 참조해주세요.\n\
     https://everyone-nodong.github.io/\n\
     최근 소식은 채팅방 상단 고정된 메시지에서 확인하실 수 있습니다."
        .to_string()
}

fn default_trigger_reply() -> String {
    "조합비 납부 방법과 계좌번호는 홈페이지에서 확인하실 수 있습니다: https://everyone-nodong.github.io/"
        .to_string()
}

fn default_rules() -> String {
    "<b>채팅방 이용 규칙</b>\n\
     서로 존중하는 대화를 부탁드립니다. 광고, 도배, 비방은 삭제될 수 있습니다.\n\
     자세한 안내는 <a href=\"https://everyone-nodong.github.io/\">홈페이지</a>를 참조해주세요."
        .to_string()
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            welcome: default_welcome(),
            trigger_reply: default_trigger_reply(),
            rules: default_rules(),
            rules_preview_url: None,
        }
    }
}

impl Messages {
    pub fn validate(&self, gate: &GateConfig) -> Result<(), ConfigError> {
        if self.welcome.trim().is_empty() {
            return Err(ConfigError::EmptyWelcome);
        }
        if self.rules.trim().is_empty() {
            return Err(ConfigError::EmptyRules);
        }
        if !gate.trigger_phrase.is_empty() && self.trigger_reply.trim().is_empty() {
            return Err(ConfigError::EmptyTriggerReply(gate.trigger_phrase.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_gate_config() {
        let gate = GateConfig::default();
        assert_eq!(gate.greeting_threshold, 3);
        assert_eq!(gate.trigger_cooldown, Duration::from_secs(10));
        assert!(!gate.trigger_phrase.is_empty());
    }

    #[test]
    fn test_default_messages_validate() {
        let messages = Messages::default();
        assert!(messages.welcome.contains("https://everyone-nodong.github.io/"));
        assert_eq!(messages.validate(&GateConfig::default()), Ok(()));
    }

    #[test]
    fn test_empty_welcome_rejected() {
        let messages = Messages {
            welcome: "  ".into(),
            ..Default::default()
        };
        assert_eq!(
            messages.validate(&GateConfig::default()),
            Err(ConfigError::EmptyWelcome)
        );
    }

    #[test]
    fn test_empty_rules_rejected() {
        let messages = Messages {
            rules: String::new(),
            ..Default::default()
        };
        assert_eq!(
            messages.validate(&GateConfig::default()),
            Err(ConfigError::EmptyRules)
        );
    }

    #[test]
    fn test_empty_trigger_reply_only_matters_with_phrase() {
        let messages = Messages {
            trigger_reply: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            messages.validate(&GateConfig::default()),
            Err(ConfigError::EmptyTriggerReply(_))
        ));

        let disabled = GateConfig {
            trigger_phrase: String::new(),
            ..Default::default()
        };
        assert_eq!(messages.validate(&disabled), Ok(()));
    }
}
