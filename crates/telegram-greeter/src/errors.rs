//! Telegram-specific error handling
//!
//! Classifies teloxide errors so failures are logged at a level matching
//! their severity. The greeter never retries: a failed send simply means the
//! message does not appear.

use std::fmt;
use std::time::Duration;

use teloxide::{ApiError, RequestError};
use thiserror::Error;

/// How a failed request should be treated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorClass {
    /// Telegram asked us to slow down
    FloodControl(Duration),
    /// The group was upgraded to a supergroup with a new id
    Migrated(i64),
    /// The target message no longer exists
    AlreadyGone,
    /// Will keep failing until an operator intervenes (kicked, no rights, bad token...)
    Permanent(String),
    /// Network, I/O or unexpected responses
    Transient(String),
}

impl ErrorClass {
    pub fn is_permanent(&self) -> bool {
        matches!(self, ErrorClass::Permanent(_) | ErrorClass::Migrated(_))
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorClass::FloodControl(wait) => write!(f, "flood control, retry after {:?}", wait),
            ErrorClass::Migrated(id) => write!(f, "chat migrated to {}", id),
            ErrorClass::AlreadyGone => write!(f, "message already gone"),
            ErrorClass::Permanent(reason) => write!(f, "permanent: {}", reason),
            ErrorClass::Transient(reason) => write!(f, "transient: {}", reason),
        }
    }
}

/// Error returned by [`crate::client::TelegramClient`]
#[derive(Debug, Error)]
#[error("{operation} failed ({class})")]
pub struct TelegramError {
    pub operation: &'static str,
    pub class: ErrorClass,
    #[source]
    pub source: RequestError,
}

impl TelegramError {
    pub fn new(operation: &'static str, source: RequestError) -> Self {
        Self {
            operation,
            class: classify(&source),
            source,
        }
    }
}

/// Classify a `RequestError`.
pub fn classify(err: &RequestError) -> ErrorClass {
    match err {
        RequestError::RetryAfter(secs) => {
            ErrorClass::FloodControl(Duration::from_secs(secs.duration().as_secs().max(1)))
        }
        RequestError::MigrateToChatId(new_id) => ErrorClass::Migrated(new_id.0),
        RequestError::Network(_) | RequestError::Io(_) => ErrorClass::Transient(err.to_string()),
        RequestError::InvalidJson { raw, .. } => {
            ErrorClass::Transient(format!("invalid JSON response: {}", raw))
        }
        RequestError::Api(api_err) => classify_api(api_err),
    }
}

fn classify_api(api_err: &ApiError) -> ErrorClass {
    match api_err {
        ApiError::MessageToDeleteNotFound => ErrorClass::AlreadyGone,

        ApiError::BotBlocked
        | ApiError::BotKicked
        | ApiError::BotKickedFromSupergroup
        | ApiError::InvalidToken
        | ApiError::ChatNotFound
        | ApiError::GroupDeactivated
        | ApiError::NotEnoughRightsToPostMessages
        | ApiError::MessageTextIsEmpty
        | ApiError::MessageIsTooLong
        | ApiError::MessageToReplyNotFound
        // Still visible; usually older than Telegram's 48h deletion window.
        | ApiError::MessageCantBeDeleted => ErrorClass::Permanent(api_err.to_string()),

        ApiError::CantParseEntities(details) => {
            ErrorClass::Permanent(format!("can't parse entities: {}", details))
        }

        _ => ErrorClass::Transient(api_err.to_string()),
    }
}
