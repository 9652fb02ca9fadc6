//! Message handlers for Telegram updates

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::Message;
use tracing::debug;

use crate::bridge::to_inbound;
use crate::health::AppState;
use crate::BotGreeter;

/// Every message, service messages included, goes through the greeter.
pub async fn handle_message(
    msg: Message,
    greeter: Arc<BotGreeter>,
    health: AppState,
) -> ResponseResult<()> {
    health.increment_updates_received().await;

    let update = to_inbound(&msg);
    let reports = greeter.handle(&update).await;

    debug!(
        chat = msg.chat.id.0,
        message_id = msg.id.0,
        handlers = reports.len(),
        "Update dispatched"
    );

    health.record(&reports, greeter.active_chats()).await;

    Ok(())
}
