//! # WhatsApp Webhook Handler
//!
//! Business logic behind `POST /webhook`: pick the messages to answer and reply
//! to each sender depending on what they sent.

use super::{
    client::ImplMessageSender,
    schemas::{Message, MessageType, WebhookPayload},
};
use crate::{consts, metric, webhook::errors::WebhookError};

/// Messages that will be answered, in payload order.
///
/// Only the first message of each change is taken. WhatsApp delivers one
/// message per change, so anything after the first one is ignored and a change
/// with an empty list contributes nothing.
pub fn process_webhook_messages(payload: &WebhookPayload) -> Vec<&Message> {
    payload
        .entry
        .iter()
        .flat_map(|entry| &entry.changes)
        .filter_map(|change| change.value.messages.first())
        .collect::<Vec<_>>()
}

/// Canned reply for a message: a confirmation for audio, a prompt otherwise
pub fn reply_for(message: &Message) -> &'static str {
    match message.msg_type {
        MessageType::Audio => consts::AUDIO_RECEIVED_REPLY,
        _ => consts::AUDIO_PROMPT_REPLY,
    }
}

/// Answers a single message. Send failures are returned untouched.
pub async fn handle_user_message(
    message: &Message,
    client: &ImplMessageSender,
) -> Result<(), WebhookError> {
    metric::incr_message_type_statds(message.msg_type.as_str());

    logfire::info!(
        "Replying to {msg_type} message {id}",
        msg_type = message.msg_type.as_str().to_string(),
        id = message.id.clone()
    );

    client
        .send_text_message(message.from.clone(), reply_for(message).to_string())
        .await?;

    Ok(())
}

/// Main webhook processor.
///
/// Messages are answered one at a time and the first failure stops the run.
pub async fn process_webhook(
    payload: &WebhookPayload,
    client: &ImplMessageSender,
) -> Result<(), WebhookError> {
    for message in process_webhook_messages(payload) {
        handle_user_message(message, client).await?;
    }

    Ok(())
}
