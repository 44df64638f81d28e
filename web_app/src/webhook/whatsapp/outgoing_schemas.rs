//! # WhatsApp Outgoing Message Schemas
//!
//! Payloads sent to the WhatsApp Cloud API `/messages` endpoint.

use serde::{Deserialize, Serialize};

/// Text message to send to WhatsApp
#[derive(Debug, Serialize, Deserialize)]
pub struct OutgoingTextMessage {
    /// Messaging product, always "whatsapp"
    pub messaging_product: String,
    /// Always "individual", group sends are not supported
    pub recipient_type: String,
    /// Recipient's WhatsApp ID (phone number)
    pub to: String,
    #[serde(rename = "type")]
    pub msg_type: String,
    pub text: OutgoingTextContent,
}

impl OutgoingTextMessage {
    pub fn new(to: String, body: String) -> Self {
        Self {
            messaging_product: "whatsapp".to_string(),
            recipient_type: "individual".to_string(),
            to,
            msg_type: "text".to_string(),
            text: OutgoingTextContent { body },
        }
    }
}

/// Text content for outgoing messages
#[derive(Debug, Serialize, Deserialize)]
pub struct OutgoingTextContent {
    /// Message body text
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_message_wire_shape() {
        let message = OutgoingTextMessage::new("5511999999999".into(), "hi".into());

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            serde_json::json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "5511999999999",
                "type": "text",
                "text": {"body": "hi"}
            })
        );
    }
}
