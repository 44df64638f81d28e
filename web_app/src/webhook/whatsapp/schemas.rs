//! # WhatsApp Webhook Schemas
//!
//! Typed view of the JSON payload WhatsApp sends when a message arrives.
//! Values only reach these types after [`super::validation`] has accepted the
//! raw body, so the required/conditional rules live there, not here.

use serde::{Deserialize, Serialize};

/// Root webhook payload from WhatsApp
#[derive(Debug, Deserialize, Serialize)]
pub struct WebhookPayload {
    /// The object type, always "whatsapp_business_account"
    pub object: String,
    /// Array of entry objects containing the actual data
    pub entry: Vec<Entry>,
}

/// Entry object grouping the changes for one business account
#[derive(Debug, Deserialize, Serialize)]
pub struct Entry {
    /// Business Account ID
    pub id: String,
    /// Array of changes that occurred
    pub changes: Vec<Change>,
}

/// Change object containing the actual webhook data
#[derive(Debug, Deserialize, Serialize)]
pub struct Change {
    /// The field that changed, always "messages"
    pub field: String,
    pub value: ChangeValue,
}

/// Value object containing messages and metadata
#[derive(Debug, Deserialize, Serialize)]
pub struct ChangeValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messaging_product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Array of contacts (senders)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<Contact>>,
    /// Messages received, in the order WhatsApp delivered them
    pub messages: Vec<Message>,
}

/// Metadata about the WhatsApp Business phone number
#[derive(Debug, Deserialize, Serialize)]
pub struct Metadata {
    pub display_phone_number: String,
    pub phone_number_id: String,
}

/// Contact information for the message sender
#[derive(Debug, Deserialize, Serialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    /// WhatsApp ID (phone number)
    pub wa_id: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    pub name: String,
}

/// Content kinds WhatsApp can deliver in a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Audio,
    Button,
    Document,
    Text,
    Image,
    Interactive,
    Order,
    Sticker,
    System,
    Unknown,
    Video,
}

impl MessageType {
    pub const ALL: [MessageType; 11] = [
        MessageType::Audio,
        MessageType::Button,
        MessageType::Document,
        MessageType::Text,
        MessageType::Image,
        MessageType::Interactive,
        MessageType::Order,
        MessageType::Sticker,
        MessageType::System,
        MessageType::Unknown,
        MessageType::Video,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Audio => "audio",
            MessageType::Button => "button",
            MessageType::Document => "document",
            MessageType::Text => "text",
            MessageType::Image => "image",
            MessageType::Interactive => "interactive",
            MessageType::Order => "order",
            MessageType::Sticker => "sticker",
            MessageType::System => "system",
            MessageType::Unknown => "unknown",
            MessageType::Video => "video",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

/// Message object
#[derive(Debug, Deserialize, Serialize)]
pub struct Message {
    /// Message ID
    pub id: String,
    /// Sender's WhatsApp ID (phone number)
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(rename = "type")]
    pub msg_type: MessageType,
    /// Present exactly when `msg_type` is audio
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
}

/// Audio attachment reference
#[derive(Debug, Deserialize, Serialize)]
pub struct AudioContent {
    /// Media ID, downloadable through the Graph API
    pub id: String,
    pub mime_type: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TextContent {
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_parse_matches_serde_names() {
        for kind in MessageType::ALL {
            let from_serde: MessageType =
                serde_json::from_value(serde_json::json!(kind.as_str())).unwrap();
            assert_eq!(MessageType::parse(kind.as_str()), Some(from_serde));
        }
        assert_eq!(MessageType::parse("location"), None);
        assert_eq!(MessageType::parse("Audio"), None);
    }

    #[test]
    fn test_message_deserialization_keeps_optional_contents() {
        let json = r#"{
            "id": "wamid.1",
            "from": "5511999999999",
            "timestamp": "1700000000",
            "type": "audio",
            "audio": {"id": "media-1", "mime_type": "audio/ogg; codecs=opus", "voice": true}
        }"#;
        let message: Message = serde_json::from_str(json).unwrap();

        assert_eq!(message.msg_type, MessageType::Audio);
        assert_eq!(message.audio.unwrap().id, "media-1");
        assert!(message.text.is_none());
    }
}
