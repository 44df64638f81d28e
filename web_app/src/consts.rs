pub const WEBHOOK_PATH: &str = "/webhook";

pub const SUBSCRIBE_MODE: &str = "subscribe";
pub const WHATSAPP_OBJECT: &str = "whatsapp_business_account";
pub const MESSAGES_FIELD: &str = "messages";
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

pub const AUDIO_RECEIVED_REPLY: &str = "message received successfully";
pub const AUDIO_PROMPT_REPLY: &str =
    "Sorry, I can only understand audio messages. Please send me an audio message instead.";

pub const ACK_MESSAGE: &str = "Hello world";
pub const METHOD_NOT_IMPLEMENTED_MESSAGE: &str = "Method not implemented";
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Payload too large";
pub const INVALID_FIELD_MESSAGE: &str = "Invalid field!";
pub const PROVIDER_ERROR_MESSAGE: &str = "The messaging provider rejected the request";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error happened. Try again later";
