//! # WhatsApp API Client
//!
//! Sends text replies through the WhatsApp Business Cloud API.

use super::outgoing_schemas::OutgoingTextMessage;
use crate::{config, webhook::errors::WebhookError};
use async_trait::async_trait;
use serde_json::Value;

/// Anything able to deliver a text message to a WhatsApp user
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageSender {
    /// Sends `content` to `to` and returns the provider's raw response body.
    ///
    /// A non-2xx answer is returned as [`WebhookError::Provider`] and a request
    /// that never got an answer as [`WebhookError::Transport`].
    async fn send_text_message(&self, to: String, content: String) -> Result<Value, WebhookError>;
}

pub type ImplMessageSender = Box<dyn MessageSender>;

/// WhatsApp API client, cheap to clone (the http pool is shared)
#[derive(Clone)]
pub struct WhatsAppClient {
    /// HTTP client for making API requests
    client: reqwest::Client,
    /// WhatsApp Business API endpoint for sending messages
    endpoint: String,
    /// Authentication token
    auth_token: String,
}

impl WhatsAppClient {
    pub fn new(endpoint: String, auth_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            auth_token,
        }
    }

    pub fn from_config(app_config: &config::AppConfig) -> Self {
        Self::new(
            app_config.whatsapp_send_msg_endpoint(),
            app_config.whatsapp_business_auth.clone(),
        )
    }
}

#[async_trait]
impl MessageSender for WhatsAppClient {
    async fn send_text_message(&self, to: String, content: String) -> Result<Value, WebhookError> {
        let message = OutgoingTextMessage::new(to, content);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .json(&message)
            .send()
            .await
            .map_err(WebhookError::Transport)?;

        let status = response.status();
        provider_result(status, response.text().await)
    }
}

/// Turns the provider's status and body into the send result.
///
/// Once a status is known a failed answer is always a [`WebhookError::Provider`],
/// with a `null` body when the body itself could not be read.
fn provider_result(
    status: reqwest::StatusCode,
    raw_body: Result<String, reqwest::Error>,
) -> Result<Value, WebhookError> {
    if !status.is_success() {
        let body = match raw_body {
            Ok(raw_body) => parse_body(raw_body),
            Err(_) => Value::Null,
        };
        return Err(WebhookError::Provider {
            status: status.as_u16(),
            body,
        });
    }

    raw_body.map(parse_body).map_err(WebhookError::Transport)
}

/// JSON body when it parses, the raw text otherwise
fn parse_body(raw_body: String) -> Value {
    serde_json::from_str(&raw_body).unwrap_or(Value::String(raw_body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PHONE_NUMBER_ID: &str = "491199940739841";

    fn client_for(mock_server: &MockServer) -> WhatsAppClient {
        WhatsAppClient::new(
            format!("{}/{}/messages", mock_server.uri(), PHONE_NUMBER_ID),
            "test-token".to_string(),
        )
    }

    #[tokio::test]
    async fn test_send_text_message_posts_expected_payload() {
        let mock_server = MockServer::start().await;
        let provider_response = json!({
            "messaging_product": "whatsapp",
            "contacts": [{"input": "5511999999999", "wa_id": "5511999999999"}],
            "messages": [{"id": "wamid.HBgM"}]
        });

        Mock::given(method("POST"))
            .and(path(format!("/{PHONE_NUMBER_ID}/messages")))
            .and(header("Authorization", "Bearer test-token"))
            .and(body_json(json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "5511999999999",
                "type": "text",
                "text": {"body": "message received successfully"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(provider_response.clone()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server)
            .send_text_message(
                "5511999999999".to_string(),
                "message received successfully".to_string(),
            )
            .await;

        assert_eq!(result.unwrap(), provider_response);
    }

    #[tokio::test]
    async fn test_send_text_message_maps_provider_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "invalid token"})),
            )
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server)
            .send_text_message("X".to_string(), "hi".to_string())
            .await;

        match result {
            Err(WebhookError::Provider { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, json!({"message": "invalid token"}));
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_text_message_keeps_non_json_error_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server)
            .send_text_message("X".to_string(), "hi".to_string())
            .await;

        match result {
            Err(WebhookError::Provider { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, json!("Bad Gateway"));
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_text_message_unreachable_provider_is_transport_error() {
        let client = WhatsAppClient::new(
            "http://127.0.0.1:1/messages".to_string(),
            "test-token".to_string(),
        );

        let result = client
            .send_text_message("X".to_string(), "hi".to_string())
            .await;

        assert!(matches!(result, Err(WebhookError::Transport(_))));
    }

    fn read_error() -> reqwest::Error {
        reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err()
    }

    #[test]
    fn test_unreadable_error_body_keeps_provider_status() {
        let result = provider_result(reqwest::StatusCode::BAD_GATEWAY, Err(read_error()));

        match result {
            Err(WebhookError::Provider { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, Value::Null);
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[test]
    fn test_unreadable_success_body_is_transport_error() {
        let result = provider_result(reqwest::StatusCode::OK, Err(read_error()));

        assert!(matches!(result, Err(WebhookError::Transport(_))));
    }
}
