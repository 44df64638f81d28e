//! Error type shared by the webhook endpoints and its HTTP rendering.
//!
//! Every failure raised while serving `/webhook` ends up as a [`WebhookError`]
//! and is turned into a response exactly once, by the [`WebResponseError`]
//! implementation at the bottom of this module.
//!
//! [`WebResponseError`]: ntex::web::error::WebResponseError

use crate::{consts, metric};
use derive_more::{Display, Error};
use ntex::{http, web};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;
use tracing::error;

/// One schema violation, addressed by its dotted path in the input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub field: String,
    pub message: String,
}

/// Every schema violation found in a single input, in discovery order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Issues(Vec<Issue>);

impl Issues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(Issue {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<&Issue> {
        self.0.first()
    }

    /// `Ok(())` when nothing was reported, otherwise a validation error
    pub fn into_result(self) -> Result<(), WebhookError> {
        if self.is_empty() {
            return Ok(());
        }
        Err(WebhookError::Validation(self))
    }
}

impl fmt::Display for Issues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", issue.field, issue.message)?;
        }
        Ok(())
    }
}

#[derive(Debug, Display, Error)]
pub enum WebhookError {
    /// Query or body does not match the expected schema
    #[display("invalid input: {_0}")]
    Validation(#[error(not(source))] Issues),

    /// Deliberate failure surfaced verbatim to the caller
    #[display("{message}")]
    Http {
        message: String,
        status: http::StatusCode,
    },

    /// WhatsApp answered the outbound call with a non-2xx status
    #[display("whatsapp api returned status {status}: {body}")]
    Provider { status: u16, body: Value },

    /// The outbound call never produced a response
    #[display("whatsapp api request failed: {_0}")]
    Transport(reqwest::Error),

    #[display("internal error: {_0}")]
    Internal(#[error(not(source))] String),
}

impl WebhookError {
    /// Application exception, `500` unless a status is given
    pub fn http(message: impl Into<String>, status: Option<http::StatusCode>) -> Self {
        WebhookError::Http {
            message: message.into(),
            status: status.unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    pub fn method_not_implemented() -> Self {
        Self::http(
            consts::METHOD_NOT_IMPLEMENTED_MESSAGE,
            Some(http::StatusCode::NOT_FOUND),
        )
    }

    fn kind(&self) -> &'static str {
        match self {
            WebhookError::Validation(_) => "validation",
            WebhookError::Http { .. } => "http",
            WebhookError::Provider { .. } => "provider",
            WebhookError::Transport(_) => "transport",
            WebhookError::Internal(_) => "internal",
        }
    }

    /// Status and JSON body the caller receives for this error
    pub fn reply(&self) -> (http::StatusCode, Value) {
        match self {
            WebhookError::Validation(issues) => {
                let message = issues
                    .first()
                    .map(|issue| issue.message.as_str())
                    .unwrap_or(consts::INVALID_FIELD_MESSAGE);
                let issues: Vec<&Issue> = issues.iter().collect();

                (
                    http::StatusCode::BAD_REQUEST,
                    json!({ "message": message, "issues": issues }),
                )
            }
            WebhookError::Http { message, status } => (*status, json!({ "message": message })),
            WebhookError::Provider { status, body } => (
                http::StatusCode::from_u16(*status)
                    .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR),
                json!({
                    "message": provider_message(body).unwrap_or(consts::PROVIDER_ERROR_MESSAGE),
                    "response": body,
                }),
            ),
            WebhookError::Transport(_) => (
                http::StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": consts::PROVIDER_ERROR_MESSAGE, "response": Value::Null }),
            ),
            WebhookError::Internal(_) => (
                http::StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": consts::UNEXPECTED_ERROR_MESSAGE }),
            ),
        }
    }
}

/// Error message inside a provider error body.
///
/// Accepts a top-level `message` as well as the Graph API `error.message` shape.
fn provider_message(body: &Value) -> Option<&str> {
    body.get("message")
        .and_then(Value::as_str)
        .or_else(|| body.pointer("/error/message").and_then(Value::as_str))
}

impl web::error::WebResponseError for WebhookError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        metric::incr_error_kind_statds(self.kind());

        match self {
            WebhookError::Validation(_) | WebhookError::Http { .. } => {}
            _ => error!("{:#?}", self),
        }

        let (status, body) = self.reply();
        web::HttpResponse::build(status).json(&body)
    }

    fn status_code(&self) -> http::StatusCode {
        self.reply().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_reply_lists_every_issue() {
        let mut issues = Issues::new();
        issues.push("object", "Required");
        issues.push("entry", "Expected array, received string");

        let (status, body) = WebhookError::Validation(issues).reply();

        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "message": "Required",
                "issues": [
                    {"field": "object", "message": "Required"},
                    {"field": "entry", "message": "Expected array, received string"}
                ]
            })
        );
    }

    #[test]
    fn test_validation_reply_without_issues_uses_default_message() {
        let (status, body) = WebhookError::Validation(Issues::new()).reply();

        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], consts::INVALID_FIELD_MESSAGE);
        assert_eq!(body["issues"], json!([]));
    }

    #[test]
    fn test_http_exception_defaults_to_internal_error() {
        let (status, body) = WebhookError::http("boom", None).reply();

        assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": "boom"}));
    }

    #[test]
    fn test_method_not_implemented_reply() {
        let (status, body) = WebhookError::method_not_implemented().reply();

        assert_eq!(status, http::StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "Method not implemented"}));
    }

    #[test]
    fn test_provider_reply_keeps_status_and_raw_body() {
        let error = WebhookError::Provider {
            status: 401,
            body: json!({"message": "invalid token"}),
        };

        let (status, body) = error.reply();

        assert_eq!(status, http::StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            json!({"message": "invalid token", "response": {"message": "invalid token"}})
        );
    }

    #[test]
    fn test_provider_reply_reads_graph_error_message() {
        let graph_error = json!({
            "error": {"message": "Invalid OAuth access token.", "type": "OAuthException", "code": 190}
        });
        let error = WebhookError::Provider {
            status: 400,
            body: graph_error.clone(),
        };

        let (status, body) = error.reply();

        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid OAuth access token.");
        assert_eq!(body["response"], graph_error);
    }

    #[test]
    fn test_provider_reply_without_message_uses_placeholder() {
        let error = WebhookError::Provider {
            status: 503,
            body: json!("upstream unavailable"),
        };

        let (status, body) = error.reply();

        assert_eq!(status, http::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["message"], consts::PROVIDER_ERROR_MESSAGE);
        assert_eq!(body["response"], "upstream unavailable");
    }

    #[test]
    fn test_transport_reply_has_no_provider_response() {
        let transport = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();

        let (status, body) = WebhookError::Transport(transport).reply();

        assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"message": consts::PROVIDER_ERROR_MESSAGE, "response": null})
        );
    }

    #[test]
    fn test_internal_reply_hides_details() {
        let (status, body) = WebhookError::Internal("db password is hunter2".into()).reply();

        assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": consts::UNEXPECTED_ERROR_MESSAGE}));
    }
}
