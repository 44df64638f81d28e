//! Schema checks for the subscription handshake and incoming event payloads.
//!
//! The body is checked as raw JSON before it is turned into
//! [`schemas::WebhookPayload`], so that a single response can list every
//! missing or mistyped field instead of stopping at the first one serde hits.

use super::schemas::{self, MessageType};
use crate::{
    config::TextBodyRule,
    consts,
    webhook::errors::{Issues, WebhookError},
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt::Display;
use subtle::ConstantTimeEq;

/// Query parameters for webhook verification
///
/// Every field is optional so that missing parameters are reported as issues
/// instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    /// Should be "subscribe"
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    /// Token configured in the WhatsApp dashboard
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    /// Challenge string to echo back
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

const VERIFY_QUERY_FIELDS: [&str; 3] = ["hub.mode", "hub.verify_token", "hub.challenge"];

/// Decodes the raw handshake query string.
///
/// A malformed query (e.g. a repeated `hub.*` parameter) is reported as an
/// issue on the offending parameter, or on `query` when none can be named.
pub fn parse_verify_query(raw: &str) -> Result<VerifyQuery, WebhookError> {
    serde_urlencoded::from_str(raw).map_err(|e| {
        let message = e.to_string();
        let field = VERIFY_QUERY_FIELDS
            .into_iter()
            .find(|field| message.contains(&format!("`{field}`")))
            .unwrap_or("query");

        let mut issues = Issues::new();
        issues.push(field, message);
        WebhookError::Validation(issues)
    })
}

/// Checks the handshake parameters and returns the challenge to echo back.
pub fn validate_verify_query<'q>(
    query: &'q VerifyQuery,
    expected_token: &str,
) -> Result<&'q str, WebhookError> {
    let mut issues = Issues::new();

    match query.mode.as_deref() {
        None => issues.push("hub.mode", "Required"),
        Some(mode) if mode != consts::SUBSCRIBE_MODE => issues.push(
            "hub.mode",
            format!("Invalid literal value, expected \"{}\"", consts::SUBSCRIBE_MODE),
        ),
        Some(_) => {}
    }

    match query.verify_token.as_deref() {
        None => issues.push("hub.verify_token", "Required"),
        Some(token) => {
            let matches: bool = token.as_bytes().ct_eq(expected_token.as_bytes()).into();
            if !matches {
                issues.push("hub.verify_token", "Invalid verify token");
            }
        }
    }

    if query.challenge.is_none() {
        issues.push("hub.challenge", "Required");
    }

    issues.into_result()?;

    query
        .challenge
        .as_deref()
        .ok_or_else(|| WebhookError::Internal("challenge vanished after validation".into()))
}

/// Parses and validates a raw event body.
pub fn parse_payload(
    body: &[u8],
    rule: TextBodyRule,
) -> Result<schemas::WebhookPayload, WebhookError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        let mut issues = Issues::new();
        issues.push("body", format!("Invalid JSON: {e}"));
        WebhookError::Validation(issues)
    })?;

    validate_payload(&value, rule).into_result()?;

    serde_json::from_value(value).map_err(|e| {
        let mut issues = Issues::new();
        issues.push("body", e.to_string());
        WebhookError::Validation(issues)
    })
}

/// Collects every schema violation in an event payload.
pub fn validate_payload(value: &Value, rule: TextBodyRule) -> Issues {
    let mut checker = SchemaChecker {
        issues: Issues::new(),
        rule,
    };
    checker.payload(value);
    checker.issues
}

struct SchemaChecker {
    issues: Issues,
    rule: TextBodyRule,
}

fn join(parent: &str, key: impl Display) -> String {
    if parent.is_empty() {
        return key.to_string();
    }
    format!("{parent}.{key}")
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl SchemaChecker {
    fn expected(&mut self, path: &str, expected: &str, got: &Value) {
        self.issues.push(
            path,
            format!("Expected {expected}, received {}", kind_of(got)),
        );
    }

    /// Present and non-null field, reporting `Required` otherwise
    fn required<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<&'v Value> {
        match obj.get(key) {
            None | Some(Value::Null) => {
                self.issues.push(join(path, key), "Required");
                None
            }
            Some(value) => Some(value),
        }
    }

    fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Map<String, Value>> {
        match value.as_object() {
            Some(obj) => Some(obj),
            None => {
                self.expected(path, "object", value);
                None
            }
        }
    }

    fn string<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<&'v str> {
        let value = self.required(obj, key, path)?;
        match value.as_str() {
            Some(s) => Some(s),
            None => {
                self.expected(&join(path, key), "string", value);
                None
            }
        }
    }

    fn array<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<&'v Vec<Value>> {
        let value = self.required(obj, key, path)?;
        match value.as_array() {
            Some(items) => Some(items),
            None => {
                self.expected(&join(path, key), "array", value);
                None
            }
        }
    }

    fn literal(&mut self, obj: &Map<String, Value>, key: &str, path: &str, expected: &str) {
        if let Some(actual) = self.string(obj, key, path) {
            if actual != expected {
                self.issues.push(
                    join(path, key),
                    format!("Invalid literal value, expected \"{expected}\""),
                );
            }
        }
    }

    fn payload(&mut self, value: &Value) {
        let Some(root) = self.object(value, "body") else {
            return;
        };

        self.literal(root, "object", "", consts::WHATSAPP_OBJECT);

        if let Some(entries) = self.array(root, "entry", "") {
            for (idx, entry) in entries.iter().enumerate() {
                self.entry(entry, &join("entry", idx));
            }
        }
    }

    fn entry(&mut self, value: &Value, path: &str) {
        let Some(entry) = self.object(value, path) else {
            return;
        };

        self.string(entry, "id", path);

        if let Some(changes) = self.array(entry, "changes", path) {
            let changes_path = join(path, "changes");
            for (idx, change) in changes.iter().enumerate() {
                self.change(change, &join(&changes_path, idx));
            }
        }
    }

    fn change(&mut self, value: &Value, path: &str) {
        let Some(change) = self.object(value, path) else {
            return;
        };

        self.literal(change, "field", path, consts::MESSAGES_FIELD);

        let Some(change_value) = self.required(change, "value", path) else {
            return;
        };
        let value_path = join(path, "value");
        let Some(change_value) = self.object(change_value, &value_path) else {
            return;
        };

        if let Some(messages) = self.array(change_value, "messages", &value_path) {
            let messages_path = join(&value_path, "messages");
            for (idx, message) in messages.iter().enumerate() {
                self.message(message, &join(&messages_path, idx));
            }
        }
    }

    fn message(&mut self, value: &Value, path: &str) {
        let Some(message) = self.object(value, path) else {
            return;
        };

        self.string(message, "id", path);
        self.string(message, "from", path);

        let msg_type = self.string(message, "type", path).and_then(|raw| {
            let parsed = MessageType::parse(raw);
            if parsed.is_none() {
                let options = MessageType::ALL
                    .iter()
                    .map(|kind| format!("'{}'", kind.as_str()))
                    .collect::<Vec<_>>()
                    .join(" | ");
                self.issues.push(
                    join(path, "type"),
                    format!("Invalid enum value. Expected {options}, received '{raw}'"),
                );
            }
            parsed
        });

        match message.get("audio") {
            None | Some(Value::Null) => {
                if msg_type == Some(MessageType::Audio) {
                    self.issues
                        .push(join(path, "audio"), "Required when type is \"audio\"");
                }
            }
            Some(audio) => {
                let audio_path = join(path, "audio");
                if let Some(audio) = self.object(audio, &audio_path) {
                    self.string(audio, "id", &audio_path);
                    self.string(audio, "mime_type", &audio_path);
                }
            }
        }

        match message.get("text") {
            None | Some(Value::Null) => {
                if msg_type == Some(MessageType::Text) && self.rule == TextBodyRule::Required {
                    self.issues
                        .push(join(path, "text"), "Required when type is \"text\"");
                }
            }
            Some(text) => {
                let text_path = join(path, "text");
                if let Some(text) = self.object(text, &text_path) {
                    self.string(text, "body", &text_path);
                }
            }
        }
    }
}
