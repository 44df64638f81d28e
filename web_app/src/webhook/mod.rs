//! Webhook handlers for the WhatsApp Business Cloud API
//!
//! - [`whatsapp`] - handshake, event validation and replies
//! - [`errors`] - the single place where failures become HTTP responses
//! - [`routes`] - mounts the endpoints on the ntex app

pub mod errors;
pub mod routes;
pub mod whatsapp;

use crate::config::{AppConfig, TextBodyRule};

/// Per-request settings read from [`AppConfig`] at startup
#[derive(Clone)]
pub struct WebhookSettings {
    /// 🔒 SENSITIVE: expected `hub.verify_token`
    pub verify_token: String,
    pub text_body_rule: TextBodyRule,
    /// POST bodies above this many bytes are refused with a 413
    pub max_body_bytes: usize,
    /// 🔒 SENSITIVE: when set, POST bodies must be signed with it
    pub app_secret: Option<String>,
}

impl From<&AppConfig> for WebhookSettings {
    fn from(app_config: &AppConfig) -> Self {
        Self {
            verify_token: app_config.whatsapp_verify_token.clone(),
            text_body_rule: app_config.text_body_rule(),
            max_body_bytes: app_config.webhook_max_body_bytes,
            app_secret: app_config.whatsapp_app_secret.clone(),
        }
    }
}

pub struct AppState {
    pub whatsapp_client: whatsapp::client::ImplMessageSender,
    pub settings: WebhookSettings,
}
