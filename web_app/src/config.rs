//! Application configuration management with security considerations.
//!
//! This module handles all configuration values required by the webhook.
//! Sensitive fields are clearly marked and should never be logged.

use envconfig::Envconfig;
use std::sync::OnceLock;

/// How strictly `text` messages are validated.
///
/// With [`TextBodyRule::Required`] a message with `type == "text"` must carry a
/// `text.body`; with [`TextBodyRule::Optional`] the `text` object is only
/// checked when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBodyRule {
    Required,
    Optional,
}

impl From<bool> for TextBodyRule {
    fn from(required: bool) -> Self {
        if required {
            return TextBodyRule::Required;
        }
        TextBodyRule::Optional
    }
}

/// Application configuration loaded from the environment.
#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// Environment name to deploy the app (NON-SENSITIVE)
    /// Values: "local", "dev", "prod"
    #[envconfig(from = "ENV", default = "local")]
    pub env: String,

    /// Host address for web server binding (NON-SENSITIVE)
    #[envconfig(from = "WEB_SERVER_HOST", default = "0.0.0.0")]
    pub web_server_host: String,

    /// Port for web server binding (NON-SENSITIVE)
    #[envconfig(from = "WEB_SERVER_PORT", default = "8080")]
    pub web_server_port: u16,

    /// 🔒 SENSITIVE: token echoed by Meta during the subscription handshake
    #[envconfig(from = "WHATSAPP_VERIFY_TOKEN")]
    pub whatsapp_verify_token: String,

    /// 🔒 SENSITIVE: WhatsApp Business bearer token for outbound calls
    #[envconfig(from = "WHATSAPP_BUSINESS_AUTH")]
    pub whatsapp_business_auth: String,

    /// WhatsApp Business phone number ID (SEMI-SENSITIVE)
    #[envconfig(from = "WHATSAPP_BUSINESS_PHONE_NUMBER_ID")]
    pub whatsapp_business_phone_number_id: String,

    /// Graph API base url, versioned (NON-SENSITIVE)
    #[envconfig(
        from = "WHATSAPP_API_BASE_URL",
        default = "https://graph.facebook.com/v21.0"
    )]
    pub whatsapp_api_base_url: String,

    /// Whether `text` messages must carry `text.body` (NON-SENSITIVE)
    #[envconfig(from = "WHATSAPP_REQUIRE_TEXT_BODY", default = "true")]
    pub whatsapp_require_text_body: bool,

    /// Largest accepted POST body in bytes (NON-SENSITIVE)
    #[envconfig(from = "WEBHOOK_MAX_BODY_BYTES", default = "1048576")]
    pub webhook_max_body_bytes: usize,

    /// 🔒 SENSITIVE: Meta app secret. When set, POST payloads must be signed
    #[envconfig(from = "WHATSAPP_APP_SECRET")]
    pub whatsapp_app_secret: Option<String>,

    /// 🔒 SENSITIVE: token to export logs and metrics to Logfire
    #[envconfig(from = "LOGFIRE_TOKEN")]
    pub logfire_token: Option<String>,
}

impl AppConfig {
    /// Checks if running in production environment
    pub fn is_prod(&self) -> bool {
        self.env.to_lowercase() == "prod"
    }

    /// Constructs the WhatsApp Business API endpoint for sending messages
    pub fn whatsapp_send_msg_endpoint(&self) -> String {
        format!(
            "{base}/{id}/messages",
            base = self.whatsapp_api_base_url.trim_end_matches('/'),
            id = self.whatsapp_business_phone_number_id
        )
    }

    pub fn text_body_rule(&self) -> TextBodyRule {
        self.whatsapp_require_text_body.into()
    }
}

/// Global application configuration, set once by [`init_config`].
pub static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Loads [`AppConfig`] from the environment and stores it in [`APP_CONFIG`].
pub fn init_config() -> anyhow::Result<()> {
    let app_config = AppConfig::init_from_env()?;

    APP_CONFIG
        .set(app_config)
        .map_err(|_| anyhow::anyhow!("app config was already initialized"))
}
