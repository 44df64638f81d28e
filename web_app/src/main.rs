//! # Audio Reply Webhook
//!
//! Receives WhatsApp Business Cloud API webhooks and answers every sender:
//! audio messages are acknowledged, anything else gets a prompt to send audio.

pub mod config;
pub mod consts;
pub mod metric;
pub mod webhook;

use anyhow::Context;
use logfire::config::{MetricsOptions, SendToLogfire};
use ntex::web;
use webhook::whatsapp::client::WhatsAppClient;

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    // Initialize configuration
    config::init_config()?;

    let app_config = config::APP_CONFIG
        .get()
        .context("failed to get app config")?;

    // Initialize logging and metrics
    let mut logfire_config = logfire::configure()
        .install_panic_handler()
        .with_metrics(Some(MetricsOptions::default()))
        .send_to_logfire(SendToLogfire::IfTokenPresent);
    if let Some(token) = &app_config.logfire_token {
        logfire_config = logfire_config.with_token(token);
    }
    let shutdown_handler = logfire_config.finish()?;

    if app_config.is_prod() && app_config.whatsapp_app_secret.is_none() {
        logfire::warn!("WHATSAPP_APP_SECRET is not set, webhook payloads are not authenticated");
    }

    // One authenticated client for the whole process, shared by every worker
    let whatsapp_client = WhatsAppClient::from_config(app_config);
    let settings = webhook::WebhookSettings::from(app_config);

    configure_and_run_server(app_config, whatsapp_client, settings).await?;

    shutdown_handler.shutdown()?;

    Ok(())
}

/// Creates application state from the provided services
fn create_app_state(
    whatsapp_client: WhatsAppClient,
    settings: webhook::WebhookSettings,
) -> webhook::AppState {
    webhook::AppState {
        whatsapp_client: Box::new(whatsapp_client),
        settings,
    }
}

/// Configures and starts the web server
async fn configure_and_run_server(
    app_config: &config::AppConfig,
    whatsapp_client: WhatsAppClient,
    settings: webhook::WebhookSettings,
) -> anyhow::Result<()> {
    let server_addr = (
        app_config.web_server_host.clone(),
        app_config.web_server_port,
    );

    logfire::info!(
        "Starting webhook server on {host}:{port} ({env})",
        host = server_addr.0.clone(),
        port = i64::from(server_addr.1),
        env = app_config.env.clone()
    );

    web::server(move || {
        web::App::new()
            .wrap(web::middleware::Logger::default())
            .wrap(web::middleware::Compress::default())
            .state(create_app_state(whatsapp_client.clone(), settings.clone()))
            .configure(webhook::routes::whatsapp)
    })
    .bind(server_addr)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
