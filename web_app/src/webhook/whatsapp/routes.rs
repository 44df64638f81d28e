//! WhatsApp webhook endpoint handlers
//!
//! `GET /webhook` answers the subscription handshake and `POST /webhook`
//! receives message events. Any other method is answered with a 404.

use super::{handler, security, validation};
use crate::{
    consts,
    webhook::{AppState, errors::WebhookError},
};
use futures::StreamExt;
use ntex::{
    http,
    util::{Bytes, BytesMut},
    web,
};

/// Webhook verification endpoint (GET)
///
/// WhatsApp sends a GET request to verify the webhook URL.
///
/// # Returns
/// - 200 with the raw challenge string if verification succeeds
/// - 400 listing the offending parameters otherwise
pub async fn verify(
    req: web::HttpRequest,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let query = validation::parse_verify_query(req.query_string())?;
    let challenge = validation::validate_verify_query(&query, &app_state.settings.verify_token)?;

    logfire::info!("Webhook verification successful");

    Ok(web::HttpResponse::Ok()
        .content_type("text/plain")
        .body(challenge.to_string()))
}

/// Collects the request body, refusing anything above `limit` bytes
async fn read_body(
    mut payload: web::types::Payload,
    limit: usize,
) -> Result<Bytes, WebhookError> {
    let mut body = BytesMut::new();

    while let Some(chunk) = payload.next().await {
        let chunk =
            chunk.map_err(|e| WebhookError::Internal(format!("failed to read request body: {e}")))?;

        if body.len() + chunk.len() > limit {
            return Err(WebhookError::http(
                consts::PAYLOAD_TOO_LARGE_MESSAGE,
                Some(http::StatusCode::PAYLOAD_TOO_LARGE),
            ));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body.freeze())
}

/// Webhook receiver endpoint (POST)
///
/// Validates the body, answers the first message of every change and only
/// then acknowledges the request. WhatsApp gives us 20 seconds to respond.
pub async fn receive(
    req: web::HttpRequest,
    payload: web::types::Payload,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let _span = logfire::span!("whatsapp_webhook").entered();

    let body = read_body(payload, app_state.settings.max_body_bytes).await?;

    if let Some(app_secret) = &app_state.settings.app_secret {
        let signature = req
            .headers()
            .get(consts::SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok());

        if let Err(e) = security::verify_signature(signature, &body, app_secret) {
            logfire::warn!("Rejected webhook payload: {error}", error = e.to_string());
            return Err(
                WebhookError::http(e.to_string(), Some(http::StatusCode::UNAUTHORIZED)).into(),
            );
        }
    }

    let payload = validation::parse_payload(&body, app_state.settings.text_body_rule)?;

    logfire::info!(
        "Received webhook: object={object}, entries={entries}",
        object = payload.object.clone(),
        entries = payload.entry.len() as i64
    );

    handler::process_webhook(&payload, &app_state.whatsapp_client).await?;

    Ok(web::HttpResponse::Ok().json(&serde_json::json!({
        "message": consts::ACK_MESSAGE
    })))
}

/// Fallback for every method other than GET and POST
pub async fn method_not_implemented() -> Result<web::HttpResponse, web::Error> {
    Err(WebhookError::method_not_implemented().into())
}
