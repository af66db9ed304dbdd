// POST endpoint /webhook

use crate::core::{ApiError, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use relay::models::inbound::InboundEvent;
use serde::Serialize;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    pub sent_to: Vec<String>,
}

/// Receives a CRM message event, drafts a reply and emails it out.
///
/// Everything logged while the event is relayed, including the pipeline's
/// own events, sits under a `webhook` span carrying the request id.
#[axum::debug_handler]
pub async fn webhook_handler(
    State(app_state): State<AppState>,
    payload: Result<Json<InboundEvent>, JsonRejection>,
) -> Result<Json<WebhookResponse>, ApiError> {
    let span = info_span!("webhook", request_id = %Uuid::new_v4());
    relay_webhook(app_state, payload).instrument(span).await
}

async fn relay_webhook(
    app_state: AppState,
    payload: Result<Json<InboundEvent>, JsonRejection>,
) -> Result<Json<WebhookResponse>, ApiError> {
    // 1. Reject bodies that are not JSON at all.
    let Json(event) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected webhook payload");
        ApiError::Validation(format!("Invalid JSON payload: {}", rejection.body_text()))
    })?;
    info!("Webhook data received");
    debug!(event = ?event, "Webhook payload");

    // 2. Validate, compose and dispatch. Nothing is sent if validation fails.
    let outcome = app_state.relay.handle(&event).await.map_err(|e| {
        if e.is_validation() {
            warn!(reason = %e, "Webhook payload failed validation");
        } else {
            error!(error = %e, "Failed to relay webhook");
        }
        ApiError::from_relay(e, app_state.config.expose_error_trace)
    })?;

    info!(
        status = outcome.status,
        recipients = outcome.sent_to.len(),
        "Webhook relayed"
    );

    Ok(Json(WebhookResponse {
        status: outcome.status,
        sent_to: outcome.sent_to,
    }))
}
