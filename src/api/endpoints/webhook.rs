//! Webhook ingestion endpoint: the single logical entry point every
//! messaging provider posts to.
//!
//! GET is the verification handshake; POST runs the full pipeline. The
//! classification round trip is blocking, so processing runs under
//! `spawn_blocking` while the async worker stays free.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::{process_inbound, ProcessOutcome};
use crate::webhook::{detect, ProviderPayload};

/// `GET /api/webhook/whatsapp` — provider verification handshake.
///
/// Echoes `hub.challenge` when `hub.verify_token` matches the configured
/// secret; 403 otherwise.
pub async fn verify(
    State(ctx): State<ApiContext>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let token = params.get("hub.verify_token").map(String::as_str);
    let challenge = params.get("hub.challenge").cloned().unwrap_or_default();

    if token == Some(ctx.verify_token.as_str()) {
        (StatusCode::OK, challenge).into_response()
    } else {
        tracing::warn!("webhook verification with invalid token");
        (StatusCode::FORBIDDEN, "Invalid verification token").into_response()
    }
}

#[derive(Serialize)]
pub struct IngestResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<IngestResult>,
}

#[derive(Serialize)]
pub struct IngestResult {
    pub message_id: i64,
    pub persisted: u32,
    pub skipped: usize,
    pub summary: String,
    pub classification_failed: bool,
}

/// `POST /api/webhook/whatsapp` — ingest one inbound message.
pub async fn ingest(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<IngestResponse>, ApiError> {
    let ProviderPayload::Recognized { provider, message } = detect(&headers, &body) else {
        return Err(ApiError::BadRequest(
            "No message text could be extracted from the payload".into(),
        ));
    };
    tracing::info!(provider = provider.as_str(), "webhook message received");

    let worker_ctx = ctx.clone();
    let outcome = tokio::task::spawn_blocking(move || -> Result<ProcessOutcome, ApiError> {
        let preferred = worker_ctx.preferred_model();
        let mut conn = worker_ctx.lock_db()?;
        process_inbound(
            &mut conn,
            &worker_ctx.classifier,
            preferred.as_deref(),
            &message,
            Local::now().naive_local(),
        )
        .map_err(ApiError::from)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("processing task panicked: {e}")))??;

    let response = match outcome {
        ProcessOutcome::Processed {
            message_id,
            persisted,
            skipped,
            summary,
            classification_failed,
            model,
        } => {
            ctx.promote_model(model);
            IngestResponse {
                status: "ok",
                message: None,
                result: Some(IngestResult {
                    message_id,
                    persisted,
                    skipped,
                    summary,
                    classification_failed,
                }),
            }
        }
        // Providers retry on error codes; duplicates and unattributable
        // senders are final states, so they answer 200.
        ProcessOutcome::Duplicate => IngestResponse {
            status: "ignored",
            message: Some("Message already processed".into()),
            result: None,
        },
        ProcessOutcome::UnknownCaregiver { sender } => IngestResponse {
            status: "ignored",
            message: Some(format!("No caregiver registered for {sender}")),
            result: None,
        },
        ProcessOutcome::MissingSender => IngestResponse {
            status: "ignored",
            message: Some("Message carries no sender identity".into()),
            result: None,
        },
    };

    Ok(Json(response))
}
