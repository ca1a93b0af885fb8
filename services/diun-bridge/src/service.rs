use axum::http::StatusCode;

use crate::models::{
    Card, ErrorResponse, HealthResponse, InboundPayload, IngestResponse, ValidationError,
};
use crate::state::AppState;
use crate::store::StoreError;

pub struct ServiceError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ServiceError {
    pub fn new(status: StatusCode, code: &'static str, message: String) -> Self {
        Self {
            status,
            body: ErrorResponse { code, message },
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation_error",
            err.to_string(),
        )
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "storage_error",
            err.to_string(),
        )
    }
}

pub async fn ingest(
    state: &AppState,
    client: &str,
    parsed: Result<InboundPayload, ValidationError>,
) -> Result<IngestResponse, ServiceError> {
    let payload = match parsed {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(client, error = %err, "webhook rejected");
            return Err(err.into());
        }
    };

    tracing::info!(client, image = payload.image.as_str(), "received webhook");
    tracing::debug!(payload = ?payload, "parsed payload");

    match state.store.append(&payload).await {
        Ok(id) => {
            tracing::info!(
                client,
                image = payload.image.as_str(),
                event_id = id,
                "stored diun event"
            );
            Ok(IngestResponse { status: "success" })
        }
        Err(err) => {
            tracing::error!(
                client,
                image = payload.image.as_str(),
                error = %err,
                "failed to store diun event"
            );
            Err(err.into())
        }
    }
}

pub async fn list_cards(state: &AppState, client: &str) -> Result<Vec<Card>, ServiceError> {
    tracing::info!(client, "messages requested");

    let events = state.store.list_all().await.map_err(|err| {
        tracing::error!(client, error = %err, "failed to retrieve messages");
        ServiceError::from(err)
    })?;
    let cards: Vec<Card> = events.iter().map(Card::from).collect();

    tracing::info!(client, count = cards.len(), "returned messages");
    if tracing::enabled!(tracing::Level::DEBUG) {
        let rendered = serde_json::to_string_pretty(&cards).unwrap_or_default();
        tracing::debug!(messages = %rendered, "full messages data");
    }
    Ok(cards)
}

pub async fn health(state: &AppState) -> HealthResponse {
    match state.store.ping().await {
        Ok(()) => {
            tracing::info!("health check successful");
            HealthResponse {
                status: "healthy",
                error: None,
            }
        }
        Err(err) => {
            tracing::error!(error = %err, "health check failed");
            HealthResponse {
                status: "unhealthy",
                error: Some(err.to_string()),
            }
        }
    }
}
