use axum::{
    body::Bytes,
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::{collections::HashMap, net::SocketAddr};

use crate::models::InboundPayload;
use crate::service;
use crate::state::AppState;

fn client_host(connect: Option<ConnectInfo<SocketAddr>>) -> String {
    connect
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn ingest_query(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let client = client_host(connect);
    tracing::debug!(client = client.as_str(), headers = ?headers, "request headers");
    tracing::debug!(client = client.as_str(), params = ?params, "raw query");

    let parsed = InboundPayload::from_query(params);
    match service::ingest(&state, &client, parsed).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => (err.status, Json(err.body)).into_response(),
    }
}

pub async fn ingest_json(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let client = client_host(connect);
    tracing::debug!(client = client.as_str(), headers = ?headers, "request headers");
    tracing::debug!(
        client = client.as_str(),
        body = %String::from_utf8_lossy(&body),
        "raw payload"
    );

    let parsed = InboundPayload::from_json_body(&body);
    match service::ingest(&state, &client, parsed).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => (err.status, Json(err.body)).into_response(),
    }
}

pub async fn messages(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let client = client_host(connect);
    tracing::debug!(client = client.as_str(), headers = ?headers, "request headers");

    match service::list_cards(&state, &client).await {
        Ok(cards) => (StatusCode::OK, Json(cards)).into_response(),
        Err(err) => (err.status, Json(err.body)).into_response(),
    }
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    // Degraded storage is reported in the body, never as a transport error.
    (StatusCode::OK, Json(service::health(&state).await))
}
