use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::{health, ingest_json, ingest_query, messages};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ingest", get(ingest_query).post(ingest_json))
        .route("/messages", get(messages))
        // Paths Diun and Homer installs already point at.
        .route("/diun", get(ingest_query).post(ingest_json))
        .route("/homer", get(messages))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EventStore;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    async fn test_app(dir: &tempfile::TempDir) -> (Router, EventStore) {
        let store = EventStore::new(dir.path().join("diun2homer.db"));
        store.initialize().await.expect("initialize");
        (build_router(AppState::new(store.clone())), store)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn post_update_shows_up_as_success_card() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (app, store) = test_app(&dir).await;

        let (status, body) = send(
            &app,
            post_json(
                "/ingest",
                json!({"status": "update", "image": "nginx:latest", "message": "new tag found"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "success"}));
        assert_eq!(store.list_all().await.expect("list").len(), 1);

        let (status, body) = send(&app, get("/messages")).await;
        assert_eq!(status, StatusCode::OK);
        let cards = body.as_array().expect("array of cards");
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0]["style"], "is-success");
        assert_eq!(cards[0]["title"], "nginx:latest");
        let content = cards[0]["content"].as_str().expect("content");
        assert!(content.starts_with("new tag found ("));
        assert!(content.ends_with(')'));
    }

    #[tokio::test]
    async fn get_ingest_stores_null_optionals() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (app, store) = test_app(&dir).await;

        let (status, body) = send(
            &app,
            get("/ingest?status=error&image=redis&message=pull+failed"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");

        let events = store.list_all().await.expect("list");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "pull failed");
        assert_eq!(events[0].platform, None);
        assert_eq!(events[0].tag, None);
    }

    #[tokio::test]
    async fn invalid_payload_is_rejected_without_writing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (app, store) = test_app(&dir).await;

        let (status, body) = send(
            &app,
            post_json("/ingest", json!({"status": "new", "message": "no image"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "validation_error");
        assert!(body["message"].as_str().expect("message").contains("image"));

        let request = Request::builder()
            .method("POST")
            .uri("/ingest")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .expect("request");
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(&app, get("/ingest?status=new&message=x")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        assert!(store.list_all().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn extra_fields_are_accepted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (app, store) = test_app(&dir).await;

        let (status, _) = send(
            &app,
            post_json(
                "/diun",
                json!({
                    "status": "new",
                    "image": "alpine:3.20",
                    "message": "first seen",
                    "foo": "bar",
                    "hostname": "docker-host",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.list_all().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn messages_are_newest_first_on_both_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (app, _store) = test_app(&dir).await;

        for (status, image) in [("new", "alpine"), ("error", "redis"), ("weird", "nginx")] {
            let (code, _) = send(
                &app,
                post_json(
                    "/ingest",
                    json!({"status": status, "image": image, "message": "seen"}),
                ),
            )
            .await;
            assert_eq!(code, StatusCode::OK);
        }

        for path in ["/messages", "/homer"] {
            let (status, body) = send(&app, get(path)).await;
            assert_eq!(status, StatusCode::OK);
            let cards = body.as_array().expect("array of cards");
            let titles: Vec<&str> = cards
                .iter()
                .map(|card| card["title"].as_str().expect("title"))
                .collect();
            assert_eq!(titles, vec!["nginx", "redis", "alpine"]);
            assert_eq!(cards[0]["style"], "is-warning");
            assert_eq!(cards[1]["style"], "is-danger");
            assert_eq!(cards[2]["style"], "is-info");
        }
    }

    #[tokio::test]
    async fn empty_store_lists_no_messages() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (app, _store) = test_app(&dir).await;

        let (status, body) = send(&app, get("/messages")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn health_reports_healthy_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (app, _store) = test_app(&dir).await;

        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn unreachable_store_degrades_health_and_fails_requests() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = EventStore::new(dir.path().join("gone/diun2homer.db"));
        let app = build_router(AppState::new(store));

        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "unhealthy");
        assert!(!body["error"].as_str().expect("error detail").is_empty());

        let (status, body) = send(
            &app,
            post_json(
                "/ingest",
                json!({"status": "new", "image": "redis", "message": "x"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "storage_error");

        let (status, _) = send(&app, get("/messages")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
