//! HTTP server for Rudby.
//!
//! Serves the jewellery catalog over a small REST API. Every catalog route
//! requires a bearer token; the token's principal is the caller the
//! ownership gate decides for.
//!
//! | Route | Method | Notes |
//! |-------|--------|-------|
//! | `/v1/health`, `/v1/info` | GET | unauthenticated |
//! | `/jewelleries` | GET, POST | POST answers 201 with `Location` |
//! | `/jewelleries/:id` | GET, PUT, DELETE | owner only |
//! | `/jewelleries/by-type/:kind` | GET | first match, owner only |
//! | `/jewelleries/by-collection/:name` | GET | first match, owner only |

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use auth::{AuthProvider, Credentials, StaticTokenAuth};
pub use config::{ServerConfig, StorageConfig, DEFAULT_PORT};
pub use error::{ServerError, ServerResult};
pub use router::{build_router, AppState};
pub use server::RudbyServer;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use rudby_store::{DurableStore, InMemoryDurableStore};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    const ALICE: &str = "t-alice";
    const BOB: &str = "t-bob";

    fn app_with(config: ServerConfig) -> (Arc<InMemoryDurableStore>, Router) {
        let store = Arc::new(InMemoryDurableStore::new());
        let mut config = config;
        config.tokens.insert(ALICE.into(), "alice".into());
        config.tokens.insert(BOB.into(), "bob".into());
        let state = RudbyServer::new(config).state(store.clone());
        (store, build_router(state))
    }

    fn app() -> Router {
        app_with(ServerConfig::default()).1
    }

    fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value, header::HeaderMap) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body, headers)
    }

    async fn create_ring(app: &Router, token: &str) -> Value {
        let (status, body, _) = send(
            app,
            request(
                Method::POST,
                "/jewelleries",
                Some(token),
                Some(json!({ "type": "ring", "collection": "Aurora", "material": "gold" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body, _) = send(&app(), request(Method::GET, "/v1/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn info_endpoint() {
        let (status, body, _) = send(&app(), request(Method::GET, "/v1/info", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["collection"], "jewelleries");
        assert_eq!(body["counterKey"], "jewellery.serial_number");
    }

    #[tokio::test]
    async fn catalog_routes_require_a_known_token() {
        let app = app();
        let (status, body, _) = send(&app, request(Method::GET, "/jewelleries", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["message"].as_str().unwrap().contains("missing"));

        let (status, _, _) =
            send(&app, request(Method::GET, "/jewelleries", Some("forged"), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_answers_201_with_location() {
        let app = app();
        let (status, body, headers) = send(
            &app,
            request(
                Method::POST,
                "/jewelleries",
                Some(ALICE),
                Some(json!({ "type": "ring", "collection": "Aurora", "serialNumber": 99 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["serialNumber"], 1);
        assert_eq!(body["ownerId"], "alice");
        let id = body["id"].as_str().unwrap();
        assert_eq!(headers[header::LOCATION], format!("/jewelleries/{id}").as_str());
    }

    #[tokio::test]
    async fn owner_reads_and_others_are_forbidden() {
        let app = app();
        let created = create_ring(&app, ALICE).await;
        let uri = format!("/jewelleries/{}", created["id"].as_str().unwrap());

        let (status, body, _) = send(&app, request(Method::GET, &uri, Some(ALICE), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, created);

        let (status, body, _) = send(&app, request(Method::GET, &uri, Some(BOB), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["message"].as_str().unwrap().contains("access denied"));
    }

    #[tokio::test]
    async fn concealed_denial_is_404() {
        let config = ServerConfig {
            gate: rudby_gate::GateConfig::information_hiding(),
            ..ServerConfig::default()
        };
        let (_, app) = app_with(config);
        let created = create_ring(&app, ALICE).await;
        let uri = format!("/jewelleries/{}", created["id"].as_str().unwrap());

        let (status, _, _) = send(&app, request(Method::GET, &uri, Some(BOB), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, listing, _) = send(&app, request(Method::GET, "/jewelleries", Some(BOB), None)).await;
        assert_eq!(listing, json!([]));
    }

    #[tokio::test]
    async fn concealed_finds_and_deletes_answer_like_misses() {
        let config = ServerConfig {
            gate: rudby_gate::GateConfig::information_hiding(),
            ..ServerConfig::default()
        };
        let (_, app) = app_with(config);
        let created = create_ring(&app, ALICE).await;
        let hidden_id = created["id"].as_str().unwrap().to_string();

        for (hidden, missing, shape) in [
            ("ring", "tiara", "by-type"),
            ("Aurora", "Nope", "by-collection"),
        ] {
            let (hidden_status, hidden_body, _) = send(
                &app,
                request(Method::GET, &format!("/jewelleries/{shape}/{hidden}"), Some(BOB), None),
            )
            .await;
            let (missing_status, missing_body, _) = send(
                &app,
                request(Method::GET, &format!("/jewelleries/{shape}/{missing}"), Some(BOB), None),
            )
            .await;
            assert_eq!(hidden_status, StatusCode::NOT_FOUND);
            assert_eq!(missing_status, StatusCode::NOT_FOUND);
            assert_eq!(
                hidden_body["message"].as_str().unwrap().replace(hidden, missing),
                missing_body["message"].as_str().unwrap()
            );
            assert!(!hidden_body.to_string().contains(&hidden_id));
        }

        let absent_id = rudby_types::RecordId::new().to_string();
        for id in [&hidden_id, &absent_id] {
            let (status, body, _) = send(
                &app,
                request(Method::DELETE, &format!("/jewelleries/{id}"), Some(BOB), None),
            )
            .await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, json!({ "message": format!("not found: record {id}") }));
        }

        // the owner still sees it
        let (status, _, _) = send(
            &app,
            request(Method::GET, &format!("/jewelleries/{hidden_id}"), Some(ALICE), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_id_and_body_are_400() {
        let app = app();
        let (status, _, _) =
            send(&app, request(Method::GET, "/jewelleries/not-a-uuid", Some(ALICE), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let req = Request::builder()
            .method(Method::POST)
            .uri("/jewelleries")
            .header(header::AUTHORIZATION, format!("Bearer {ALICE}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn update_keeps_serial_and_owner() {
        let app = app();
        let created = create_ring(&app, ALICE).await;
        let uri = format!("/jewelleries/{}", created["id"].as_str().unwrap());

        let (status, body, _) = send(
            &app,
            request(
                Method::PUT,
                &uri,
                Some(ALICE),
                Some(json!({ "type": "brooch", "collection": "Borealis", "ownerId": "bob" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "brooch");
        assert_eq!(body["ownerId"], "alice");
        assert_eq!(body["serialNumber"], created["serialNumber"]);

        let (status, _, _) = send(
            &app,
            request(Method::PUT, &uri, Some(BOB), Some(json!({ "type": "stolen" }))),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn delete_then_404() {
        let app = app();
        let created = create_ring(&app, ALICE).await;
        let uri = format!("/jewelleries/{}", created["id"].as_str().unwrap());

        let (status, _, _) = send(&app, request(Method::DELETE, &uri, Some(BOB), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body, _) = send(&app, request(Method::DELETE, &uri, Some(ALICE), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "deleted": true }));

        let (status, _, _) = send(&app, request(Method::DELETE, &uri, Some(ALICE), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _, _) = send(&app, request(Method::GET, &uri, Some(ALICE), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn finds_and_listing() {
        let app = app();
        create_ring(&app, ALICE).await;
        create_ring(&app, BOB).await;

        let (status, listing, _) =
            send(&app, request(Method::GET, "/jewelleries", Some(BOB), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listing.as_array().unwrap().len(), 2);

        let (status, found, _) = send(
            &app,
            request(Method::GET, "/jewelleries/by-type/ring", Some(ALICE), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["serialNumber"], 1);

        // first match belongs to alice
        let (status, _, _) = send(
            &app,
            request(Method::GET, "/jewelleries/by-collection/Aurora", Some(BOB), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, _) = send(
            &app,
            request(Method::GET, "/jewelleries/by-type/tiara", Some(ALICE), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn closed_store_is_503() {
        let (store, app) = app_with(ServerConfig::default());
        store.close().await.unwrap();
        let (status, _, _) =
            send(&app, request(Method::GET, "/jewelleries", Some(ALICE), None)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let (status, _, _) = send(
            &app,
            request(Method::POST, "/jewelleries", Some(ALICE), Some(json!({ "type": "ring" }))),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn exhausted_serial_counter_is_500() {
        let (store, app) = app_with(ServerConfig::default());
        store.set_counter("jewellery.serial_number", u64::MAX).unwrap();
        let (status, body, _) = send(
            &app,
            request(Method::POST, "/jewelleries", Some(ALICE), Some(json!({ "type": "ring" }))),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["message"].as_str().unwrap().contains("allocation failed"));
        let (_, listing, _) = send(&app, request(Method::GET, "/jewelleries", Some(ALICE), None)).await;
        assert_eq!(listing, json!([]));
    }
}
