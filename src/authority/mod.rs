// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Authority
//!
//! Exposes the four session-lifecycle operations over HTTP/JSON:
//!
//! - `POST /auth/login` — credentials → token pair + profile
//! - `POST /auth/verify` — access token → verification query result
//! - `POST /auth/refresh` — refresh token → rotated token pair
//! - `POST /auth/logout` — refresh token → idempotent revocation

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::models::{
    AckResponse, HealthResponse, LoginRequest, LoginResponse, LogoutRequest, PublicUser,
    RefreshRequest, RefreshResponse, Role, VerifyRequest, VerifyResponse,
};
use crate::state::AppState;
use crate::token::{Claims, TokenKind};

pub mod handlers;
pub mod service;

pub use service::{AuthFlowError, AuthService, IssuedTokenPair, VerifyOutcome};

pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/login", post(handlers::login))
        .route("/auth/verify", post(handlers::verify))
        .route("/auth/refresh", post(handlers::refresh))
        .route("/auth/logout", post(handlers::logout))
        .route("/health", get(handlers::health))
        .with_state(state);

    Router::new()
        .merge(auth_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login,
        handlers::verify,
        handlers::refresh,
        handlers::logout,
        handlers::health
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            VerifyRequest,
            VerifyResponse,
            RefreshRequest,
            RefreshResponse,
            LogoutRequest,
            AckResponse,
            HealthResponse,
            PublicUser,
            Role,
            Claims,
            TokenKind
        )
    ),
    tags(
        (name = "Auth", description = "Session lifecycle: login, verify, refresh, logout"),
        (name = "Health", description = "Liveness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::directory::UserDirectory;
    use crate::ledger::RefreshTokenLedger;

    fn test_state() -> (AppState, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let ledger = RefreshTokenLedger::open(&dir.path().join("ledger.redb")).unwrap();
        let service = AuthService::new(
            UserDirectory::with_demo_users(),
            ledger,
            b"test-secret",
            chrono::Duration::minutes(15),
            chrono::Duration::days(7),
        );
        (AppState::new(service), dir)
    }

    fn post_json(path: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let (state, _dir) = test_state();
        let app = router(state);
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn login_missing_fields_is_400() {
        let (state, _dir) = test_state();
        let response = router(state)
            .oneshot(post_json("/auth/login", serde_json::json!({"username": "admin", "password": ""})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_absent_field_is_400_not_422() {
        let (state, _dir) = test_state();
        let response = router(state)
            .oneshot(post_json("/auth/login", serde_json::json!({"username": "admin"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn refresh_empty_body_is_400() {
        let (state, _dir) = test_state();
        let response = router(state)
            .oneshot(post_json("/auth/refresh", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_bad_credentials_is_401() {
        let (state, _dir) = test_state();
        let response = router(state)
            .oneshot(post_json(
                "/auth/login",
                serde_json::json!({"username": "admin", "password": "nope"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn full_session_lifecycle_over_http() {
        let (state, _dir) = test_state();
        let app = router(state);

        // Login
        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/login",
                serde_json::json!({"username": "admin", "password": "admin123"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let login = json_body(response).await;
        assert_eq!(login["user"]["username"], "admin");
        assert_eq!(login["user"]["role"], "admin");
        let access_token = login["access_token"].as_str().unwrap().to_string();
        let refresh_token = login["refresh_token"].as_str().unwrap().to_string();

        // Verify the fresh access token
        let response = app
            .clone()
            .oneshot(post_json("/auth/verify", serde_json::json!({"token": access_token})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let verify = json_body(response).await;
        assert_eq!(verify["valid"], true);
        assert_eq!(verify["payload"]["sub"], "admin");
        assert_eq!(verify["payload"]["kind"], "access");

        // Rotate
        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/refresh",
                serde_json::json!({"refresh_token": refresh_token}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let rotated = json_body(response).await;
        assert!(rotated["refresh_token"].as_str().unwrap() != refresh_token);
        assert!(rotated.get("user").is_none());

        // Replay of the original refresh token is rejected
        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/refresh",
                serde_json::json!({"refresh_token": refresh_token}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Logout with the rotated token, then refresh fails
        let new_refresh = rotated["refresh_token"].as_str().unwrap().to_string();
        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/logout",
                serde_json::json!({"refresh_token": new_refresh}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(post_json(
                "/auth/refresh",
                serde_json::json!({"refresh_token": new_refresh}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn verify_tampered_token_is_200_invalid() {
        let (state, _dir) = test_state();
        let response = router(state)
            .oneshot(post_json(
                "/auth/verify",
                serde_json::json!({"token": "aaa.bbb.ccc"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["valid"], false);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn health_reports_service_name() {
        let (state, _dir) = test_state();
        let response = router(state)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["service"], "auth_authority");
    }
}
