// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Gateway
//!
//! Single entry point for clients. Auth-lifecycle routes pass through
//! to the authority unauthenticated; everything under `/gateway/api`
//! requires a verified access token.
//!
//! ## Request Flow
//!
//! 1. Client sends `Authorization: Bearer <access token>`
//! 2. The verification middleware strips any client-supplied identity
//!    headers, extracts the bearer token, and calls the authority's
//!    verify endpoint (missing/malformed header rejects before any
//!    network call)
//! 3. On success the request gains a `VerifiedIdentity` and is forwarded
//!    to the business service with trusted `x-user-*` headers
//! 4. The downstream response is relayed unchanged; timeouts and
//!    connection failures surface as 503, never as 401

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::models::HealthResponse;
use crate::state::GatewayState;

pub mod client;
pub mod error;
pub mod middleware;
pub mod proxy;

pub use client::{AuthClient, VerifyReply};
pub use error::GatewayAuthError;

pub fn router(state: GatewayState) -> Router {
    let protected = Router::new()
        .fallback(proxy::forward_api)
        .layer(from_fn_with_state(state.clone(), middleware::require_auth));

    Router::new()
        .route("/gateway/auth/login", post(proxy::forward_auth))
        .route("/gateway/auth/refresh", post(proxy::forward_auth))
        .route("/gateway/auth/logout", post(proxy::forward_auth))
        .nest("/gateway/api", protected)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "api_gateway".to_string(),
    })
}
