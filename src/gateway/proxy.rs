// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request forwarding toward the authority and the business service.
//!
//! The downstream response is relayed unchanged apart from transport
//! error translation: a timeout or connection failure becomes 503, so
//! an outage is never reported to the client as an authentication
//! failure.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HOST},
        HeaderMap, Method, StatusCode, Uri,
    },
    response::Response,
    Extension,
};

use crate::error::ApiError;
use crate::models::VerifiedIdentity;
use crate::state::GatewayState;

use super::middleware::{USERNAME_HEADER, USER_ID_HEADER, USER_ROLE_HEADER};

/// Cap on forwarded request/response bodies (2 MiB).
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Forward a protected request to the business service.
///
/// Runs behind [`super::middleware::require_auth`], so the request
/// carries a [`VerifiedIdentity`] which is attached as trusted
/// `x-user-*` headers. The business service must only accept these
/// fields from the gateway boundary, never from external clients.
pub async fn forward_api(
    State(state): State<GatewayState>,
    Extension(identity): Extension<VerifiedIdentity>,
    request: Request,
) -> Result<Response, ApiError> {
    let target = backend_target(&state.backend_url, request.uri());
    forward(&state, request, &target, Some(&identity)).await
}

/// Forward an unauthenticated auth-lifecycle request to the authority.
///
/// Login, refresh and logout pass through the gateway untouched; the
/// gateway adds nothing but transport error translation on these
/// routes.
pub async fn forward_auth(
    State(state): State<GatewayState>,
    request: Request,
) -> Result<Response, ApiError> {
    let path = request.uri().path();
    let suffix = path.strip_prefix("/gateway").unwrap_or(path);
    let target = format!("{}{}", state.verifier.base_url(), suffix);
    forward(&state, request, &target, None).await
}

/// Map the inbound URI onto the business service.
fn backend_target(backend_url: &str, uri: &Uri) -> String {
    let path = uri.path();
    let path = path.strip_prefix("/gateway/api").unwrap_or(path);
    match uri.query() {
        Some(query) => format!("{backend_url}{path}?{query}"),
        None => format!("{backend_url}{path}"),
    }
}

async fn forward(
    state: &GatewayState,
    request: Request,
    target: &str,
    identity: Option<&VerifiedIdentity>,
) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    let body_bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| ApiError::bad_request("request body too large"))?;

    let mut outbound = state.http.request(parts.method.clone(), target);
    for (name, value) in relay_headers(&parts.headers) {
        outbound = outbound.header(name, value);
    }
    if let Some(identity) = identity {
        outbound = outbound
            .header(USER_ID_HEADER, &identity.user_id)
            .header(USERNAME_HEADER, &identity.username)
            .header(USER_ROLE_HEADER, identity.role.to_string());
    }
    if !body_bytes.is_empty() || parts.method != Method::GET {
        outbound = outbound.body(body_bytes);
    }

    let response = outbound.send().await.map_err(|e| {
        if e.is_timeout() {
            ApiError::unavailable("Service temporarily unavailable (timeout)")
        } else if e.is_connect() {
            ApiError::unavailable("Service unavailable (connection failed)")
        } else {
            ApiError::new(StatusCode::BAD_GATEWAY, format!("Downstream error: {e}"))
        }
    })?;

    let status = response.status();
    let content_type = response.headers().get(CONTENT_TYPE).cloned();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_GATEWAY, format!("Downstream error: {e}")))?;

    let mut builder = Response::builder().status(status);
    if let Some(content_type) = content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    builder
        .body(Body::from(bytes))
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// Headers copied downstream.
///
/// The bearer credential, connection metadata and anything in the
/// trusted identity namespace never pass through: identity headers are
/// set exclusively from the verified identity.
fn relay_headers(
    headers: &HeaderMap,
) -> impl Iterator<Item = (&axum::http::HeaderName, &axum::http::HeaderValue)> {
    headers.iter().filter(|(name, _)| {
        *name != AUTHORIZATION
            && *name != HOST
            && *name != CONTENT_LENGTH
            && name.as_str() != USER_ID_HEADER
            && name.as_str() != USERNAME_HEADER
            && name.as_str() != USER_ROLE_HEADER
    })
}
