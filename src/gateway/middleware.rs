// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gateway verification middleware.
//!
//! Every protected inbound request passes through here: extract the
//! bearer token, ask the authority to verify it, and attach the
//! resulting [`VerifiedIdentity`] to the request before it is forwarded
//! downstream.
//!
//! Client-supplied identity headers are stripped unconditionally, first,
//! so an external caller can never impersonate the gateway's trusted
//! enrichment.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::state::GatewayState;

use super::client::VerifyReply;
use super::error::GatewayAuthError;

/// Trusted identity headers the gateway attaches for downstream
/// services. Only the gateway may set these.
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USERNAME_HEADER: &str = "x-username";
pub const USER_ROLE_HEADER: &str = "x-user-role";

const IDENTITY_HEADERS: [&str; 3] = [USER_ID_HEADER, USERNAME_HEADER, USER_ROLE_HEADER];

/// Authentication middleware for protected gateway routes.
///
/// A missing or malformed `Authorization` header rejects immediately,
/// before any network call to the authority is made.
pub async fn require_auth(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Response {
    for header in IDENTITY_HEADERS {
        request.headers_mut().remove(header);
    }

    let auth_header = match request.headers().get(AUTHORIZATION) {
        Some(header) => header,
        None => return GatewayAuthError::MissingAuthHeader.into_response(),
    };

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(_) => return GatewayAuthError::InvalidAuthHeader.into_response(),
    };

    let token = match auth_str.strip_prefix("Bearer ") {
        Some(t) => t.trim(),
        None => return GatewayAuthError::InvalidAuthHeader.into_response(),
    };
    if token.is_empty() {
        return GatewayAuthError::InvalidAuthHeader.into_response();
    }

    match state.verifier.verify(token).await {
        Ok(VerifyReply::Valid(identity)) => {
            tracing::debug!(username = %identity.username, "request authenticated");
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Ok(VerifyReply::Invalid(message)) => {
            GatewayAuthError::InvalidToken(message).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "authority verification call failed");
            e.into_response()
        }
    }
}
