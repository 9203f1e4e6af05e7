// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gateway authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Errors produced while authenticating a protected gateway request.
///
/// A downstream outage is deliberately distinct from a bad token: the
/// gateway must never report an unavailable authority as "invalid
/// credentials".
#[derive(Debug)]
pub enum GatewayAuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Invalid authorization header format
    InvalidAuthHeader,
    /// The authority answered: token invalid or expired
    InvalidToken(String),
    /// The authority could not be reached or failed
    AuthServiceUnavailable(String),
}

#[derive(Serialize)]
struct GatewayErrorBody {
    error: String,
    error_code: String,
}

impl GatewayAuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayAuthError::MissingAuthHeader => "missing_auth_header",
            GatewayAuthError::InvalidAuthHeader => "invalid_auth_header",
            GatewayAuthError::InvalidToken(_) => "invalid_token",
            GatewayAuthError::AuthServiceUnavailable(_) => "auth_service_unavailable",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayAuthError::MissingAuthHeader
            | GatewayAuthError::InvalidAuthHeader
            | GatewayAuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            GatewayAuthError::AuthServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl std::fmt::Display for GatewayAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayAuthError::MissingAuthHeader => write!(f, "Authorization header is required"),
            GatewayAuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            GatewayAuthError::InvalidToken(msg) => write!(f, "Token invalid or expired: {msg}"),
            GatewayAuthError::AuthServiceUnavailable(msg) => {
                write!(f, "Authentication service unavailable: {msg}")
            }
        }
    }
}

impl std::error::Error for GatewayAuthError {}

impl IntoResponse for GatewayAuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(GatewayErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
