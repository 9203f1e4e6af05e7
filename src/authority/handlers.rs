// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication authority endpoints.

use axum::{extract::State, http::StatusCode, Json};

use crate::error::ApiError;
use crate::models::{
    AckResponse, HealthResponse, LoginRequest, LoginResponse, LogoutRequest, RefreshRequest,
    RefreshResponse, VerifyRequest, VerifyResponse,
};
use crate::state::AppState;

use super::service::{AuthFlowError, VerifyOutcome};

impl From<AuthFlowError> for ApiError {
    fn from(err: AuthFlowError) -> Self {
        match err {
            AuthFlowError::BadCredentials
            | AuthFlowError::RefreshInvalid
            | AuthFlowError::RefreshExpired
            | AuthFlowError::RefreshRejected => ApiError::unauthorized(err.to_string()),
            AuthFlowError::Ledger(e) => {
                tracing::error!(error = %e, "ledger failure");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "session store failure")
            }
            AuthFlowError::Issuance(e) => {
                tracing::error!(error = %e, "token issuance failure");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "token issuance failure")
            }
        }
    }
}

/// Authenticate a user and issue an access/refresh token pair.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair issued", body = LoginResponse),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Incorrect credentials"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = body.username.trim();
    let password = body.password.trim();
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }

    let (pair, user) = state.auth.login(username, password).await?;
    Ok(Json(LoginResponse {
        access_token: pair.access_token,
        access_expires_at: pair.access_expires_at,
        refresh_token: pair.refresh_token,
        refresh_expires_at: pair.refresh_expires_at,
        user,
    }))
}

/// Verify an access token.
///
/// This is a query: invalid tokens answer `valid: false` with HTTP 200,
/// never an error status.
#[utoipa::path(
    post,
    path = "/auth/verify",
    tag = "Auth",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Verification result", body = VerifyResponse),
        (status = 400, description = "Missing token"),
    )
)]
pub async fn verify(
    State(state): State<AppState>,
    Json(body): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let token = body.token.trim();
    if token.is_empty() {
        return Err(ApiError::bad_request("token is required"));
    }

    let response = match state.auth.verify(token).await {
        VerifyOutcome::Valid { user, claims } => VerifyResponse {
            valid: true,
            user: Some(user),
            payload: Some(claims),
            message: None,
        },
        VerifyOutcome::Invalid { message } => VerifyResponse {
            valid: false,
            user: None,
            payload: None,
            message: Some(message),
        },
    };
    Ok(Json(response))
}

/// Redeem a refresh token for a new pair (rotation).
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "Auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = RefreshResponse),
        (status = 400, description = "Missing refresh token"),
        (status = 401, description = "Invalid, expired or revoked refresh token"),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let token = body.refresh_token.trim();
    if token.is_empty() {
        return Err(ApiError::bad_request("refresh_token is required"));
    }

    let pair = state.auth.refresh(token).await?;
    Ok(Json(RefreshResponse {
        access_token: pair.access_token,
        access_expires_at: pair.access_expires_at,
        refresh_token: pair.refresh_token,
        refresh_expires_at: pair.refresh_expires_at,
    }))
}

/// Revoke a refresh token (logout).
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Session revoked (idempotent)", body = AckResponse),
        (status = 400, description = "Missing refresh token"),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<LogoutRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let token = body.refresh_token.trim();
    if token.is_empty() {
        return Err(ApiError::bad_request("refresh_token is required"));
    }

    state.auth.logout(token).await?;
    Ok(Json(AckResponse {
        message: "logged out".to_string(),
    }))
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is alive", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "auth_authority".to_string(),
    })
}
