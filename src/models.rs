// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Domain types and wire DTOs shared across the authority and gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::token::Claims;

/// User roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Normal user
    User,
}

impl Default for Role {
    /// Default role is User (least privilege).
    fn default() -> Self {
        Role::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

/// Public view of a user, as returned by login and verify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PublicUser {
    /// Stable unique id
    pub id: String,
    /// Unique username
    pub username: String,
    /// Authorization role
    pub role: Role,
}

/// Trusted identity attached to a request after successful access-token
/// verification.
///
/// Request-scoped: produced by the gateway verification middleware,
/// consumed by the forwarding layer, discarded after.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifiedIdentity {
    /// Stable user id
    pub user_id: String,
    /// Username (token subject)
    pub username: String,
    /// Authorization role
    pub role: Role,
}

impl From<PublicUser> for VerifiedIdentity {
    fn from(user: PublicUser) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

// =============================================================================
// Request / Response DTOs
// =============================================================================

/// Request for POST /auth/login.
///
/// Fields default to empty so an absent field and a blank field are the
/// same "missing input" case (400), rather than a deserialization error.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Response for POST /auth/login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Short-lived, self-contained bearer credential
    pub access_token: String,
    /// Absolute UTC expiry of the access token
    pub access_expires_at: DateTime<Utc>,
    /// Long-lived rotating credential
    pub refresh_token: String,
    /// Absolute UTC expiry of the refresh token
    pub refresh_expires_at: DateTime<Utc>,
    /// Public profile of the authenticated user
    pub user: PublicUser,
}

/// Request for POST /auth/verify
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyRequest {
    #[serde(default)]
    pub token: String,
}

/// Response for POST /auth/verify.
///
/// Verification is a query, not a command: invalid tokens produce
/// `valid: false` with a reason message, never an HTTP error.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    pub valid: bool,
    /// Public profile of the token's subject (valid tokens only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
    /// Decoded claims (valid tokens only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Claims>,
    /// Reason the token was rejected (invalid tokens only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Request for POST /auth/refresh
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

/// Response for POST /auth/refresh — same shape as login minus `user`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Request for POST /auth/logout
#[derive(Debug, Deserialize, ToSchema)]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: String,
}

/// Generic acknowledgement response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AckResponse {
    pub message: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}
