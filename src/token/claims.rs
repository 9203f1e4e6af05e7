// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claim schema.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Current claim schema version.
///
/// Embedded in every issued token and checked on decode; tokens carrying
/// an unknown version are rejected rather than best-effort parsed.
pub const CLAIMS_VERSION: u8 = 1;

/// Token kind discriminator.
///
/// Access tokens prove identity for a single request window; refresh
/// tokens are redeemable exactly once for a new pair and carry a `jti`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived, self-contained bearer credential
    Access,
    /// Long-lived credential tracked server-side by session identifier
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims embedded in every token the authority issues.
///
/// The schema is fixed and versioned: decoding rejects claim sets with a
/// missing or unknown `v`, and refresh claims without a `jti`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Claim schema version
    pub v: u8,

    /// Subject (username)
    pub sub: String,

    /// Token kind
    pub kind: TokenKind,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp, absolute)
    pub exp: i64,

    /// Session identifier, present on refresh tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    /// Session identifier of a refresh claim, if present.
    pub fn session_id(&self) -> Option<&str> {
        self.jti.as_deref()
    }
}
