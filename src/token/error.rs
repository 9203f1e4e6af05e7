// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token codec errors.
//!
//! The decode failure modes are deliberately distinguishable so the
//! authority can apply different policies: an expired access token is
//! simply rejected, while an expired refresh token is rejected but its
//! ledger entry is still revoked where recoverable.

/// Token encoding/decoding error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Token is not a structurally valid JWT
    #[error("token is malformed")]
    Malformed,

    /// Signature does not verify against the shared secret
    #[error("token signature is invalid")]
    BadSignature,

    /// Embedded expiry is in the past
    #[error("token has expired")]
    Expired,

    /// Claims carry an unknown schema version
    #[error("unsupported claims version {0}")]
    UnsupportedVersion(u8),

    /// Refresh claims without a session identifier
    #[error("refresh token is missing a session identifier")]
    MissingSessionId,

    /// Token could not be signed (issuance only)
    #[error("token could not be signed: {0}")]
    Signing(String),
}
