// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 token codec.
//!
//! Stateless: validity of anything this codec decodes is determined by
//! the signature and the embedded expiry alone. The trust boundary is
//! the shared signing secret.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::{Claims, TokenKind, CLAIMS_VERSION};
use super::error::TokenError;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Encodes and decodes signed access/refresh tokens.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenCodec {
    /// Create a codec over the shared HS256 secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a signed token.
    ///
    /// Returns the encoded token and its absolute expiry. The expiry is
    /// embedded in the token, not kept as server state. `session_id` is
    /// required for refresh tokens and rejected for access tokens.
    pub fn issue(
        &self,
        subject: &str,
        kind: TokenKind,
        ttl: Duration,
        session_id: Option<String>,
    ) -> Result<(String, DateTime<Utc>), TokenError> {
        match (kind, &session_id) {
            (TokenKind::Refresh, None) => return Err(TokenError::MissingSessionId),
            (TokenKind::Access, Some(_)) => return Err(TokenError::Malformed),
            _ => {}
        }

        let now = Utc::now();
        let expires_at = now + ttl;
        let claims = Claims {
            v: CLAIMS_VERSION,
            sub: subject.to_string(),
            kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: session_id,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        // Report the expiry at the same second precision embedded in the token
        let expires_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or(expires_at);

        Ok((token, expires_at))
    }

    /// Decode and fully validate a token (signature + expiry + schema).
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        self.decode_with(token, &validation)
    }

    /// Decode a token with expiry validation disabled.
    ///
    /// This exists solely so the authority can recover the session
    /// identifier from an *expired* refresh token in order to mark it
    /// revoked. The signature and claim schema are still verified. The
    /// result must never be used to grant access.
    pub fn decode_for_revocation(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_exp = false;
        self.decode_with(token, &validation)
    }

    fn decode_with(&self, token: &str, validation: &Validation) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            }
        })?;

        let claims = data.claims;

        // Schema validation: reject unknown versions and refresh claims
        // without a session identifier instead of defaulting silently.
        if claims.v != CLAIMS_VERSION {
            return Err(TokenError::UnsupportedVersion(claims.v));
        }
        if claims.kind == TokenKind::Refresh && claims.jti.is_none() {
            return Err(TokenError::MissingSessionId);
        }

        Ok(claims)
    }
}
