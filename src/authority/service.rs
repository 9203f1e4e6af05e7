// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication authority orchestration.
//!
//! Wires the credential verifier, token codec and refresh-token ledger
//! into the four session-lifecycle operations: login, verify, refresh,
//! logout.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::directory::{UserDirectory, UserRecord};
use crate::ledger::{LedgerError, RefreshTokenLedger, SessionRecord, SessionStatus};
use crate::models::PublicUser;
use crate::token::{Claims, TokenCodec, TokenError, TokenKind};

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone)]
pub struct IssuedTokenPair {
    pub access_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Outcome of access-token verification.
///
/// Verification is a query: an invalid token is a negative answer with
/// a reason, never an error.
#[derive(Debug)]
pub enum VerifyOutcome {
    Valid { user: PublicUser, claims: Claims },
    Invalid { message: String },
}

/// Failures of the command operations (login, refresh, logout).
#[derive(Debug, thiserror::Error)]
pub enum AuthFlowError {
    /// Uniform for unknown user and wrong password
    #[error("incorrect credentials")]
    BadCredentials,

    /// Refresh token failed signature or schema checks
    #[error("refresh token invalid")]
    RefreshInvalid,

    /// Refresh token's embedded expiry has passed
    #[error("refresh token expired, please log in again")]
    RefreshExpired,

    /// Session not found, revoked, or expired per the ledger. The
    /// message deliberately does not say which, so callers cannot probe
    /// ledger state.
    #[error("refresh token revoked or expired")]
    RefreshRejected,

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("token issuance failed: {0}")]
    Issuance(TokenError),
}

/// The authentication authority.
pub struct AuthService {
    pub directory: Arc<RwLock<UserDirectory>>,
    pub ledger: Arc<RefreshTokenLedger>,
    codec: TokenCodec,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl AuthService {
    pub fn new(
        directory: UserDirectory,
        ledger: RefreshTokenLedger,
        secret: &[u8],
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            directory: Arc::new(RwLock::new(directory)),
            ledger: Arc::new(ledger),
            codec: TokenCodec::new(secret),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Verify credentials and issue a token pair plus the public profile.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(IssuedTokenPair, PublicUser), AuthFlowError> {
        let (user, public) = {
            let directory = self.directory.read().await;
            let user = directory
                .verify_credentials(username, password)
                .ok_or(AuthFlowError::BadCredentials)?;
            (user.clone(), user.public())
        };

        let (pair, record) = self.mint_pair(&user)?;
        self.ledger.record(&record)?;

        tracing::info!(username = %user.username, session_id = %record.session_id, "login succeeded");
        Ok((pair, public))
    }

    /// Verify an access token.
    ///
    /// Requires `kind = access` and re-checks that the subject still
    /// exists in the directory, so verification fails immediately after
    /// a user is deleted even though the token has not expired.
    pub async fn verify(&self, token: &str) -> VerifyOutcome {
        let claims = match self.codec.decode(token) {
            Ok(claims) => claims,
            Err(TokenError::Expired) => return invalid("token expired"),
            Err(TokenError::BadSignature) => return invalid("token signature invalid"),
            Err(_) => return invalid("token invalid"),
        };

        if claims.kind != TokenKind::Access {
            return invalid("token invalid (kind)");
        }

        let directory = self.directory.read().await;
        match directory.find_by_username(&claims.sub) {
            Some(user) => VerifyOutcome::Valid {
                user: user.public(),
                claims,
            },
            None => invalid("user no longer exists"),
        }
    }

    /// Redeem a refresh token for a new pair, rotating the session.
    ///
    /// A refresh token can be redeemed at most once: rotation revokes
    /// the presented session and records the replacement atomically, so
    /// redeeming a stale token fails even before it naturally expires.
    pub async fn refresh(&self, token: &str) -> Result<IssuedTokenPair, AuthFlowError> {
        let claims = match self.codec.decode(token) {
            Ok(claims) => claims,
            Err(TokenError::Expired) => {
                // Defense in depth: the token no longer grants anything,
                // but its ledger entry is still closed where recoverable.
                if let Ok(stale) = self.codec.decode_for_revocation(token) {
                    if stale.kind == TokenKind::Refresh {
                        if let Some(session_id) = stale.session_id() {
                            self.ledger.revoke(session_id)?;
                            tracing::info!(session_id, "revoked expired refresh session");
                        }
                    }
                }
                return Err(AuthFlowError::RefreshExpired);
            }
            Err(_) => return Err(AuthFlowError::RefreshInvalid),
        };

        if claims.kind != TokenKind::Refresh {
            return Err(AuthFlowError::RefreshInvalid);
        }
        let session_id = claims.session_id().ok_or(AuthFlowError::RefreshInvalid)?;

        if self.ledger.status(session_id)? != SessionStatus::Active {
            tracing::warn!(session_id, "refresh with inactive session rejected");
            return Err(AuthFlowError::RefreshRejected);
        }

        let user = {
            let directory = self.directory.read().await;
            directory.find_by_username(&claims.sub).cloned()
        };
        let Some(user) = user else {
            // Owner vanished since issuance; close the session and reject
            self.ledger.revoke(session_id)?;
            return Err(AuthFlowError::RefreshRejected);
        };

        let (pair, record) = self.mint_pair(&user)?;
        if !self.ledger.rotate(session_id, &record)? {
            // Lost a rotation race, or the token was already redeemed.
            // Either way this presentation is treated as potential reuse.
            tracing::warn!(session_id, "refresh token reuse detected, rejecting");
            return Err(AuthFlowError::RefreshRejected);
        }

        tracing::info!(
            username = %user.username,
            old_session = session_id,
            new_session = %record.session_id,
            "refresh session rotated"
        );
        Ok(pair)
    }

    /// Revoke the session behind a refresh token.
    ///
    /// Always succeeds from the caller's point of view: unknown,
    /// expired, malformed-beyond-recovery and already-revoked tokens
    /// all ack, so logout is safe to retry or call redundantly.
    pub async fn logout(&self, token: &str) -> Result<(), AuthFlowError> {
        let claims = match self.codec.decode(token) {
            Ok(claims) => claims,
            Err(TokenError::Expired) => match self.codec.decode_for_revocation(token) {
                Ok(claims) => claims,
                Err(_) => return Ok(()),
            },
            Err(_) => return Ok(()),
        };

        if claims.kind == TokenKind::Refresh {
            if let Some(session_id) = claims.session_id() {
                self.ledger.revoke(session_id)?;
                tracing::info!(session_id, "logout revoked session");
            }
        }
        Ok(())
    }

    /// Issue a pair without touching the ledger; the caller decides
    /// whether the session is recorded directly (login) or via rotation
    /// (refresh).
    fn mint_pair(&self, user: &UserRecord) -> Result<(IssuedTokenPair, SessionRecord), AuthFlowError> {
        let (access_token, access_expires_at) = self
            .codec
            .issue(&user.username, TokenKind::Access, self.access_ttl, None)
            .map_err(AuthFlowError::Issuance)?;

        let session_id = Uuid::new_v4().simple().to_string();
        let (refresh_token, refresh_expires_at) = self
            .codec
            .issue(
                &user.username,
                TokenKind::Refresh,
                self.refresh_ttl,
                Some(session_id.clone()),
            )
            .map_err(AuthFlowError::Issuance)?;

        let record = SessionRecord {
            session_id,
            user_id: user.id.clone(),
            created_at: Utc::now(),
            expires_at: refresh_expires_at,
            revoked: false,
        };

        let pair = IssuedTokenPair {
            access_token,
            access_expires_at,
            refresh_token,
            refresh_expires_at,
        };
        Ok((pair, record))
    }
}

fn invalid(message: &str) -> VerifyOutcome {
    VerifyOutcome::Invalid {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::SessionStatus;
    use tempfile::TempDir;

    fn service() -> (AuthService, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let ledger = RefreshTokenLedger::open(&dir.path().join("ledger.redb")).unwrap();
        let service = AuthService::new(
            UserDirectory::with_demo_users(),
            ledger,
            b"test-secret",
            Duration::minutes(15),
            Duration::days(7),
        );
        (service, dir)
    }

    fn session_id_of(refresh_token: &str) -> String {
        TokenCodec::new(b"test-secret")
            .decode(refresh_token)
            .unwrap()
            .session_id()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn login_then_verify_returns_same_subject() {
        let (service, _dir) = service();
        let (pair, user) = service.login("admin", "admin123").await.unwrap();

        assert_eq!(user.username, "admin");
        assert!(pair.access_expires_at > Utc::now());

        match service.verify(&pair.access_token).await {
            VerifyOutcome::Valid { user, claims } => {
                assert_eq!(user.username, "admin");
                assert_eq!(claims.sub, "admin");
            }
            VerifyOutcome::Invalid { message } => panic!("expected valid, got: {message}"),
        }
    }

    #[tokio::test]
    async fn login_failure_is_uniform() {
        let (service, _dir) = service();
        let unknown = service.login("nobody", "admin123").await.unwrap_err();
        let wrong = service.login("admin", "wrong").await.unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn verify_rejects_refresh_tokens() {
        let (service, _dir) = service();
        let (pair, _) = service.login("admin", "admin123").await.unwrap();
        match service.verify(&pair.refresh_token).await {
            VerifyOutcome::Invalid { message } => assert!(message.contains("kind")),
            VerifyOutcome::Valid { .. } => panic!("refresh token must not verify"),
        }
    }

    #[tokio::test]
    async fn verify_fails_after_user_deleted() {
        let (service, _dir) = service();
        let (pair, _) = service.login("maxim", "maxim").await.unwrap();

        service.directory.write().await.remove("maxim");

        match service.verify(&pair.access_token).await {
            VerifyOutcome::Invalid { message } => assert!(message.contains("no longer exists")),
            VerifyOutcome::Valid { .. } => panic!("deleted user must not verify"),
        }
    }

    #[tokio::test]
    async fn verify_never_errors_on_garbage() {
        let (service, _dir) = service();
        assert!(matches!(
            service.verify("garbage").await,
            VerifyOutcome::Invalid { .. }
        ));
    }

    #[tokio::test]
    async fn refresh_rotates_and_rejects_reuse() {
        let (service, _dir) = service();
        let (pair, _) = service.login("admin", "admin123").await.unwrap();
        let original_session = session_id_of(&pair.refresh_token);
        assert_eq!(
            service.ledger.status(&original_session).unwrap(),
            SessionStatus::Active
        );

        // First redemption succeeds and revokes the original session
        let rotated = service.refresh(&pair.refresh_token).await.unwrap();
        assert_eq!(
            service.ledger.status(&original_session).unwrap(),
            SessionStatus::Revoked
        );

        // Second redemption of the original token always fails
        let err = service.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthFlowError::RefreshRejected));

        // The rotated pair works exactly once more
        service.refresh(&rotated.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn logout_then_refresh_fails() {
        let (service, _dir) = service();
        let (pair, _) = service.login("admin", "admin123").await.unwrap();

        service.logout(&pair.refresh_token).await.unwrap();
        // Logout is idempotent
        service.logout(&pair.refresh_token).await.unwrap();

        let err = service.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthFlowError::RefreshRejected));
    }

    #[tokio::test]
    async fn logout_acks_garbage_tokens() {
        let (service, _dir) = service();
        service.logout("garbage").await.unwrap();
    }

    #[tokio::test]
    async fn refresh_with_access_token_is_invalid() {
        let (service, _dir) = service();
        let (pair, _) = service.login("admin", "admin123").await.unwrap();
        let err = service.refresh(&pair.access_token).await.unwrap_err();
        assert!(matches!(err, AuthFlowError::RefreshInvalid));
    }

    #[tokio::test]
    async fn refresh_with_foreign_signature_is_invalid() {
        let (service, _dir) = service();
        let foreign = TokenCodec::new(b"another-secret");
        let (token, _) = foreign
            .issue("admin", TokenKind::Refresh, Duration::days(7), Some("x".into()))
            .unwrap();
        let err = service.refresh(&token).await.unwrap_err();
        assert!(matches!(err, AuthFlowError::RefreshInvalid));
    }

    #[tokio::test]
    async fn expired_refresh_is_rejected_and_session_closed() {
        let dir = TempDir::new().expect("temp dir");
        let ledger = RefreshTokenLedger::open(&dir.path().join("ledger.redb")).unwrap();
        // Refresh TTL in the past so the issued token is already expired
        let service = AuthService::new(
            UserDirectory::with_demo_users(),
            ledger,
            b"test-secret",
            Duration::minutes(15),
            Duration::minutes(-5),
        );

        let (pair, _) = service.login("admin", "admin123").await.unwrap();
        let session_id = session_id_of_expired(&pair.refresh_token);

        let err = service.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthFlowError::RefreshExpired));
        assert_eq!(
            service.ledger.status(&session_id).unwrap(),
            SessionStatus::Revoked
        );
    }

    fn session_id_of_expired(refresh_token: &str) -> String {
        TokenCodec::new(b"test-secret")
            .decode_for_revocation(refresh_token)
            .unwrap()
            .session_id()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn refresh_after_user_deleted_revokes_session() {
        let (service, _dir) = service();
        let (pair, _) = service.login("maxim", "maxim").await.unwrap();
        let session_id = session_id_of(&pair.refresh_token);

        service.directory.write().await.remove("maxim");

        let err = service.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthFlowError::RefreshRejected));
        assert_eq!(
            service.ledger.status(&session_id).unwrap(),
            SessionStatus::Revoked
        );
    }

    #[tokio::test]
    async fn concurrent_refreshes_have_exactly_one_winner() {
        let (service, _dir) = service();
        let (pair, user) = service.login("admin", "admin123").await.unwrap();
        let service = Arc::new(service);

        let a = {
            let service = Arc::clone(&service);
            let token = pair.refresh_token.clone();
            tokio::spawn(async move { service.refresh(&token).await })
        };
        let b = {
            let service = Arc::clone(&service);
            let token = pair.refresh_token.clone();
            tokio::spawn(async move { service.refresh(&token).await })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert!(
            a.is_ok() ^ b.is_ok(),
            "exactly one concurrent refresh must win"
        );

        // The ledger ends with exactly one new active session for the user
        let active: Vec<_> = service
            .ledger
            .sessions_for_user(&user.id)
            .unwrap()
            .into_iter()
            .filter(|row| !row.revoked)
            .collect();
        assert_eq!(active.len(), 1);
    }
}
