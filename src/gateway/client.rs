// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verification client for the authentication authority.

use std::time::Duration;

use crate::models::{VerifiedIdentity, VerifyRequest, VerifyResponse};

use super::error::GatewayAuthError;

/// Answer from the authority's verify endpoint.
#[derive(Debug)]
pub enum VerifyReply {
    /// Token verified; trusted identity for downstream propagation
    Valid(VerifiedIdentity),
    /// The authority rejected the token (with its reason)
    Invalid(String),
}

/// HTTP client for the authority's verify operation.
///
/// Every call carries an explicit timeout; a timeout or connection
/// failure is an outage (`AuthServiceUnavailable`), never a verdict on
/// the token.
#[derive(Clone)]
pub struct AuthClient {
    base_url: String,
    client: reqwest::Client,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Base URL of the authority this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the authority whether an access token is valid.
    pub async fn verify(&self, token: &str) -> Result<VerifyReply, GatewayAuthError> {
        let response = self
            .client
            .post(format!("{}/auth/verify", self.base_url))
            .json(&VerifyRequest {
                token: token.to_string(),
            })
            .send()
            .await
            .map_err(|e| GatewayAuthError::AuthServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            // The authority understood the request and said no
            return Err(GatewayAuthError::InvalidToken(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(GatewayAuthError::AuthServiceUnavailable(format!(
                "HTTP {status} from verify endpoint"
            )));
        }

        let body: VerifyResponse = response
            .json()
            .await
            .map_err(|e| GatewayAuthError::AuthServiceUnavailable(e.to_string()))?;

        match (body.valid, body.user) {
            (true, Some(user)) => Ok(VerifyReply::Valid(user.into())),
            _ => Ok(VerifyReply::Invalid(
                body.message.unwrap_or_else(|| "token invalid".to_string()),
            )),
        }
    }
}
