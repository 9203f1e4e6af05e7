// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use crate::authority::AuthService;
use crate::gateway::AuthClient;

/// Shared state of the authentication authority.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(auth: AuthService) -> Self {
        Self {
            auth: Arc::new(auth),
        }
    }
}

/// Shared state of the gateway.
#[derive(Clone)]
pub struct GatewayState {
    /// Verification client for the authentication authority
    pub verifier: AuthClient,
    /// Base URL of the business service protected requests forward to
    pub backend_url: String,
    /// Client used for forwarding, with the same downstream timeout
    pub http: reqwest::Client,
}

impl GatewayState {
    pub fn new(auth_url: impl Into<String>, backend_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            verifier: AuthClient::new(auth_url, timeout),
            backend_url: backend_url.into(),
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }
}
