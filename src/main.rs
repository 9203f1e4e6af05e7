// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use authgate::authority::AuthService;
use authgate::config::{
    AUTH_SERVICE_URL_ENV, BACKEND_SERVICE_URL_ENV, DATA_DIR_ENV, DEFAULT_ACCESS_TTL_SECS,
    DEFAULT_REFRESH_TTL_SECS, DEFAULT_SERVICE_TIMEOUT_SECS, JWT_SECRET_ENV, LEDGER_DB_FILE,
};
use authgate::directory::UserDirectory;
use authgate::ledger::RefreshTokenLedger;
use authgate::state::{AppState, GatewayState};
use authgate::{authority, gateway};

/// Development-only fallback; a real deployment must set `JWT_SECRET_KEY`.
const DEV_SECRET: &str = "dev-only-insecure-secret";

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    if log_format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let secret = env::var(JWT_SECRET_ENV).unwrap_or_else(|_| {
        tracing::warn!(
            "{} not set, using an insecure development secret",
            JWT_SECRET_ENV
        );
        DEV_SECRET.to_string()
    });

    let data_dir = PathBuf::from(env::var(DATA_DIR_ENV).unwrap_or_else(|_| "/data".to_string()));
    let ledger = RefreshTokenLedger::open(&data_dir.join(LEDGER_DB_FILE))
        .expect("Failed to open refresh-token ledger");

    let access_ttl = chrono::Duration::seconds(
        env_u64("ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TTL_SECS) as i64,
    );
    let refresh_ttl = chrono::Duration::seconds(
        env_u64("REFRESH_TOKEN_TTL_SECS", DEFAULT_REFRESH_TTL_SECS) as i64,
    );

    let auth_service = AuthService::new(
        UserDirectory::with_demo_users(),
        ledger,
        secret.as_bytes(),
        access_ttl,
        refresh_ttl,
    );
    let auth_app = authority::router(AppState::new(auth_service));

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let auth_port = env_u64("AUTH_PORT", 5001);
    let gateway_port = env_u64("GATEWAY_PORT", 5004);

    let auth_url = env::var(AUTH_SERVICE_URL_ENV)
        .unwrap_or_else(|_| format!("http://127.0.0.1:{auth_port}"));
    let backend_url = env::var(BACKEND_SERVICE_URL_ENV)
        .unwrap_or_else(|_| "http://127.0.0.1:5002".to_string());
    let timeout =
        Duration::from_secs(env_u64("SERVICE_TIMEOUT_SECS", DEFAULT_SERVICE_TIMEOUT_SECS));
    let gateway_app = gateway::router(GatewayState::new(auth_url, backend_url, timeout));

    let auth_listener = tokio::net::TcpListener::bind(format!("{host}:{auth_port}"))
        .await
        .expect("Failed to bind authority listener");
    let gateway_listener = tokio::net::TcpListener::bind(format!("{host}:{gateway_port}"))
        .await
        .expect("Failed to bind gateway listener");

    tracing::info!(
        "authority listening on http://{host}:{auth_port} (docs at /docs), \
         gateway on http://{host}:{gateway_port}"
    );

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown signal received");
                shutdown.cancel();
            }
        });
    }

    let auth_server = axum::serve(auth_listener, auth_app).with_graceful_shutdown({
        let shutdown = shutdown.clone();
        async move { shutdown.cancelled().await }
    });
    let gateway_server = axum::serve(gateway_listener, gateway_app).with_graceful_shutdown({
        let shutdown = shutdown.clone();
        async move { shutdown.cancelled().await }
    });

    tokio::try_join!(
        async { auth_server.await },
        async { gateway_server.await }
    )
    .expect("server failed");
}
