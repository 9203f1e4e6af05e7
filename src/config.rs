// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory for the refresh-token ledger database | `/data` |
//! | `HOST` | Bind address for both servers | `0.0.0.0` |
//! | `AUTH_PORT` | Authentication authority port | `5001` |
//! | `GATEWAY_PORT` | Gateway port | `5004` |
//! | `JWT_SECRET_KEY` | Shared HS256 signing secret | Required for production |
//! | `ACCESS_TOKEN_TTL_SECS` | Access token lifetime | `900` (15 minutes) |
//! | `REFRESH_TOKEN_TTL_SECS` | Refresh token lifetime | `604800` (7 days) |
//! | `AUTH_SERVICE_URL` | Authority base URL as seen by the gateway | `http://127.0.0.1:5001` |
//! | `BACKEND_SERVICE_URL` | Business service the gateway forwards to | `http://127.0.0.1:5002` |
//! | `SERVICE_TIMEOUT_SECS` | Timeout for gateway downstream calls | `5` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

/// Environment variable name for the ledger data directory path.
///
/// The refresh-token ledger database file (`ledger.redb`) lives here.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the shared HS256 signing secret.
///
/// Every token the authority issues is signed with this secret; the
/// trust boundary of the whole subsystem is this value.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET_KEY";

/// Environment variable name for the authority base URL used by the gateway.
pub const AUTH_SERVICE_URL_ENV: &str = "AUTH_SERVICE_URL";

/// Environment variable name for the business service base URL.
pub const BACKEND_SERVICE_URL_ENV: &str = "BACKEND_SERVICE_URL";

/// Default access token lifetime in seconds (15 minutes).
pub const DEFAULT_ACCESS_TTL_SECS: u64 = 900;

/// Default refresh token lifetime in seconds (7 days).
pub const DEFAULT_REFRESH_TTL_SECS: u64 = 7 * 24 * 3600;

/// Default timeout for gateway calls to the authority and business
/// services, in seconds. A timeout surfaces as 503, never as 401.
pub const DEFAULT_SERVICE_TIMEOUT_SECS: u64 = 5;

/// Filename of the refresh-token ledger database inside `DATA_DIR`.
pub const LEDGER_DB_FILE: &str = "ledger.redb";
