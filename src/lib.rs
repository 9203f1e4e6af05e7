// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authgate - Token-Based Session Authentication
//!
//! This crate provides a self-contained authentication subsystem: an
//! authority that issues and verifies HS256 session tokens backed by a
//! persistent refresh-token ledger, and a gateway that verifies bearer
//! tokens on behalf of downstream business services.
//!
//! ## Modules
//!
//! - `authority` - Login, verify, refresh and logout (Axum)
//! - `token` - Versioned JWT claims and the HS256 codec
//! - `ledger` - Refresh-token session ledger (redb)
//! - `directory` - Credential store with salted HMAC verification
//! - `gateway` - Verification middleware and request forwarding

pub mod authority;
pub mod config;
pub mod directory;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod models;
pub mod state;
pub mod token;
