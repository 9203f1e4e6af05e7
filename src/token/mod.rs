// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Token Module
//!
//! Signed, self-contained access and refresh tokens (HS256 over a single
//! shared secret).
//!
//! ## Token Flow
//!
//! 1. The authority issues an access/refresh token pair on login
//! 2. Clients present `Authorization: Bearer <access token>` to the gateway
//! 3. The authority:
//!    - Verifies signature and expiry
//!    - Validates the versioned claim schema (`v`, `sub`, `kind`, `exp`,
//!      and `jti` for refresh tokens)
//!    - Extracts the subject for identity lookup
//!
//! ## Security
//!
//! - Access token validity is signature + expiry only (no server state)
//! - Refresh tokens carry a `jti` mirrored in the ledger, the unit of
//!   revocation
//! - `decode_for_revocation` tolerates expiry solely to recover a `jti`
//!   for revocation; it must never feed an authorization decision
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod codec;
pub mod error;

pub use claims::{Claims, TokenKind, CLAIMS_VERSION};
pub use codec::TokenCodec;
pub use error::TokenError;
