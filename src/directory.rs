// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User directory and credential verification.
//!
//! The directory is the read surface of the external user store: the
//! authentication core only looks users up and checks presented
//! credentials, it does not manage their lifecycle. Verification on
//! every access-token check is the one point where a stateless token is
//! cross-checked against live state, so a deleted user fails
//! verification immediately even with an unexpired token.
//!
//! Password verification is HMAC-SHA-256 with a per-record salt and a
//! constant-time comparison. The hashing mechanics are deliberately
//! contained in [`PasswordHash`] so they can be swapped without touching
//! callers.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::models::{PublicUser, Role};

type HmacSha256 = Hmac<Sha256>;

/// Salted password hash with constant-time verification.
#[derive(Debug, Clone)]
pub struct PasswordHash {
    salt: String,
    mac: Vec<u8>,
}

impl PasswordHash {
    /// Derive a hash from a cleartext password with a fresh salt.
    pub fn derive(password: &str) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        let mac = Self::mac_for(&salt, password);
        Self { salt, mac }
    }

    /// Check a presented password. Constant-time via `Mac::verify_slice`.
    pub fn verify(&self, password: &str) -> bool {
        let mut mac = HmacSha256::new_from_slice(self.salt.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(password.as_bytes());
        mac.verify_slice(&self.mac).is_ok()
    }

    fn mac_for(salt: &str, password: &str) -> Vec<u8> {
        let mut mac =
            HmacSha256::new_from_slice(salt.as_bytes()).expect("HMAC accepts any key length");
        mac.update(password.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// A stored user record.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub role: Role,
    password: PasswordHash,
}

impl UserRecord {
    /// Public view of this record (never exposes credential material).
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// In-memory user directory keyed by username.
#[derive(Default)]
pub struct UserDirectory {
    users: HashMap<String, UserRecord>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory seeded with the stock demo accounts.
    pub fn with_demo_users() -> Self {
        let mut directory = Self::new();
        directory.insert_user("admin", "admin123", Role::Admin);
        directory.insert_user("user1", "password1", Role::User);
        directory.insert_user("maxim", "maxim", Role::User);
        directory
    }

    /// Add a user, replacing any existing record with the same username.
    pub fn insert_user(&mut self, username: &str, password: &str, role: Role) -> PublicUser {
        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            role,
            password: PasswordHash::derive(password),
        };
        let public = record.public();
        self.users.insert(username.to_string(), record);
        public
    }

    /// Verify a username/password pair.
    ///
    /// Unknown user and wrong password both return `None`; callers must
    /// not be able to distinguish the two.
    pub fn verify_credentials(&self, username: &str, password: &str) -> Option<&UserRecord> {
        self.users
            .get(username)
            .filter(|record| record.password.verify(password))
    }

    pub fn find_by_username(&self, username: &str) -> Option<&UserRecord> {
        self.users.get(username)
    }

    /// Remove a user. Returns whether a record existed.
    pub fn remove(&mut self, username: &str) -> bool {
        self.users.remove(username).is_some()
    }
}
