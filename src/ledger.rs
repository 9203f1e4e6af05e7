// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Refresh-token ledger backed by redb (pure Rust, ACID).
//!
//! The ledger is the single source of truth for refresh-token
//! revocation: a session identifier, once revoked or found expired
//! here, is never again treated as active regardless of what the
//! token's embedded expiry says.
//!
//! Rows are append-only history: revocation flips a flag, nothing is
//! deleted.
//!
//! ## Table Layout
//!
//! - `sessions`: session_id (jti) → serialized SessionRecord

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

/// Primary table: session_id → serialized SessionRecord (JSON bytes).
const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Rows
// =============================================================================

/// One refresh-token session, keyed by its `jti`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session identifier embedded in the refresh token (jti)
    pub session_id: String,
    /// Owning user's id
    pub user_id: String,
    /// When the session was issued
    pub created_at: DateTime<Utc>,
    /// When the session expires regardless of revocation
    pub expires_at: DateTime<Utc>,
    /// Whether the session has been revoked (rotation or logout)
    pub revoked: bool,
}

impl SessionRecord {
    fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at > now
    }
}

/// Ledger view of a session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No row for this identifier
    NotFound,
    /// Not revoked and not past its ledger expiry
    Active,
    /// Revoked by rotation or logout
    Revoked,
    /// Past its ledger expiry
    Expired,
}

// =============================================================================
// RefreshTokenLedger
// =============================================================================

/// Durable record of every issued refresh-token session.
pub struct RefreshTokenLedger {
    db: Database,
}

impl RefreshTokenLedger {
    /// Open (or create) the ledger database at the given path.
    pub fn open(path: &Path) -> LedgerResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create the table so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SESSIONS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Record a session at issuance.
    ///
    /// Upsert keyed by session id, so a retried issuance lands on the
    /// same row.
    pub fn record(&self, record: &SessionRecord) -> LedgerResult<()> {
        let json = serde_json::to_vec(record)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSIONS)?;
            table.insert(record.session_id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Mark a session revoked. Idempotent; unknown ids are a no-op.
    pub fn revoke(&self, session_id: &str) -> LedgerResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSIONS)?;
            let existing = match table.get(session_id)? {
                Some(raw) => Some(serde_json::from_slice::<SessionRecord>(raw.value())?),
                None => None,
            };
            if let Some(mut row) = existing {
                if !row.revoked {
                    row.revoked = true;
                    table.insert(session_id, serde_json::to_vec(&row)?.as_slice())?;
                }
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Ledger status of a session identifier.
    pub fn status(&self, session_id: &str) -> LedgerResult<SessionStatus> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SESSIONS)?;
        let row = match table.get(session_id)? {
            Some(raw) => serde_json::from_slice::<SessionRecord>(raw.value())?,
            None => return Ok(SessionStatus::NotFound),
        };

        if row.revoked {
            Ok(SessionStatus::Revoked)
        } else if row.expires_at <= Utc::now() {
            Ok(SessionStatus::Expired)
        } else {
            Ok(SessionStatus::Active)
        }
    }

    /// Rotate a session: revoke the old row and insert the replacement
    /// in a single write transaction.
    ///
    /// Returns `true` if this caller performed the rotation. The old row
    /// is revoked only if it is still active, and redb serializes write
    /// transactions, so of two concurrent rotations on the same session
    /// id at most one observes "not yet revoked" and wins; the loser
    /// sees `false` and must reject, exactly as if the token had already
    /// been redeemed by a third party.
    pub fn rotate(&self, old_session_id: &str, new_record: &SessionRecord) -> LedgerResult<bool> {
        let now = Utc::now();
        let write_txn = self.db.begin_write()?;
        let won = {
            let mut table = write_txn.open_table(SESSIONS)?;
            let old = match table.get(old_session_id)? {
                Some(raw) => Some(serde_json::from_slice::<SessionRecord>(raw.value())?),
                None => None,
            };
            match old {
                Some(mut row) if row.is_active(now) => {
                    row.revoked = true;
                    table.insert(old_session_id, serde_json::to_vec(&row)?.as_slice())?;
                    table.insert(
                        new_record.session_id.as_str(),
                        serde_json::to_vec(new_record)?.as_slice(),
                    )?;
                    true
                }
                _ => false,
            }
        };
        write_txn.commit()?;
        Ok(won)
    }

    /// All sessions ever issued to a user, for audit.
    pub fn sessions_for_user(&self, user_id: &str) -> LedgerResult<Vec<SessionRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SESSIONS)?;

        let mut sessions = Vec::new();
        for entry in table.iter()? {
            let (_, raw) = entry?;
            let row: SessionRecord = serde_json::from_slice(raw.value())?;
            if row.user_id == user_id {
                sessions.push(row);
            }
        }
        Ok(sessions)
    }
}
