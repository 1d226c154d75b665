//! Tamper-evident audit trail of dispatched actions
//!
//! Each entry stores the SHA-256 of its own fields chained to the hash of
//! the entry before it. Editing, dropping or reordering any entry breaks
//! the chain at that point.

use crate::session::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Audit failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuditError {
    /// Chain broken at entry `seq`
    #[error("audit chain broken at entry {seq}")]
    IntegrityViolation {
        /// First entry that fails verification
        seq: u64,
    },
}

/// One audited action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Position in the log, from zero
    pub seq: u64,
    /// Record time
    pub timestamp: DateTime<Utc>,
    /// Session the action ran in, none before login
    pub session: Option<SessionId>,
    /// Action name
    pub action: String,
    /// Result summary
    pub result: String,
    /// Hash of the previous entry, zero for the first
    #[serde(with = "hex::serde")]
    pub prev_hash: [u8; 32],
    /// Hash of this entry
    #[serde(with = "hex::serde")]
    pub hash: [u8; 32],
}

impl AuditEntry {
    /// Hex form of this entry's hash
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

/// Append-only hash-chained log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    /// Create empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, returning its sequence number
    pub fn append(
        &mut self,
        session: Option<SessionId>,
        action: impl Into<String>,
        result: impl Into<String>,
    ) -> u64 {
        let prev_hash = self.entries.last().map_or([0u8; 32], |e| e.hash);
        let mut entry = AuditEntry {
            seq: self.entries.len() as u64,
            timestamp: Utc::now(),
            session,
            action: action.into(),
            result: result.into(),
            prev_hash,
            hash: [0u8; 32],
        };
        entry.hash = compute_hash(&entry);
        let seq = entry.seq;
        self.entries.push(entry);
        seq
    }

    /// All entries, oldest first
    #[must_use]
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was logged
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hex hash of the newest entry
    #[must_use]
    pub fn head(&self) -> Option<String> {
        self.entries.last().map(AuditEntry::hash_hex)
    }

    /// Walk the chain and recompute every hash
    ///
    /// # Errors
    /// - `AuditError::IntegrityViolation` at the first broken entry
    pub fn verify_integrity(&self) -> Result<(), AuditError> {
        let mut prev = [0u8; 32];
        for (idx, entry) in self.entries.iter().enumerate() {
            let seq = idx as u64;
            if entry.seq != seq || entry.prev_hash != prev || entry.hash != compute_hash(entry) {
                return Err(AuditError::IntegrityViolation { seq });
            }
            prev = entry.hash;
        }
        Ok(())
    }
}

fn compute_hash(entry: &AuditEntry) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(entry.seq.to_le_bytes());
    hasher.update(entry.timestamp.timestamp_micros().to_le_bytes());
    match entry.session {
        Some(id) => hasher.update(id.0.as_bytes()),
        None => hasher.update([0u8; 16]),
    }
    hasher.update(entry.action.as_bytes());
    hasher.update([0]);
    hasher.update(entry.result.as_bytes());
    hasher.update([0]);
    hasher.update(entry.prev_hash);
    hasher.finalize().into()
}
