//! Ledger entry model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::AccountId;

/// Unique identifier for a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub i64);

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of a ledger entry, derived from the sign of its amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Balance increase (positive amount).
    Credit,
    /// Balance decrease (negative amount).
    Debit,
}

/// One immutable record of a balance change.
///
/// Entries are append-only: they are never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier.
    pub id: EntryId,
    /// Owning account.
    pub account_id: AccountId,
    /// Signed amount: positive = credit, negative = debit.
    pub amount: i64,
    /// Free-text description of what the entry paid for.
    pub description: String,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Direction of the entry.
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        if self.amount >= 0 {
            EntryKind::Credit
        } else {
            EntryKind::Debit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(amount: i64) -> LedgerEntry {
        LedgerEntry {
            id: EntryId(1),
            account_id: AccountId(1),
            amount,
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_kind_from_sign() {
        assert_eq!(entry(5).kind(), EntryKind::Credit);
        assert_eq!(entry(-5).kind(), EntryKind::Debit);
    }
}
