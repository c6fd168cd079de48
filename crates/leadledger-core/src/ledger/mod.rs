//! Credit ledger: per-account balance plus an append-only transaction log.
//!
//! The ledger is the sole mutator of the balance column. Every balance
//! change writes a matching [`LedgerEntry`] in the same database
//! transaction, so `balance == SUM(entries.amount)` holds at all times.

mod model;
mod repository;

pub use model::{EntryId, EntryKind, LedgerEntry};
pub use repository::{DebitOutcome, LedgerRepository};
