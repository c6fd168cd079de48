//! Error types for the core library.

use thiserror::Error;

use crate::account::AccountId;
use crate::companies::CompanyId;
use crate::contacts::ContactId;

/// Errors that can occur in core operations.
///
/// Insufficient credits is deliberately not an error: a denied charge is an
/// expected business outcome and is modeled as a value
/// ([`crate::ledger::DebitOutcome`], [`crate::metering::ChargeOutcome`]).
#[derive(Debug, Error)]
pub enum Error {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Contact not found (or owned by another account).
    #[error("Contact not found: {0}")]
    ContactNotFound(ContactId),

    /// Company not found (or owned by another account).
    #[error("Company not found: {0}")]
    CompanyNotFound(CompanyId),

    /// Ledger amount must be positive.
    #[error("Invalid ledger amount: {0} (must be positive)")]
    InvalidAmount(i64),

    /// Bearer token could not be resolved to an account.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An external provider failed after the charge was taken.
    #[error("Provider error: {0}")]
    Provider(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
