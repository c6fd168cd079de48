//! Account management module.
//!
//! Tenant accounts: profile data, status, and the credit balance owned by
//! the ledger.

mod model;
mod repository;
mod validation;

pub use model::{Account, AccountId, AccountStatus, NewAccount, ProfileUpdate};
pub use repository::AccountRepository;
pub use validation::{ValidationError, ValidationResult, validate_signup};
