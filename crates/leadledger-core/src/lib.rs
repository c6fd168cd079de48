//! # leadledger-core
//!
//! Core business logic for the LeadLedger CRM backend.
//!
//! This crate provides:
//! - Account management and token auth
//! - **Credit Ledger** - per-account balance with an append-only transaction log
//! - **Metering Gate** - atomic debit-before-action gating for billable operations
//! - Contact and company repositories (`SQLite`)
//! - Billable service operations (search, reveal, enrich, AI writer, CRM sync)
//! - Provider traits for external enrichment, AI, and CRM collaborators

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
pub mod companies;
pub mod contacts;
mod error;
pub mod ledger;
pub mod metering;
pub mod service;
mod storage;

pub use account::{
    Account, AccountId, AccountRepository, AccountStatus, NewAccount, ProfileUpdate,
    ValidationError, ValidationResult, validate_signup,
};
pub use companies::{Company, CompanyId, CompanyRepository, CompanyUpdate, NewCompany};
pub use contacts::{
    Contact, ContactFilters, ContactId, ContactRepository, ContactUpdate, NewContact,
};
pub use error::{Error, Result};
pub use ledger::{DebitOutcome, EntryId, EntryKind, LedgerEntry, LedgerRepository};
pub use metering::{
    BillableOperation, ChargeOutcome, DEFAULT_ENRICH_COST, EnrichField, MeteringGate,
    UnknownEnrichField,
};
pub use service::{
    CrmConnection, CrmConnector, CrmExportRecord, CrmKind, EmailFinder, EmailSender, EnrichedData,
    EnrichmentProvider, MessageGenerator, MessagePurpose, MessageRequest, MessageTone, Metered,
    Prospect, ProspectSource, SampleProspects, authenticate, generate_token, login, verify_token,
};
pub use storage::Storage;

/// Credits granted to a new account at signup.
pub const STARTING_CREDITS: i64 = 100;
