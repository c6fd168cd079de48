//! # leadledger-enrich
//!
//! HTTP provider clients for LeadLedger: email discovery and verification,
//! contact enrichment, and AI message writing.
//!
//! The clients implement the provider traits from `leadledger-core`, so the
//! dispatcher can be wired against a real enrichment vendor or against test
//! stubs interchangeably.
//!
//! ```ignore
//! use leadledger_enrich::EnrichClient;
//!
//! let client = EnrichClient::new("https://api.enrich.example.com", "api-key");
//! let email = client.find_email("Ada", "Lovelace", "example.com").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod writer;

pub use client::EnrichClient;
pub use error::{Error, Result};
pub use writer::WriterClient;
