//! Billable service operations.
//!
//! This module is the action dispatcher: every operation here authenticates
//! upstream, charges through the [`crate::metering::MeteringGate`] first,
//! and performs its external effect only after the charge succeeds.

pub mod auth;
pub mod crm;
pub mod prospecting;
pub mod providers;
pub mod writer;

pub use auth::{authenticate, generate_token, login, verify_token};
pub use providers::{
    CrmConnection, CrmConnector, CrmExportRecord, CrmKind, EmailFinder, EmailSender, EnrichedData,
    EnrichmentProvider, MessageGenerator, MessagePurpose, MessageRequest, MessageTone, Prospect,
    ProspectSource, SampleProspects,
};

/// Result of a metered operation.
///
/// A denied charge is a normal outcome: the caller maps it to an
/// "insufficient credits" response and none of the billable work ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metered<T> {
    /// The charge succeeded and the operation ran.
    Completed {
        /// Operation result.
        value: T,
        /// Credits taken for this invocation.
        credits_used: i64,
        /// Balance after the charge.
        credits_remaining: i64,
    },
    /// The charge was denied; nothing was billed and nothing ran.
    InsufficientCredits {
        /// Cost the operation asked for.
        required: i64,
        /// Balance at the time of the attempt.
        available: i64,
    },
}

impl<T> Metered<T> {
    /// Whether the operation was denied for lack of credits.
    #[must_use]
    pub const fn is_denied(&self) -> bool {
        matches!(self, Self::InsufficientCredits { .. })
    }

    /// The operation result, if it ran.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Completed { value, .. } => Some(value),
            Self::InsufficientCredits { .. } => None,
        }
    }
}
