//! Usage metering: the single choke point for credit-consuming actions.
//!
//! Every billable operation passes through [`MeteringGate::charge`] before
//! any external work runs. The gate delegates to the ledger's guarded
//! debit, so "check balance" and "take payment" are one atomic step.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::account::AccountId;
use crate::ledger::{DebitOutcome, LedgerRepository};
use crate::Result;

/// Flat price of an enrichment request that names no fields.
pub const DEFAULT_ENRICH_COST: i64 = 5;

/// A contact field category that can be enriched, each with a fixed price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichField {
    /// Email address discovery. 2 credits.
    Email,
    /// Phone number discovery. 3 credits.
    Phone,
    /// Social profile links. 1 credit.
    Social,
    /// Company facts. 4 credits.
    Company,
}

impl EnrichField {
    /// Price of enriching this field.
    #[must_use]
    pub const fn cost(self) -> i64 {
        match self {
            Self::Email => 2,
            Self::Phone => 3,
            Self::Social => 1,
            Self::Company => 4,
        }
    }

    /// Name used in requests and descriptions.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Social => "social",
            Self::Company => "company",
        }
    }
}

impl FromStr for EnrichField {
    type Err = UnknownEnrichField;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            "social" => Ok(Self::Social),
            "company" => Ok(Self::Company),
            other => Err(UnknownEnrichField(other.to_string())),
        }
    }
}

/// Error for an enrichment field name that has no price.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown enrichment field: {0}")]
pub struct UnknownEnrichField(pub String);

/// A named billable action with its credit cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillableOperation {
    /// Prospect search. 5 credits.
    ContactSearch,
    /// Reveal a contact's email address. 2 credits.
    RevealEmail,
    /// Generate an AI outreach message. 3 credits.
    GenerateMessage,
    /// Send a message to a contact. 3 credits.
    SendEmail,
    /// Find an email address from a name and domain. 1 credit.
    FindEmail,
    /// Verify an email address. 1 credit.
    VerifyEmail,
    /// Enrich contact fields; cost is the sum of the field prices, or the
    /// flat default when no fields are named.
    EnrichContact {
        /// Requested field categories.
        fields: Vec<EnrichField>,
    },
    /// Import records from a CRM. 10 credits.
    CrmImport,
    /// Export records to a CRM. 5 credits.
    CrmExport,
}

impl BillableOperation {
    /// Credit cost of one invocation, evaluated per call.
    #[must_use]
    pub fn cost(&self) -> i64 {
        match self {
            Self::ContactSearch | Self::CrmExport => 5,
            Self::RevealEmail => 2,
            Self::GenerateMessage | Self::SendEmail => 3,
            Self::FindEmail | Self::VerifyEmail => 1,
            Self::CrmImport => 10,
            Self::EnrichContact { fields } => {
                if fields.is_empty() {
                    DEFAULT_ENRICH_COST
                } else {
                    fields.iter().map(|f| f.cost()).sum()
                }
            }
        }
    }
}

/// Outcome of a charge attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeOutcome {
    /// Payment taken; the billable action may proceed.
    Charged {
        /// Balance after the debit.
        new_balance: i64,
    },
    /// Balance too low; no payment taken and no action may run.
    Denied {
        /// Cost that was asked for.
        required: i64,
        /// Balance at the time of the attempt.
        available: i64,
    },
}

/// Gate that debits an account before a billable action runs.
#[derive(Clone)]
pub struct MeteringGate {
    ledger: LedgerRepository,
}

impl MeteringGate {
    /// Create a gate over the given ledger.
    #[must_use]
    pub const fn new(ledger: LedgerRepository) -> Self {
        Self { ledger }
    }

    /// Charge an account for one invocation of an operation.
    ///
    /// On [`ChargeOutcome::Denied`] nothing was mutated and the caller must
    /// not perform the billable work. Charges are not idempotent: calling
    /// twice debits twice.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::AccountNotFound`] for an unknown account or a
    /// database error if the ledger transaction fails.
    pub async fn charge(
        &self,
        account_id: AccountId,
        operation: &BillableOperation,
        description: &str,
    ) -> Result<ChargeOutcome> {
        let cost = operation.cost();

        // Free operations skip the ledger entirely.
        if cost == 0 {
            let balance = self.ledger.balance(account_id).await?;
            return Ok(ChargeOutcome::Charged {
                new_balance: balance,
            });
        }

        debug!(account = %account_id, cost, description, "charging");
        match self
            .ledger
            .record_debit(account_id, cost, description)
            .await?
        {
            DebitOutcome::Applied(new_balance) => Ok(ChargeOutcome::Charged { new_balance }),
            DebitOutcome::Insufficient {
                required,
                available,
            } => Ok(ChargeOutcome::Denied {
                required,
                available,
            }),
        }
    }
}
