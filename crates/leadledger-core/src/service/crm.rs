//! CRM import and export operations.
//!
//! Connectors own the vendor field mapping; these operations only meter the
//! work, persist the records, and track the CRM linkage.

use chrono::Utc;
use tracing::info;

use super::Metered;
use super::providers::CrmConnector;
use crate::account::Account;
use crate::companies::{Company, CompanyId, CompanyRepository, CompanyUpdate};
use crate::contacts::{Contact, ContactId, ContactRepository, ContactUpdate};
use crate::metering::{BillableOperation, ChargeOutcome, MeteringGate};
use crate::Result;

/// Pull contacts from a CRM and save them tagged with the source.
/// Costs 10 credits.
///
/// # Errors
///
/// Returns an error if the charge, the connector, or saving fails.
pub async fn import_contacts(
    gate: &MeteringGate,
    contacts: &ContactRepository,
    connector: &impl CrmConnector,
    account: &Account,
) -> Result<Metered<Vec<Contact>>> {
    let kind = connector.kind();
    let operation = BillableOperation::CrmImport;
    let description = format!("Import contacts from {}", kind.display_name());

    let outcome = gate.charge(account.id, &operation, &description).await?;
    let new_balance = match outcome {
        ChargeOutcome::Charged { new_balance } => new_balance,
        ChargeOutcome::Denied {
            required,
            available,
        } => {
            return Ok(Metered::InsufficientCredits {
                required,
                available,
            });
        }
    };

    let incoming = connector.import_contacts().await?;
    let mut saved = Vec::with_capacity(incoming.len());
    for mut new in incoming {
        new.tags.push(format!("{} Import", kind.display_name()));
        saved.push(contacts.create(account.id, &new).await?);
    }

    info!(account = %account.id, crm = kind.as_str(), count = saved.len(), "contacts imported");
    Ok(Metered::Completed {
        value: saved,
        credits_used: operation.cost(),
        credits_remaining: new_balance,
    })
}

/// Pull companies from a CRM and save them. Costs 10 credits.
///
/// # Errors
///
/// Returns an error if the charge, the connector, or saving fails.
pub async fn import_companies(
    gate: &MeteringGate,
    companies: &CompanyRepository,
    connector: &impl CrmConnector,
    account: &Account,
) -> Result<Metered<Vec<Company>>> {
    let kind = connector.kind();
    let operation = BillableOperation::CrmImport;
    let description = format!("Import companies from {}", kind.display_name());

    let outcome = gate.charge(account.id, &operation, &description).await?;
    let new_balance = match outcome {
        ChargeOutcome::Charged { new_balance } => new_balance,
        ChargeOutcome::Denied {
            required,
            available,
        } => {
            return Ok(Metered::InsufficientCredits {
                required,
                available,
            });
        }
    };

    let incoming = connector.import_companies().await?;
    let mut saved = Vec::with_capacity(incoming.len());
    for new in incoming {
        saved.push(companies.create(account.id, &new).await?);
    }

    info!(account = %account.id, crm = kind.as_str(), count = saved.len(), "companies imported");
    Ok(Metered::Completed {
        value: saved,
        credits_used: operation.cost(),
        credits_remaining: new_balance,
    })
}

/// Push contacts to a CRM and record the assigned ids. Costs 5 credits.
///
/// Ids that are missing or owned by another account are skipped rather than
/// failing the batch.
///
/// # Errors
///
/// Returns an error if the charge, the connector, or the updates fail.
pub async fn export_contacts(
    gate: &MeteringGate,
    contacts: &ContactRepository,
    connector: &impl CrmConnector,
    account: &Account,
    contact_ids: &[ContactId],
) -> Result<Metered<Vec<Contact>>> {
    let kind = connector.kind();
    let operation = BillableOperation::CrmExport;
    let description = format!("Export contacts to {}", kind.display_name());

    let outcome = gate.charge(account.id, &operation, &description).await?;
    let new_balance = match outcome {
        ChargeOutcome::Charged { new_balance } => new_balance,
        ChargeOutcome::Denied {
            required,
            available,
        } => {
            return Ok(Metered::InsufficientCredits {
                required,
                available,
            });
        }
    };

    let mut to_export = Vec::new();
    for &id in contact_ids {
        if let Some(contact) = contacts.get(id).await?
            && contact.account_id == account.id
        {
            to_export.push(contact);
        }
    }

    let mut exported = Vec::new();
    if !to_export.is_empty() {
        let records = connector.export_contacts(&to_export).await?;
        for (contact, record) in to_export.iter().zip(records) {
            if record.success {
                let updated = contacts
                    .update(
                        contact.id,
                        &ContactUpdate {
                            crm_source: Some(kind.as_str().to_string()),
                            crm_id: record.remote_id,
                            crm_synced_at: Some(Utc::now()),
                            ..ContactUpdate::default()
                        },
                    )
                    .await?;
                exported.push(updated);
            }
        }
    }

    info!(account = %account.id, crm = kind.as_str(), count = exported.len(), "contacts exported");
    Ok(Metered::Completed {
        value: exported,
        credits_used: operation.cost(),
        credits_remaining: new_balance,
    })
}

/// Push companies to a CRM and record the assigned ids. Costs 5 credits.
///
/// # Errors
///
/// Returns an error if the charge, the connector, or the updates fail.
pub async fn export_companies(
    gate: &MeteringGate,
    companies: &CompanyRepository,
    connector: &impl CrmConnector,
    account: &Account,
    company_ids: &[CompanyId],
) -> Result<Metered<Vec<Company>>> {
    let kind = connector.kind();
    let operation = BillableOperation::CrmExport;
    let description = format!("Export companies to {}", kind.display_name());

    let outcome = gate.charge(account.id, &operation, &description).await?;
    let new_balance = match outcome {
        ChargeOutcome::Charged { new_balance } => new_balance,
        ChargeOutcome::Denied {
            required,
            available,
        } => {
            return Ok(Metered::InsufficientCredits {
                required,
                available,
            });
        }
    };

    let mut to_export = Vec::new();
    for &id in company_ids {
        if let Some(company) = companies.get(id).await?
            && company.account_id == account.id
        {
            to_export.push(company);
        }
    }

    let mut exported = Vec::new();
    if !to_export.is_empty() {
        let records = connector.export_companies(&to_export).await?;
        for (company, record) in to_export.iter().zip(records) {
            if record.success {
                let updated = companies
                    .update(
                        company.id,
                        &CompanyUpdate {
                            crm_source: Some(kind.as_str().to_string()),
                            crm_id: record.remote_id,
                            crm_synced_at: Some(Utc::now()),
                            ..CompanyUpdate::default()
                        },
                    )
                    .await?;
                exported.push(updated);
            }
        }
    }

    info!(account = %account.id, crm = kind.as_str(), count = exported.len(), "companies exported");
    Ok(Metered::Completed {
        value: exported,
        credits_used: operation.cost(),
        credits_remaining: new_balance,
    })
}
