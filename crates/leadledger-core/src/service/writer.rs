//! AI message generation and outreach delivery operations.

use chrono::Utc;
use tracing::info;

use super::Metered;
use super::prospecting::owned_contact;
use super::providers::{EmailSender, MessageGenerator, MessagePurpose, MessageRequest, MessageTone};
use crate::account::Account;
use crate::contacts::{Contact, ContactId, ContactRepository, ContactUpdate};
use crate::metering::{BillableOperation, ChargeOutcome, MeteringGate};
use crate::{Error, Result};

/// Generate an AI outreach message for a contact. Costs 3 credits.
///
/// # Errors
///
/// Returns [`Error::ContactNotFound`] if the contact is missing or owned by
/// another account, or an error if the charge or the generator fails.
pub async fn generate_message(
    gate: &MeteringGate,
    contacts: &ContactRepository,
    generator: &impl MessageGenerator,
    account: &Account,
    contact_id: ContactId,
    purpose: MessagePurpose,
    tone: MessageTone,
    custom_prompt: Option<String>,
) -> Result<Metered<String>> {
    let contact = owned_contact(contacts, account, contact_id).await?;

    let operation = BillableOperation::GenerateMessage;
    let description = format!("AI message generation for contact ID: {contact_id}");

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

    let request = MessageRequest {
        contact_full_name: contact.full_name.clone(),
        contact_job_title: contact.job_title.clone(),
        contact_company_name: contact.company_name.clone(),
        sender_full_name: account.full_name.clone(),
        sender_company_name: account.company_name.clone(),
        sender_role: account.role.clone(),
        purpose,
        tone,
        custom_prompt,
    };

    let message = generator.generate(&request).await?;

    info!(account = %account.id, contact = %contact_id, "message generated");
    Ok(Metered::Completed {
        value: message,
        credits_used: operation.cost(),
        credits_remaining: new_balance,
    })
}

/// Send a composed message to a contact and record the interaction.
/// Costs 3 credits, charged before the send.
///
/// A delivery failure after the charge surfaces as an error; the charge is
/// not reversed (operations are billed per attempt).
///
/// # Errors
///
/// Returns [`Error::ContactNotFound`] if the contact is missing or owned by
/// another account, [`Error::Provider`] if the contact has no email address
/// or delivery fails, or an error if the charge fails.
pub async fn send_email(
    gate: &MeteringGate,
    contacts: &ContactRepository,
    sender: &impl EmailSender,
    account: &Account,
    contact_id: ContactId,
    subject: &str,
    body: &str,
) -> Result<Metered<Contact>> {
    let contact = owned_contact(contacts, account, contact_id).await?;

    let Some(to) = contact.email.clone() else {
        return Err(Error::Provider("Contact has no email address".into()));
    };

    let operation = BillableOperation::SendEmail;
    let description = format!("Email sent to {} ({to})", contact.full_name);

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

    sender.send(&to, subject, body).await?;

    let updated = contacts
        .update(
            contact_id,
            &ContactUpdate {
                email_sent: Some(true),
                last_interaction: Some(Utc::now()),
                ..ContactUpdate::default()
            },
        )
        .await?;

    info!(account = %account.id, contact = %contact_id, "email sent");
    Ok(Metered::Completed {
        value: updated,
        credits_used: operation.cost(),
        credits_remaining: new_balance,
    })
}
