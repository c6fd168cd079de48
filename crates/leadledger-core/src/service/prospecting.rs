//! Prospect search and contact enrichment operations.

use chrono::Utc;
use tracing::info;

use super::Metered;
use super::providers::{EmailFinder, EnrichmentProvider, ProspectSource};
use crate::account::Account;
use crate::contacts::{Contact, ContactFilters, ContactId, ContactRepository, ContactUpdate, NewContact};
use crate::metering::{BillableOperation, ChargeOutcome, EnrichField, MeteringGate};
use crate::{Error, Result};

/// Search for prospects and save the matches as contacts. Costs 5 credits.
///
/// # Errors
///
/// Returns an error if the charge, the provider call, or saving fails.
pub async fn search_contacts(
    gate: &MeteringGate,
    contacts: &ContactRepository,
    source: &impl ProspectSource,
    account: &Account,
    filters: &ContactFilters,
) -> Result<Metered<Vec<Contact>>> {
    let operation = BillableOperation::ContactSearch;
    let topic = filters
        .job_title
        .as_deref()
        .or(filters.company.as_deref())
        .or(filters.industry.as_deref())
        .or(filters.location.as_deref())
        .unwrap_or("General search");
    let description = format!("Contact search: {topic}");

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

    let prospects = source.search(filters).await?;
    let mut saved = Vec::with_capacity(prospects.len());
    for prospect in prospects {
        let contact = contacts
            .create(
                account.id,
                &NewContact {
                    full_name: prospect.full_name,
                    email: prospect.email,
                    job_title: prospect.job_title,
                    company_name: prospect.company_name,
                    industry: prospect.industry,
                    location: prospect.location,
                    linkedin_url: prospect.linkedin_url,
                    ..NewContact::default()
                },
            )
            .await?;
        saved.push(contact);
    }

    info!(account = %account.id, results = saved.len(), "prospect search completed");
    Ok(Metered::Completed {
        value: saved,
        credits_used: operation.cost(),
        credits_remaining: new_balance,
    })
}

/// Reveal a contact's email address. Costs 2 credits.
///
/// If the contact already carries an address it is returned as-is; otherwise
/// one is derived from the contact's name and employer domain. Either way
/// the contact is marked enriched.
///
/// # Errors
///
/// Returns [`Error::ContactNotFound`] if the contact is missing or owned by
/// another account, or an error if the charge or the update fails.
pub async fn reveal_email(
    gate: &MeteringGate,
    contacts: &ContactRepository,
    account: &Account,
    contact_id: ContactId,
) -> Result<Metered<Contact>> {
    let contact = owned_contact(contacts, account, contact_id).await?;

    let operation = BillableOperation::RevealEmail;
    let description = format!("Email reveal for contact ID: {contact_id}");

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

    let email = contact
        .email
        .clone()
        .unwrap_or_else(|| derive_email(&contact));

    let updated = contacts
        .update(
            contact_id,
            &ContactUpdate {
                email: Some(email),
                is_enriched: Some(true),
                ..ContactUpdate::default()
            },
        )
        .await?;

    Ok(Metered::Completed {
        value: updated,
        credits_used: operation.cost(),
        credits_remaining: new_balance,
    })
}

/// Enrich a contact's fields through a provider. Variable cost.
///
/// # Errors
///
/// Returns [`Error::ContactNotFound`] if the contact is missing or owned by
/// another account, or an error if the charge, the provider call, or the
/// update fails.
pub async fn enrich_contact(
    gate: &MeteringGate,
    contacts: &ContactRepository,
    provider: &impl EnrichmentProvider,
    account: &Account,
    contact_id: ContactId,
    fields: &[EnrichField],
) -> Result<Metered<Contact>> {
    let contact = owned_contact(contacts, account, contact_id).await?;

    let description = format!("Contact enrichment for {}", contact.full_name);
    let operation = BillableOperation::EnrichContact {
        fields: fields.to_vec(),
    };

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

    let data = provider.enrich(&contact, fields).await?;

    let updated = contacts
        .update(
            contact_id,
            &ContactUpdate {
                email: data.email,
                phone: data.phone,
                linkedin_url: data.linkedin_url,
                is_enriched: Some(true),
                email_verified: Some(data.email_verified),
                enrichment_source: Some(data.source),
                enrichment_date: Some(Utc::now()),
                ..ContactUpdate::default()
            },
        )
        .await?;

    info!(account = %account.id, contact = %contact_id, "contact enriched");
    Ok(Metered::Completed {
        value: updated,
        credits_used: operation.cost(),
        credits_remaining: new_balance,
    })
}

/// Find an email address from a name and domain. Costs 1 credit.
///
/// A charge is taken even when no address is found; discovery attempts are
/// billed, not results.
///
/// # Errors
///
/// Returns an error if the charge or the provider call fails.
pub async fn find_email(
    gate: &MeteringGate,
    finder: &impl EmailFinder,
    account: &Account,
    first_name: &str,
    last_name: &str,
    domain_or_company: &str,
) -> Result<Metered<Option<String>>> {
    let operation = BillableOperation::FindEmail;
    let description = format!("Email finder for {first_name} {last_name}");

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

    let email = finder.find(first_name, last_name, domain_or_company).await?;

    Ok(Metered::Completed {
        value: email,
        credits_used: operation.cost(),
        credits_remaining: new_balance,
    })
}

/// Verify an email address. Costs 1 credit.
///
/// # Errors
///
/// Returns an error if the charge or the provider call fails.
pub async fn verify_email(
    gate: &MeteringGate,
    finder: &impl EmailFinder,
    account: &Account,
    email: &str,
) -> Result<Metered<bool>> {
    let operation = BillableOperation::VerifyEmail;
    let description = format!("Email verification for {email}");

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

    let is_valid = finder.verify(email).await?;

    Ok(Metered::Completed {
        value: is_valid,
        credits_used: operation.cost(),
        credits_remaining: new_balance,
    })
}

/// Fetch a contact and confirm the caller owns it.
pub(crate) async fn owned_contact(
    contacts: &ContactRepository,
    account: &Account,
    contact_id: ContactId,
) -> Result<Contact> {
    let contact = contacts
        .get(contact_id)
        .await?
        .ok_or(Error::ContactNotFound(contact_id))?;

    // A foreign contact looks the same as a missing one to the caller.
    if contact.account_id != account.id {
        return Err(Error::ContactNotFound(contact_id));
    }

    Ok(contact)
}

/// Derive `first.last@company.com` from the contact's name and employer.
fn derive_email(contact: &Contact) -> String {
    let local = contact
        .full_name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".");
    let domain = contact.company_name.as_ref().map_or_else(
        || "example.com".to_string(),
        |name| {
            let slug: String = name
                .to_lowercase()
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .collect();
            if slug.is_empty() {
                "example.com".to_string()
            } else {
                format!("{slug}.com")
            }
        },
    );
    format!("{local}@{domain}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Storage;
    use crate::account::NewAccount;
    use crate::service::providers::{EnrichedData, SampleProspects};

    struct StubEnrichment;

    impl EnrichmentProvider for StubEnrichment {
        async fn enrich(&self, _contact: &Contact, fields: &[EnrichField]) -> Result<EnrichedData> {
            Ok(EnrichedData {
                email: fields
                    .contains(&EnrichField::Email)
                    .then(|| "found@provider.example.com".into()),
                phone: fields
                    .contains(&EnrichField::Phone)
                    .then(|| "+1 (555) 123-4567".into()),
                linkedin_url: None,
                email_verified: fields.contains(&EnrichField::Email),
                source: "stub".into(),
            })
        }
    }

    struct StubFinder {
        hit: bool,
    }

    impl EmailFinder for StubFinder {
        async fn find(
            &self,
            first_name: &str,
            _last_name: &str,
            domain: &str,
        ) -> Result<Option<String>> {
            Ok(self
                .hit
                .then(|| format!("{}@{domain}", first_name.to_lowercase())))
        }

        async fn verify(&self, _email: &str) -> Result<bool> {
            Ok(self.hit)
        }
    }

    async fn setup(credits: i64) -> (Storage, MeteringGate, Account) {
        let storage = Storage::in_memory().await.unwrap();
        let account = storage
            .accounts()
            .create(
                &NewAccount {
                    full_name: "Casey Morgan".into(),
                    email: "casey@example.com".into(),
                    password: "password123".into(),
                    company_name: Some("Acme Sales".into()),
                    industry: None,
                    role: Some("AE".into()),
                },
                credits,
            )
            .await
            .unwrap();
        let gate = MeteringGate::new(storage.ledger());
        (storage, gate, account)
    }

    #[tokio::test]
    async fn test_search_saves_matches_and_bills() {
        let (storage, gate, account) = setup(100).await;

        let result = search_contacts(
            &gate,
            &storage.contacts(),
            &SampleProspects,
            &account,
            &ContactFilters::default(),
        )
        .await
        .unwrap();

        let Metered::Completed {
            value,
            credits_used,
            credits_remaining,
        } = result
        else {
            panic!("expected completion");
        };
        assert_eq!(value.len(), 3);
        assert_eq!(credits_used, 5);
        assert_eq!(credits_remaining, 95);

        let saved = storage.contacts().list_for_account(account.id).await.unwrap();
        assert_eq!(saved.len(), 3);
    }

    #[tokio::test]
    async fn test_search_denied_saves_nothing() {
        let (storage, gate, account) = setup(3).await;

        let result = search_contacts(
            &gate,
            &storage.contacts(),
            &SampleProspects,
            &account,
            &ContactFilters::default(),
        )
        .await
        .unwrap();

        assert_eq!(
            result,
            Metered::InsufficientCredits {
                required: 5,
                available: 3
            }
        );
        assert!(storage.contacts().list_for_account(account.id).await.unwrap().is_empty());
        assert_eq!(storage.ledger().balance(account.id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_reveal_email_derives_address() {
        let (storage, gate, account) = setup(100).await;
        let contact = storage
            .contacts()
            .create(
                account.id,
                &NewContact {
                    full_name: "Sarah Johnson".into(),
                    company_name: Some("TechCorp Inc.".into()),
                    ..NewContact::default()
                },
            )
            .await
            .unwrap();

        let result = reveal_email(&gate, &storage.contacts(), &account, contact.id)
            .await
            .unwrap();

        let Metered::Completed { value, credits_used, .. } = result else {
            panic!("expected completion");
        };
        assert_eq!(value.email.as_deref(), Some("sarah.johnson@techcorpinc.com"));
        assert!(value.is_enriched);
        assert_eq!(credits_used, 2);
    }

    #[tokio::test]
    async fn test_reveal_foreign_contact_is_not_found() {
        let (storage, gate, account) = setup(100).await;
        let other = storage
            .accounts()
            .create(
                &NewAccount {
                    full_name: "Other".into(),
                    email: "other@example.com".into(),
                    password: "password123".into(),
                    company_name: None,
                    industry: None,
                    role: None,
                },
                100,
            )
            .await
            .unwrap();
        let foreign = storage
            .contacts()
            .create(
                other.id,
                &NewContact {
                    full_name: "Hidden".into(),
                    ..NewContact::default()
                },
            )
            .await
            .unwrap();

        let result = reveal_email(&gate, &storage.contacts(), &account, foreign.id).await;
        assert!(matches!(result, Err(Error::ContactNotFound(_))));
        // No charge was taken for the failed lookup.
        assert_eq!(storage.ledger().balance(account.id).await.unwrap(), 100);
    }

    #[tokio::test]
    async fn test_enrich_variable_cost() {
        let (storage, gate, account) = setup(100).await;
        let contact = storage
            .contacts()
            .create(
                account.id,
                &NewContact {
                    full_name: "Robert Miller".into(),
                    ..NewContact::default()
                },
            )
            .await
            .unwrap();

        let result = enrich_contact(
            &gate,
            &storage.contacts(),
            &StubEnrichment,
            &account,
            contact.id,
            &[EnrichField::Email, EnrichField::Phone],
        )
        .await
        .unwrap();

        let Metered::Completed {
            value,
            credits_used,
            credits_remaining,
        } = result
        else {
            panic!("expected completion");
        };
        assert_eq!(credits_used, 5); // email 2 + phone 3
        assert_eq!(credits_remaining, 95);
        assert_eq!(value.email.as_deref(), Some("found@provider.example.com"));
        assert_eq!(value.phone.as_deref(), Some("+1 (555) 123-4567"));
        assert!(value.email_verified);
        assert_eq!(value.enrichment_source.as_deref(), Some("stub"));
    }

    #[tokio::test]
    async fn test_enrich_default_bundle_cost() {
        let (storage, gate, account) = setup(100).await;
        let contact = storage
            .contacts()
            .create(
                account.id,
                &NewContact {
                    full_name: "Jennifer Lee".into(),
                    ..NewContact::default()
                },
            )
            .await
            .unwrap();

        let result = enrich_contact(
            &gate,
            &storage.contacts(),
            &StubEnrichment,
            &account,
            contact.id,
            &[],
        )
        .await
        .unwrap();

        let Metered::Completed { credits_used, .. } = result else {
            panic!("expected completion");
        };
        assert_eq!(credits_used, 5);
    }

    #[tokio::test]
    async fn test_find_email_bills_misses() {
        let (storage, gate, account) = setup(100).await;

        let result = find_email(
            &gate,
            &StubFinder { hit: false },
            &account,
            "Jamie",
            "Rivera",
            "acme.example.com",
        )
        .await
        .unwrap();

        let Metered::Completed { value, credits_used, .. } = result else {
            panic!("expected completion");
        };
        assert!(value.is_none());
        assert_eq!(credits_used, 1);
        assert_eq!(storage.ledger().balance(account.id).await.unwrap(), 99);
    }

    #[tokio::test]
    async fn test_verify_email() {
        let (_storage, gate, account) = setup(100).await;

        let result = verify_email(&gate, &StubFinder { hit: true }, &account, "a@b.co")
            .await
            .unwrap();
        assert_eq!(result.into_value(), Some(true));
    }
}
