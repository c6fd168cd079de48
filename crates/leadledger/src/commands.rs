//! Command handlers.

use anyhow::{Context, bail};
use tracing::info;

use leadledger_core::{
    Account, CompanyId, CompanyUpdate, ContactFilters, ContactId, ContactUpdate, LedgerEntry,
    Metered, MeteringGate, NewAccount, NewCompany, NewContact, ProfileUpdate, STARTING_CREDITS,
    SampleProspects, Storage, authenticate, login, service, validate_signup,
};
use leadledger_enrich::{EnrichClient, WriterClient};

use crate::cli::{Cli, Command, CompaniesCommand, ContactsCommand, CreditsCommand, ProfileArgs};
use crate::config::{self, Config};
use crate::crm::DemoCrm;

/// Open the store and dispatch one parsed command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the command fails.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    config.ensure_database_dir()?;
    let storage = Storage::open(&config.database_path).await?;

    match cli.command {
        Command::Signup {
            name,
            email,
            password,
            company,
            industry,
            role,
        } => {
            signup(&storage, name, email, password, company, industry, role).await
        }
        Command::Login { email, password } => {
            let (account, token) = login(&storage.accounts(), &email, &password).await?;
            config::save_session(&token)?;
            println!("Logged in as {} ({})", account.full_name, account.email);
            println!("Credits: {}", account.credits);
            Ok(())
        }
        Command::Logout => {
            config::clear_session()?;
            println!("Logged out.");
            Ok(())
        }
        Command::Profile(args) => profile(&storage, args).await,
        Command::Credits { command } => credits(&storage, command).await,
        Command::Contacts { command } => contacts(&storage, command).await,
        Command::Companies { command } => companies(&storage, command).await,
        Command::Search {
            job_title,
            company,
            industry,
            location,
        } => {
            let account = current_account(&storage).await?;
            let gate = MeteringGate::new(storage.ledger());
            let filters = ContactFilters {
                job_title,
                company,
                industry,
                location,
            };
            let outcome = service::prospecting::search_contacts(
                &gate,
                &storage.contacts(),
                &SampleProspects,
                &account,
                &filters,
            )
            .await?;
            if let Some(found) = completed(outcome) {
                println!("Saved {} new contact(s):", found.len());
                for contact in &found {
                    print_contact_line(contact);
                }
            }
            Ok(())
        }
        Command::Reveal { contact_id } => {
            let account = current_account(&storage).await?;
            let gate = MeteringGate::new(storage.ledger());
            let outcome = service::prospecting::reveal_email(
                &gate,
                &storage.contacts(),
                &account,
                ContactId(contact_id),
            )
            .await?;
            if let Some(contact) = completed(outcome) {
                println!(
                    "{}: {}",
                    contact.full_name,
                    contact.email.as_deref().unwrap_or("(no address)")
                );
            }
            Ok(())
        }
        Command::Enrich { contact_id, fields } => {
            let account = current_account(&storage).await?;
            let gate = MeteringGate::new(storage.ledger());
            let client = enrich_client(&config)?;
            let outcome = service::prospecting::enrich_contact(
                &gate,
                &storage.contacts(),
                &client,
                &account,
                ContactId(contact_id),
                &fields,
            )
            .await?;
            if let Some(contact) = completed(outcome) {
                print_contact(&contact);
            }
            Ok(())
        }
        Command::Generate {
            contact_id,
            purpose,
            tone,
            prompt,
        } => {
            let account = current_account(&storage).await?;
            let gate = MeteringGate::new(storage.ledger());
            let client = writer_client(&config)?;
            let outcome = service::writer::generate_message(
                &gate,
                &storage.contacts(),
                &client,
                &account,
                ContactId(contact_id),
                purpose,
                tone,
                prompt,
            )
            .await?;
            if let Some(message) = completed(outcome) {
                println!("{message}");
            }
            Ok(())
        }
        Command::Send {
            contact_id,
            subject,
            body,
        } => {
            let account = current_account(&storage).await?;
            let gate = MeteringGate::new(storage.ledger());
            let client = writer_client(&config)?;
            let outcome = service::writer::send_email(
                &gate,
                &storage.contacts(),
                &client,
                &account,
                ContactId(contact_id),
                &subject,
                &body,
            )
            .await?;
            if let Some(contact) = completed(outcome) {
                println!(
                    "Sent to {} <{}>",
                    contact.full_name,
                    contact.email.as_deref().unwrap_or("?")
                );
            }
            Ok(())
        }
        Command::FindEmail {
            first_name,
            last_name,
            domain,
        } => {
            let account = current_account(&storage).await?;
            let gate = MeteringGate::new(storage.ledger());
            let client = enrich_client(&config)?;
            let outcome = service::prospecting::find_email(
                &gate,
                &client,
                &account,
                &first_name,
                &last_name,
                &domain,
            )
            .await?;
            if let Some(found) = completed(outcome) {
                match found {
                    Some(email) => println!("Found: {email}"),
                    None => println!("No address found."),
                }
            }
            Ok(())
        }
        Command::VerifyEmail { email } => {
            let account = current_account(&storage).await?;
            let gate = MeteringGate::new(storage.ledger());
            let client = enrich_client(&config)?;
            let outcome =
                service::prospecting::verify_email(&gate, &client, &account, &email).await?;
            if let Some(is_valid) = completed(outcome) {
                println!(
                    "{email}: {}",
                    if is_valid { "deliverable" } else { "undeliverable" }
                );
            }
            Ok(())
        }
        Command::Import { crm, companies } => {
            let account = current_account(&storage).await?;
            let gate = MeteringGate::new(storage.ledger());
            let connector = DemoCrm::new(crm);
            if companies {
                let outcome = service::crm::import_companies(
                    &gate,
                    &storage.companies(),
                    &connector,
                    &account,
                )
                .await?;
                if let Some(imported) = completed(outcome) {
                    println!("Imported {} company(ies).", imported.len());
                }
            } else {
                let outcome = service::crm::import_contacts(
                    &gate,
                    &storage.contacts(),
                    &connector,
                    &account,
                )
                .await?;
                if let Some(imported) = completed(outcome) {
                    println!("Imported {} contact(s).", imported.len());
                }
            }
            Ok(())
        }
        Command::Export {
            crm,
            contacts,
            companies,
        } => {
            if contacts.is_empty() && companies.is_empty() {
                bail!("Nothing to export: pass --contacts and/or --companies ids");
            }
            let account = current_account(&storage).await?;
            let gate = MeteringGate::new(storage.ledger());
            let connector = DemoCrm::new(crm);
            if !contacts.is_empty() {
                let ids: Vec<ContactId> = contacts.into_iter().map(ContactId).collect();
                let outcome = service::crm::export_contacts(
                    &gate,
                    &storage.contacts(),
                    &connector,
                    &account,
                    &ids,
                )
                .await?;
                if let Some(exported) = completed(outcome) {
                    for contact in &exported {
                        println!(
                            "{} -> {}",
                            contact.full_name,
                            contact.crm_id.as_deref().unwrap_or("(rejected)")
                        );
                    }
                }
            }
            if !companies.is_empty() {
                let ids: Vec<CompanyId> = companies.into_iter().map(CompanyId).collect();
                let outcome = service::crm::export_companies(
                    &gate,
                    &storage.companies(),
                    &connector,
                    &account,
                    &ids,
                )
                .await?;
                if let Some(exported) = completed(outcome) {
                    for company in &exported {
                        println!(
                            "{} -> {}",
                            company.name,
                            company.crm_id.as_deref().unwrap_or("(rejected)")
                        );
                    }
                }
            }
            Ok(())
        }
    }
}

/// Resolve the logged-in account from the stored session token.
async fn current_account(storage: &Storage) -> anyhow::Result<Account> {
    let token = config::load_session().context("Not logged in: run `leadledger login` first")?;
    let account = authenticate(&storage.accounts(), &token).await?;
    Ok(account)
}

fn enrich_client(config: &Config) -> anyhow::Result<EnrichClient> {
    let base_url = config
        .enrich_base_url
        .as_deref()
        .context("No enrichment provider configured: set LEADLEDGER_ENRICH_URL")?;
    let api_key = config
        .enrich_api_key
        .as_deref()
        .context("No enrichment API key configured: set LEADLEDGER_API_KEY")?;
    Ok(EnrichClient::new(base_url, api_key))
}

fn writer_client(config: &Config) -> anyhow::Result<WriterClient> {
    let base_url = config
        .writer_base_url
        .as_deref()
        .context("No writer service configured: set LEADLEDGER_WRITER_URL")?;
    let api_key = config
        .writer_api_key
        .as_deref()
        .context("No writer API key configured: set LEADLEDGER_WRITER_KEY")?;
    Ok(WriterClient::new(base_url, api_key))
}

/// Unwrap a metered outcome, reporting the charge or the denial.
fn completed<T>(outcome: Metered<T>) -> Option<T> {
    match outcome {
        Metered::Completed {
            value,
            credits_used,
            credits_remaining,
        } => {
            println!("Charged {credits_used} credit(s), {credits_remaining} remaining.");
            Some(value)
        }
        Metered::InsufficientCredits {
            required,
            available,
        } => {
            println!(
                "Insufficient credits: this operation costs {required}, balance is {available}."
            );
            None
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn signup(
    storage: &Storage,
    name: String,
    email: String,
    password: String,
    company: Option<String>,
    industry: Option<String>,
    role: Option<String>,
) -> anyhow::Result<()> {
    let new = NewAccount {
        full_name: name,
        email,
        password,
        company_name: company,
        industry,
        role,
    };

    if let Err(errors) = validate_signup(&new) {
        for error in &errors {
            eprintln!("{}: {}", error.field(), error.message());
        }
        bail!("Signup validation failed");
    }
    if storage.accounts().get_by_email(&new.email).await?.is_some() {
        bail!("An account with this email already exists");
    }

    let account = storage.accounts().create(&new, STARTING_CREDITS).await?;
    info!(account_id = %account.id, "account created");
    println!("Account {} created for {}.", account.id, account.email);
    println!("Starting balance: {} credits.", account.credits);
    Ok(())
}

async fn profile(storage: &Storage, args: ProfileArgs) -> anyhow::Result<()> {
    let account = current_account(storage).await?;

    let account = if args.is_update() {
        storage
            .accounts()
            .update_profile(
                account.id,
                &ProfileUpdate {
                    full_name: args.name,
                    company_name: args.company,
                    industry: args.industry,
                    role: args.role,
                },
            )
            .await?
    } else {
        account
    };

    println!("Account #{}", account.id);
    println!("  Name:     {}", account.full_name);
    println!("  Email:    {}", account.email);
    if let Some(company) = &account.company_name {
        println!("  Company:  {company}");
    }
    if let Some(industry) = &account.industry {
        println!("  Industry: {industry}");
    }
    if let Some(role) = &account.role {
        println!("  Role:     {role}");
    }
    println!("  Credits:  {}", account.credits);
    println!("  Status:   {}", account.status.as_str());
    Ok(())
}

async fn credits(storage: &Storage, command: CreditsCommand) -> anyhow::Result<()> {
    let account = current_account(storage).await?;
    let ledger = storage.ledger();

    match command {
        CreditsCommand::Balance => {
            println!("{}", ledger.balance(account.id).await?);
        }
        CreditsCommand::History => {
            for entry in ledger.transactions(account.id).await? {
                print_entry(&entry);
            }
        }
        CreditsCommand::Grant {
            amount,
            description,
        } => {
            let new_balance = ledger.record_credit(account.id, amount, &description).await?;
            println!("Added {amount} credit(s), balance is now {new_balance}.");
        }
    }
    Ok(())
}

async fn contacts(storage: &Storage, command: ContactsCommand) -> anyhow::Result<()> {
    let account = current_account(storage).await?;
    let repo = storage.contacts();

    match command {
        ContactsCommand::List => {
            for contact in repo.list_for_account(account.id).await? {
                print_contact_line(&contact);
            }
        }
        ContactsCommand::Show { id } => {
            let contact = owned_contact(storage, &account, id).await?;
            print_contact(&contact);
        }
        ContactsCommand::Add {
            name,
            email,
            phone,
            job_title,
            company,
            industry,
            location,
            tags,
        } => {
            let contact = repo
                .create(
                    account.id,
                    &NewContact {
                        full_name: name,
                        email,
                        phone,
                        job_title,
                        company_name: company,
                        industry,
                        location,
                        tags,
                        ..NewContact::default()
                    },
                )
                .await?;
            println!("Contact {} created.", contact.id);
        }
        ContactsCommand::Update {
            id,
            email,
            phone,
            linkedin,
            notes,
        } => {
            // Ownership check before the write.
            owned_contact(storage, &account, id).await?;
            let contact = repo
                .update(
                    ContactId(id),
                    &ContactUpdate {
                        email,
                        phone,
                        linkedin_url: linkedin,
                        notes,
                        ..ContactUpdate::default()
                    },
                )
                .await?;
            print_contact(&contact);
        }
        ContactsCommand::Delete { id } => {
            owned_contact(storage, &account, id).await?;
            repo.delete(ContactId(id)).await?;
            println!("Contact {id} deleted.");
        }
    }
    Ok(())
}

async fn companies(storage: &Storage, command: CompaniesCommand) -> anyhow::Result<()> {
    let account = current_account(storage).await?;
    let repo = storage.companies();

    match command {
        CompaniesCommand::List => {
            for company in repo.list_for_account(account.id).await? {
                println!(
                    "#{} {} [{}]",
                    company.id,
                    company.name,
                    company.industry.as_deref().unwrap_or("-")
                );
            }
        }
        CompaniesCommand::Show { id } => {
            let company = owned_company(storage, &account, id).await?;
            println!("#{} {}", company.id, company.name);
            if let Some(industry) = &company.industry {
                println!("  Industry: {industry}");
            }
            if let Some(website) = &company.website {
                println!("  Website:  {website}");
            }
            if let Some(size) = &company.size {
                println!("  Size:     {size}");
            }
            if let Some(location) = &company.location {
                println!("  Location: {location}");
            }
            if let Some(crm) = &company.crm_source {
                println!(
                    "  CRM:      {crm} ({})",
                    company.crm_id.as_deref().unwrap_or("-")
                );
            }
        }
        CompaniesCommand::Add {
            name,
            industry,
            website,
            size,
            location,
        } => {
            let company = repo
                .create(
                    account.id,
                    &NewCompany {
                        name,
                        industry,
                        website,
                        size,
                        location,
                        ..NewCompany::default()
                    },
                )
                .await?;
            println!("Company {} created.", company.id);
        }
        CompaniesCommand::Update {
            id,
            industry,
            website,
            size,
            location,
        } => {
            owned_company(storage, &account, id).await?;
            let company = repo
                .update(
                    CompanyId(id),
                    &CompanyUpdate {
                        industry,
                        website,
                        size,
                        location,
                        ..CompanyUpdate::default()
                    },
                )
                .await?;
            println!("Company {} updated.", company.id);
        }
        CompaniesCommand::Delete { id } => {
            owned_company(storage, &account, id).await?;
            repo.delete(CompanyId(id)).await?;
            println!("Company {id} deleted.");
        }
    }
    Ok(())
}

async fn owned_contact(
    storage: &Storage,
    account: &Account,
    id: i64,
) -> anyhow::Result<leadledger_core::Contact> {
    let contact = storage
        .contacts()
        .get(ContactId(id))
        .await?
        .filter(|c| c.account_id == account.id)
        .with_context(|| format!("Contact {id} not found"))?;
    Ok(contact)
}

async fn owned_company(
    storage: &Storage,
    account: &Account,
    id: i64,
) -> anyhow::Result<leadledger_core::Company> {
    let company = storage
        .companies()
        .get(CompanyId(id))
        .await?
        .filter(|c| c.account_id == account.id)
        .with_context(|| format!("Company {id} not found"))?;
    Ok(company)
}

fn print_entry(entry: &LedgerEntry) {
    println!(
        "{}  {:>+5}  {}",
        entry.created_at.format("%Y-%m-%d %H:%M"),
        entry.amount,
        entry.description
    );
}

fn print_contact_line(contact: &leadledger_core::Contact) {
    println!(
        "#{} {} - {} at {}",
        contact.id,
        contact.full_name,
        contact.job_title.as_deref().unwrap_or("-"),
        contact.company_name.as_deref().unwrap_or("-")
    );
}

fn print_contact(contact: &leadledger_core::Contact) {
    println!("#{} {}", contact.id, contact.full_name);
    if let Some(email) = &contact.email {
        let verified = if contact.email_verified {
            " (verified)"
        } else {
            ""
        };
        println!("  Email:    {email}{verified}");
    }
    if let Some(phone) = &contact.phone {
        println!("  Phone:    {phone}");
    }
    if let Some(title) = &contact.job_title {
        println!("  Title:    {title}");
    }
    if let Some(company) = &contact.company_name {
        println!("  Company:  {company}");
    }
    if let Some(location) = &contact.location {
        println!("  Location: {location}");
    }
    if let Some(linkedin) = &contact.linkedin_url {
        println!("  LinkedIn: {linkedin}");
    }
    if !contact.tags.is_empty() {
        println!("  Tags:     {}", contact.tags.join(", "));
    }
    if contact.is_enriched {
        println!(
            "  Enriched: yes ({})",
            contact.enrichment_source.as_deref().unwrap_or("-")
        );
    }
    if let Some(crm) = &contact.crm_source {
        println!(
            "  CRM:      {crm} ({})",
            contact.crm_id.as_deref().unwrap_or("-")
        );
    }
}
