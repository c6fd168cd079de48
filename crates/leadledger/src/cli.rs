//! Command line interface definitions.

use clap::{Args, Parser, Subcommand};

use leadledger_core::{CrmKind, EnrichField, MessagePurpose, MessageTone};

/// Credit-metered CRM and prospecting toolkit.
#[derive(Debug, Parser)]
#[command(name = "leadledger", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account. New accounts start with 100 credits.
    Signup {
        /// Display name.
        #[arg(long)]
        name: String,
        /// Email address.
        #[arg(long)]
        email: String,
        /// Password (at least 8 characters).
        #[arg(long)]
        password: String,
        /// Company name.
        #[arg(long)]
        company: Option<String>,
        /// Industry.
        #[arg(long)]
        industry: Option<String>,
        /// Job role.
        #[arg(long)]
        role: Option<String>,
    },
    /// Log in and store a session token.
    Login {
        /// Email address.
        #[arg(long)]
        email: String,
        /// Password.
        #[arg(long)]
        password: String,
    },
    /// Discard the stored session token.
    Logout,
    /// Show or update the account profile.
    Profile(ProfileArgs),
    /// Credit balance and transaction history.
    Credits {
        #[command(subcommand)]
        command: CreditsCommand,
    },
    /// Manage saved contacts.
    Contacts {
        #[command(subcommand)]
        command: ContactsCommand,
    },
    /// Manage saved companies.
    Companies {
        #[command(subcommand)]
        command: CompaniesCommand,
    },
    /// Search for prospects and save matches as contacts. Costs 5 credits.
    Search {
        /// Substring match on job title.
        #[arg(long)]
        job_title: Option<String>,
        /// Substring match on employer name.
        #[arg(long)]
        company: Option<String>,
        /// Substring match on industry.
        #[arg(long)]
        industry: Option<String>,
        /// Substring match on location.
        #[arg(long)]
        location: Option<String>,
    },
    /// Reveal a contact's email address. Costs 2 credits.
    Reveal {
        /// Contact id.
        contact_id: i64,
    },
    /// Enrich contact fields. Cost is the sum of the field prices, or a
    /// flat 5 credits when no fields are named.
    Enrich {
        /// Contact id.
        contact_id: i64,
        /// Fields to enrich: email (2), phone (3), social (1), company (4).
        #[arg(long, value_delimiter = ',')]
        fields: Vec<EnrichField>,
    },
    /// Generate an AI outreach message for a contact. Costs 3 credits.
    Generate {
        /// Contact id.
        contact_id: i64,
        /// Why the message is being written: introduction, follow_up,
        /// meeting_request, or thank_you.
        #[arg(long, default_value = "introduction")]
        purpose: MessagePurpose,
        /// Voice: professional, friendly, casual, or formal.
        #[arg(long, default_value = "professional")]
        tone: MessageTone,
        /// Extra instructions for the writer.
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Send an email to a contact. Costs 3 credits.
    Send {
        /// Contact id. The contact must have an email address.
        contact_id: i64,
        /// Subject line.
        #[arg(long)]
        subject: String,
        /// Message body.
        #[arg(long)]
        body: String,
    },
    /// Find an email address from a name and a domain. Costs 1 credit.
    FindEmail {
        /// First name.
        first_name: String,
        /// Last name.
        last_name: String,
        /// Domain or company name.
        domain: String,
    },
    /// Verify whether an email address is deliverable. Costs 1 credit.
    VerifyEmail {
        /// Address to check.
        email: String,
    },
    /// Import records from a CRM. Costs 10 credits.
    Import {
        /// CRM to pull from: salesforce or hubspot.
        #[arg(long)]
        crm: CrmKind,
        /// Pull companies instead of contacts.
        #[arg(long)]
        companies: bool,
    },
    /// Export records to a CRM. Costs 5 credits.
    Export {
        /// CRM to push to: salesforce or hubspot.
        #[arg(long)]
        crm: CrmKind,
        /// Contact ids to export.
        #[arg(long, value_delimiter = ',')]
        contacts: Vec<i64>,
        /// Company ids to export.
        #[arg(long, value_delimiter = ',')]
        companies: Vec<i64>,
    },
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// New display name.
    #[arg(long)]
    pub name: Option<String>,
    /// New company name.
    #[arg(long)]
    pub company: Option<String>,
    /// New industry.
    #[arg(long)]
    pub industry: Option<String>,
    /// New job role.
    #[arg(long)]
    pub role: Option<String>,
}

impl ProfileArgs {
    /// Whether any field was given; with none, the profile is shown.
    pub const fn is_update(&self) -> bool {
        self.name.is_some()
            || self.company.is_some()
            || self.industry.is_some()
            || self.role.is_some()
    }
}

#[derive(Debug, Subcommand)]
pub enum CreditsCommand {
    /// Show the current balance.
    Balance,
    /// List ledger entries, newest first.
    History,
    /// Add credits to the account.
    Grant {
        /// Credits to add.
        amount: i64,
        /// Ledger description.
        #[arg(long, default_value = "Credits purchased")]
        description: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ContactsCommand {
    /// List all contacts.
    List,
    /// Show one contact.
    Show {
        /// Contact id.
        id: i64,
    },
    /// Add a contact.
    Add {
        /// Display name.
        #[arg(long)]
        name: String,
        /// Email address.
        #[arg(long)]
        email: Option<String>,
        /// Phone number.
        #[arg(long)]
        phone: Option<String>,
        /// Job title.
        #[arg(long)]
        job_title: Option<String>,
        /// Employer name.
        #[arg(long)]
        company: Option<String>,
        /// Industry.
        #[arg(long)]
        industry: Option<String>,
        /// Location.
        #[arg(long)]
        location: Option<String>,
        /// Tags.
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// Update a contact.
    Update {
        /// Contact id.
        id: i64,
        /// New email address.
        #[arg(long)]
        email: Option<String>,
        /// New phone number.
        #[arg(long)]
        phone: Option<String>,
        /// New LinkedIn URL.
        #[arg(long)]
        linkedin: Option<String>,
        /// New notes.
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a contact.
    Delete {
        /// Contact id.
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum CompaniesCommand {
    /// List all companies.
    List,
    /// Show one company.
    Show {
        /// Company id.
        id: i64,
    },
    /// Add a company.
    Add {
        /// Company name.
        #[arg(long)]
        name: String,
        /// Industry.
        #[arg(long)]
        industry: Option<String>,
        /// Website URL.
        #[arg(long)]
        website: Option<String>,
        /// Headcount bracket, e.g. "100-500".
        #[arg(long)]
        size: Option<String>,
        /// Location.
        #[arg(long)]
        location: Option<String>,
    },
    /// Update a company.
    Update {
        /// Company id.
        id: i64,
        /// New industry.
        #[arg(long)]
        industry: Option<String>,
        /// New website URL.
        #[arg(long)]
        website: Option<String>,
        /// New headcount bracket.
        #[arg(long)]
        size: Option<String>,
        /// New location.
        #[arg(long)]
        location: Option<String>,
    },
    /// Delete a company.
    Delete {
        /// Company id.
        id: i64,
    },
}
