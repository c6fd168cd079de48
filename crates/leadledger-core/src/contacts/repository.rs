//! Contact storage repository.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteRow, SqlitePool};

use super::model::{Contact, ContactFilters, ContactId, ContactUpdate, NewContact};
use crate::account::AccountId;
use crate::{Error, Result};

/// Repository for contact storage and retrieval.
#[derive(Clone)]
pub struct ContactRepository {
    pool: SqlitePool,
}

impl ContactRepository {
    /// Wrap an existing pool (see [`crate::Storage`]).
    pub(crate) const fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the contacts schema.
    pub(crate) async fn initialize(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS contacts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL REFERENCES accounts(id),
                full_name TEXT NOT NULL,
                email TEXT,
                phone TEXT,
                job_title TEXT,
                company_name TEXT,
                industry TEXT,
                location TEXT,
                linkedin_url TEXT,
                notes TEXT,
                tags TEXT NOT NULL DEFAULT '[]',
                is_enriched INTEGER NOT NULL DEFAULT 0,
                email_verified INTEGER NOT NULL DEFAULT 0,
                enrichment_source TEXT,
                enrichment_date TEXT,
                crm_source TEXT,
                crm_id TEXT,
                crm_synced_at TEXT,
                email_sent INTEGER NOT NULL DEFAULT 0,
                last_interaction TEXT,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_contacts_account ON contacts(account_id)
            ",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Create a contact.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn create(&self, account_id: AccountId, new: &NewContact) -> Result<Contact> {
        let created_at = Utc::now();
        let tags_json = serde_json::to_string(&new.tags)?;

        let result = sqlx::query(
            r"
            INSERT INTO contacts
                (account_id, full_name, email, phone, job_title, company_name,
                 industry, location, linkedin_url, notes, tags, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(account_id.0)
        .bind(new.full_name.trim())
        .bind(new.email.as_deref())
        .bind(new.phone.as_deref())
        .bind(new.job_title.as_deref())
        .bind(new.company_name.as_deref())
        .bind(new.industry.as_deref())
        .bind(new.location.as_deref())
        .bind(new.linkedin_url.as_deref())
        .bind(new.notes.as_deref())
        .bind(&tags_json)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let id = ContactId(result.last_insert_rowid());
        self.get(id).await?.ok_or(Error::ContactNotFound(id))
    }

    /// Get contact by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, id: ContactId) -> Result<Option<Contact>> {
        let row = sqlx::query("SELECT * FROM contacts WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_contact).transpose()
    }

    /// All contacts owned by an account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_account(&self, account_id: AccountId) -> Result<Vec<Contact>> {
        let rows = sqlx::query("SELECT * FROM contacts WHERE account_id = ? ORDER BY id DESC")
            .bind(account_id.0)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_contact).collect()
    }

    /// Contacts owned by an account matching the given filters
    /// (case-insensitive substring match per filled-in field).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn search(
        &self,
        account_id: AccountId,
        filters: &ContactFilters,
    ) -> Result<Vec<Contact>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM contacts
            WHERE account_id = ?
              AND (? IS NULL OR LOWER(job_title) LIKE ?)
              AND (? IS NULL OR LOWER(company_name) LIKE ?)
              AND (? IS NULL OR LOWER(industry) LIKE ?)
              AND (? IS NULL OR LOWER(location) LIKE ?)
            ORDER BY id DESC
            ",
        )
        .bind(account_id.0)
        .bind(filters.job_title.as_deref())
        .bind(like_pattern(filters.job_title.as_deref()))
        .bind(filters.company.as_deref())
        .bind(like_pattern(filters.company.as_deref()))
        .bind(filters.industry.as_deref())
        .bind(like_pattern(filters.industry.as_deref()))
        .bind(filters.location.as_deref())
        .bind(like_pattern(filters.location.as_deref()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_contact).collect()
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContactNotFound`] if the contact does not exist, or
    /// a database error if the query fails.
    pub async fn update(&self, id: ContactId, update: &ContactUpdate) -> Result<Contact> {
        sqlx::query(
            r"
            UPDATE contacts SET
                email = COALESCE(?, email),
                phone = COALESCE(?, phone),
                linkedin_url = COALESCE(?, linkedin_url),
                notes = COALESCE(?, notes),
                is_enriched = COALESCE(?, is_enriched),
                email_verified = COALESCE(?, email_verified),
                enrichment_source = COALESCE(?, enrichment_source),
                enrichment_date = COALESCE(?, enrichment_date),
                crm_source = COALESCE(?, crm_source),
                crm_id = COALESCE(?, crm_id),
                crm_synced_at = COALESCE(?, crm_synced_at),
                email_sent = COALESCE(?, email_sent),
                last_interaction = COALESCE(?, last_interaction)
            WHERE id = ?
            ",
        )
        .bind(update.email.as_deref())
        .bind(update.phone.as_deref())
        .bind(update.linkedin_url.as_deref())
        .bind(update.notes.as_deref())
        .bind(update.is_enriched.map(i64::from))
        .bind(update.email_verified.map(i64::from))
        .bind(update.enrichment_source.as_deref())
        .bind(update.enrichment_date.map(|d| d.to_rfc3339()))
        .bind(update.crm_source.as_deref())
        .bind(update.crm_id.as_deref())
        .bind(update.crm_synced_at.map(|d| d.to_rfc3339()))
        .bind(update.email_sent.map(i64::from))
        .bind(update.last_interaction.map(|d| d.to_rfc3339()))
        .bind(id.0)
        .execute(&self.pool)
        .await?;

        self.get(id).await?.ok_or(Error::ContactNotFound(id))
    }

    /// Delete a contact. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete(&self, id: ContactId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn like_pattern(filter: Option<&str>) -> Option<String> {
    filter.map(|f| format!("%{}%", f.trim().to_lowercase()))
}

fn row_to_contact(row: &SqliteRow) -> Result<Contact> {
    let tags: Vec<String> = serde_json::from_str(&row.get::<String, _>("tags"))?;
    Ok(Contact {
        id: ContactId(row.get("id")),
        account_id: AccountId(row.get("account_id")),
        full_name: row.get("full_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        job_title: row.get("job_title"),
        company_name: row.get("company_name"),
        industry: row.get("industry"),
        location: row.get("location"),
        linkedin_url: row.get("linkedin_url"),
        notes: row.get("notes"),
        tags,
        is_enriched: row.get::<i64, _>("is_enriched") != 0,
        email_verified: row.get::<i64, _>("email_verified") != 0,
        enrichment_source: row.get("enrichment_source"),
        enrichment_date: parse_optional_timestamp(row.get("enrichment_date")),
        crm_source: row.get("crm_source"),
        crm_id: row.get("crm_id"),
        crm_synced_at: parse_optional_timestamp(row.get("crm_synced_at")),
        email_sent: row.get::<i64, _>("email_sent") != 0,
        last_interaction: parse_optional_timestamp(row.get("last_interaction")),
        created_at: row
            .get::<String, _>("created_at")
            .parse()
            .unwrap_or_else(|_| Utc::now()),
    })
}

fn parse_optional_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| s.parse().ok())
}
