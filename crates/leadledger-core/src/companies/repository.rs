//! Company storage repository.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteRow, SqlitePool};

use super::model::{Company, CompanyId, CompanyUpdate, NewCompany};
use crate::account::AccountId;
use crate::{Error, Result};

/// Repository for company storage and retrieval.
#[derive(Clone)]
pub struct CompanyRepository {
    pool: SqlitePool,
}

impl CompanyRepository {
    /// Wrap an existing pool (see [`crate::Storage`]).
    pub(crate) const fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the companies schema.
    pub(crate) async fn initialize(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS companies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL REFERENCES accounts(id),
                name TEXT NOT NULL,
                industry TEXT,
                website TEXT,
                size TEXT,
                location TEXT,
                description TEXT,
                phone TEXT,
                crm_source TEXT,
                crm_id TEXT,
                crm_synced_at TEXT,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_companies_account ON companies(account_id)
            ",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Create a company.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn create(&self, account_id: AccountId, new: &NewCompany) -> Result<Company> {
        let created_at = Utc::now();

        let result = sqlx::query(
            r"
            INSERT INTO companies
                (account_id, name, industry, website, size, location,
                 description, phone, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(account_id.0)
        .bind(new.name.trim())
        .bind(new.industry.as_deref())
        .bind(new.website.as_deref())
        .bind(new.size.as_deref())
        .bind(new.location.as_deref())
        .bind(new.description.as_deref())
        .bind(new.phone.as_deref())
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let id = CompanyId(result.last_insert_rowid());
        self.get(id).await?.ok_or(Error::CompanyNotFound(id))
    }

    /// Get company by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, id: CompanyId) -> Result<Option<Company>> {
        let row = sqlx::query("SELECT * FROM companies WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_company))
    }

    /// All companies owned by an account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_account(&self, account_id: AccountId) -> Result<Vec<Company>> {
        let rows = sqlx::query("SELECT * FROM companies WHERE account_id = ? ORDER BY id DESC")
            .bind(account_id.0)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(row_to_company).collect())
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CompanyNotFound`] if the company does not exist, or
    /// a database error if the query fails.
    pub async fn update(&self, id: CompanyId, update: &CompanyUpdate) -> Result<Company> {
        sqlx::query(
            r"
            UPDATE companies SET
                industry = COALESCE(?, industry),
                website = COALESCE(?, website),
                size = COALESCE(?, size),
                location = COALESCE(?, location),
                description = COALESCE(?, description),
                phone = COALESCE(?, phone),
                crm_source = COALESCE(?, crm_source),
                crm_id = COALESCE(?, crm_id),
                crm_synced_at = COALESCE(?, crm_synced_at)
            WHERE id = ?
            ",
        )
        .bind(update.industry.as_deref())
        .bind(update.website.as_deref())
        .bind(update.size.as_deref())
        .bind(update.location.as_deref())
        .bind(update.description.as_deref())
        .bind(update.phone.as_deref())
        .bind(update.crm_source.as_deref())
        .bind(update.crm_id.as_deref())
        .bind(update.crm_synced_at.map(|d| d.to_rfc3339()))
        .bind(id.0)
        .execute(&self.pool)
        .await?;

        self.get(id).await?.ok_or(Error::CompanyNotFound(id))
    }

    /// Delete a company. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete(&self, id: CompanyId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM companies WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_company(row: &SqliteRow) -> Company {
    Company {
        id: CompanyId(row.get("id")),
        account_id: AccountId(row.get("account_id")),
        name: row.get("name"),
        industry: row.get("industry"),
        website: row.get("website"),
        size: row.get("size"),
        location: row.get("location"),
        description: row.get("description"),
        phone: row.get("phone"),
        crm_source: row.get("crm_source"),
        crm_id: row.get("crm_id"),
        crm_synced_at: parse_optional_timestamp(row.get("crm_synced_at")),
        created_at: row
            .get::<String, _>("created_at")
            .parse()
            .unwrap_or_else(|_| Utc::now()),
    }
}

fn parse_optional_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| s.parse().ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Storage;
    use crate::account::NewAccount;

    async fn setup() -> (CompanyRepository, AccountId) {
        let storage = Storage::in_memory().await.unwrap();
        let account = storage
            .accounts()
            .create(
                &NewAccount {
                    full_name: "Owner".into(),
                    email: "owner@example.com".into(),
                    password: "password123".into(),
                    company_name: None,
                    industry: None,
                    role: None,
                },
                100,
            )
            .await
            .unwrap();
        (storage.companies(), account.id)
    }

    #[tokio::test]
    async fn test_create_list_delete() {
        let (repo, account_id) = setup().await;

        let created = repo
            .create(
                account_id,
                &NewCompany {
                    name: "TechCorp Inc.".into(),
                    industry: Some("Technology".into()),
                    website: Some("https://techcorp.example.com".into()),
                    size: Some("500-1000".into()),
                    ..NewCompany::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(created.name, "TechCorp Inc.");

        let all = repo.list_for_account(account_id).await.unwrap();
        assert_eq!(all.len(), 1);

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.list_for_account(account_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_crm_linkage_update() {
        let (repo, account_id) = setup().await;
        let created = repo
            .create(
                account_id,
                &NewCompany {
                    name: "GlobalFinance Ltd.".into(),
                    ..NewCompany::default()
                },
            )
            .await
            .unwrap();

        let updated = repo
            .update(
                created.id,
                &CompanyUpdate {
                    crm_source: Some("salesforce".into()),
                    crm_id: Some("SF-001".into()),
                    crm_synced_at: Some(Utc::now()),
                    ..CompanyUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.crm_source.as_deref(), Some("salesforce"));
        assert_eq!(updated.crm_id.as_deref(), Some("SF-001"));
        assert!(updated.crm_synced_at.is_some());
    }
}
