//! Account storage repository.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::Row;
use sqlx::sqlite::{SqliteRow, SqlitePool};
use tracing::debug;

use super::model::{Account, AccountId, AccountStatus, NewAccount, ProfileUpdate};
use crate::{Error, Result};

/// Repository for account storage and retrieval.
#[derive(Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    /// Wrap an existing pool (see [`crate::Storage`]).
    pub(crate) const fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the accounts schema.
    pub(crate) async fn initialize(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                full_name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                company_name TEXT,
                industry TEXT,
                role TEXT,
                credits INTEGER NOT NULL DEFAULT 0 CHECK (credits >= 0),
                status TEXT NOT NULL DEFAULT 'active',
                verified INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Create an account with a starting credit balance.
    ///
    /// The account row, its starting balance, and the matching initial
    /// ledger entry are written in one transaction: an account never exists
    /// with a balance its ledger cannot explain.
    ///
    /// # Errors
    ///
    /// Returns a database error if the email is already registered or the
    /// transaction fails.
    pub async fn create(&self, new: &NewAccount, starting_credits: i64) -> Result<Account> {
        let email = new.email.trim().to_lowercase();
        let created_at = Utc::now();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r"
            INSERT INTO accounts
                (full_name, email, password_hash, company_name, industry, role,
                 credits, status, verified, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 'active', 0, ?)
            ",
        )
        .bind(new.full_name.trim())
        .bind(&email)
        .bind(hash_password(&new.password))
        .bind(new.company_name.as_deref())
        .bind(new.industry.as_deref())
        .bind(new.role.as_deref())
        .bind(starting_credits)
        .bind(created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        let id = AccountId(result.last_insert_rowid());

        if starting_credits > 0 {
            sqlx::query(
                r"
                INSERT INTO credit_transactions (account_id, amount, description, created_at)
                VALUES (?, ?, 'Initial account credits', ?)
                ",
            )
            .bind(id.0)
            .bind(starting_credits)
            .bind(created_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(account = %id, %email, starting_credits, "account created");

        Ok(Account {
            id,
            full_name: new.full_name.trim().to_string(),
            email,
            company_name: new.company_name.clone(),
            industry: new.industry.clone(),
            role: new.role.clone(),
            credits: starting_credits,
            status: AccountStatus::Active,
            verified: false,
            created_at,
        })
    }

    /// Get account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(
            r"
            SELECT id, full_name, email, company_name, industry, role,
                   credits, status, verified, created_at
            FROM accounts
            WHERE id = ?
            ",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_account))
    }

    /// Get account by email (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r"
            SELECT id, full_name, email, company_name, industry, role,
                   credits, status, verified, created_at
            FROM accounts
            WHERE email = ?
            ",
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_account))
    }

    /// Check a login attempt; returns the account only on a password match.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn check_credentials(&self, email: &str, password: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r"
            SELECT id, full_name, email, company_name, industry, role,
                   credits, status, verified, created_at, password_hash
            FROM accounts
            WHERE email = ?
            ",
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let stored: String = row.get("password_hash");
        if stored == hash_password(password) {
            Ok(Some(row_to_account(&row)))
        } else {
            Ok(None)
        }
    }

    /// Apply a partial profile update.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccountNotFound`] if the account does not exist, or
    /// a database error if the query fails.
    pub async fn update_profile(&self, id: AccountId, update: &ProfileUpdate) -> Result<Account> {
        sqlx::query(
            r"
            UPDATE accounts SET
                full_name = COALESCE(?, full_name),
                company_name = COALESCE(?, company_name),
                industry = COALESCE(?, industry),
                role = COALESCE(?, role)
            WHERE id = ?
            ",
        )
        .bind(update.full_name.as_deref())
        .bind(update.company_name.as_deref())
        .bind(update.industry.as_deref())
        .bind(update.role.as_deref())
        .bind(id.0)
        .execute(&self.pool)
        .await?;

        self.get(id).await?.ok_or(Error::AccountNotFound(id))
    }

    /// Mark an account's email as verified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccountNotFound`] if the account does not exist, or
    /// a database error if the query fails.
    pub async fn mark_verified(&self, id: AccountId) -> Result<Account> {
        sqlx::query("UPDATE accounts SET verified = 1 WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        self.get(id).await?.ok_or(Error::AccountNotFound(id))
    }
}

/// SHA-256 hex digest of a password.
#[must_use]
pub(crate) fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    format!("{digest:x}")
}

fn row_to_account(row: &SqliteRow) -> Account {
    Account {
        id: AccountId(row.get("id")),
        full_name: row.get("full_name"),
        email: row.get("email"),
        company_name: row.get("company_name"),
        industry: row.get("industry"),
        role: row.get("role"),
        credits: row.get("credits"),
        status: AccountStatus::from_str_lossy(&row.get::<String, _>("status")),
        verified: row.get::<i64, _>("verified") != 0,
        created_at: parse_timestamp(&row.get::<String, _>("created_at")),
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse().unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Storage;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            full_name: "Jamie Rivera".into(),
            email: email.into(),
            password: "password123".into(),
            company_name: Some("Acme Sales".into()),
            industry: Some("Technology".into()),
            role: Some("Sales Manager".into()),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let storage = Storage::in_memory().await.unwrap();
        let repo = storage.accounts();

        let created = repo.create(&new_account("Jamie@Example.COM"), 100).await.unwrap();
        assert_eq!(created.email, "jamie@example.com");
        assert_eq!(created.credits, 100);
        assert_eq!(created.status, AccountStatus::Active);

        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.full_name, "Jamie Rivera");
        assert_eq!(fetched.credits, 100);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let storage = Storage::in_memory().await.unwrap();
        let repo = storage.accounts();

        repo.create(&new_account("dup@example.com"), 100).await.unwrap();
        let result = repo.create(&new_account("dup@example.com"), 100).await;
        assert!(matches!(result, Err(Error::Database(_))));
    }

    #[tokio::test]
    async fn test_check_credentials() {
        let storage = Storage::in_memory().await.unwrap();
        let repo = storage.accounts();
        repo.create(&new_account("login@example.com"), 100).await.unwrap();

        let ok = repo
            .check_credentials("login@example.com", "password123")
            .await
            .unwrap();
        assert!(ok.is_some());

        let bad = repo
            .check_credentials("login@example.com", "wrong-password")
            .await
            .unwrap();
        assert!(bad.is_none());

        let missing = repo
            .check_credentials("nobody@example.com", "password123")
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_update_profile_partial() {
        let storage = Storage::in_memory().await.unwrap();
        let repo = storage.accounts();
        let account = repo.create(&new_account("p@example.com"), 100).await.unwrap();

        let updated = repo
            .update_profile(
                account.id,
                &ProfileUpdate {
                    role: Some("VP of Sales".into()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role.as_deref(), Some("VP of Sales"));
        // Untouched fields survive.
        assert_eq!(updated.company_name.as_deref(), Some("Acme Sales"));
    }

    #[tokio::test]
    async fn test_mark_verified() {
        let storage = Storage::in_memory().await.unwrap();
        let repo = storage.accounts();
        let account = repo.create(&new_account("v@example.com"), 100).await.unwrap();
        assert!(!account.verified);

        let verified = repo.mark_verified(account.id).await.unwrap();
        assert!(verified.verified);
    }
}
