//! Ledger storage repository.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqlitePool;
use tracing::debug;

use super::model::{EntryId, LedgerEntry};
use crate::account::AccountId;
use crate::{Error, Result};

/// Outcome of a debit attempt.
///
/// Insufficient funds is a decision, not a failure: when the balance does
/// not cover the amount nothing is written and the caller receives
/// [`DebitOutcome::Insufficient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    /// The debit was applied; contains the new balance.
    Applied(i64),
    /// The balance could not cover the amount; nothing was mutated.
    Insufficient {
        /// Amount the debit asked for.
        required: i64,
        /// Balance at the time of the attempt.
        available: i64,
    },
}

/// Repository for the credit ledger.
///
/// Sole mutator of the `credits` column: every balance change appends a
/// matching entry in the same transaction.
#[derive(Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Wrap an existing pool (see [`crate::Storage`]).
    pub(crate) const fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the ledger schema.
    pub(crate) async fn initialize(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS credit_transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL REFERENCES accounts(id),
                amount INTEGER NOT NULL,
                description TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_credit_transactions_account
                ON credit_transactions(account_id)
            ",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Current balance for an account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccountNotFound`] if the account does not exist, or
    /// a database error if the query fails.
    pub async fn balance(&self, account_id: AccountId) -> Result<i64> {
        let balance: Option<i64> = sqlx::query_scalar("SELECT credits FROM accounts WHERE id = ?")
            .bind(account_id.0)
            .fetch_optional(&self.pool)
            .await?;

        balance.ok_or(Error::AccountNotFound(account_id))
    }

    /// Increase an account's balance and append a credit entry.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAmount`] if `amount` is not positive,
    /// [`Error::AccountNotFound`] if the account does not exist, or a
    /// database error if the transaction fails.
    pub async fn record_credit(
        &self,
        account_id: AccountId,
        amount: i64,
        description: &str,
    ) -> Result<i64> {
        if amount <= 0 {
            return Err(Error::InvalidAmount(amount));
        }

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE accounts SET credits = credits + ? WHERE id = ?")
            .bind(amount)
            .bind(account_id.0)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(Error::AccountNotFound(account_id));
        }

        insert_entry(&mut tx, account_id, amount, description).await?;

        let new_balance: i64 = sqlx::query_scalar("SELECT credits FROM accounts WHERE id = ?")
            .bind(account_id.0)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(account = %account_id, amount, new_balance, "credit recorded");
        Ok(new_balance)
    }

    /// Attempt to decrease an account's balance and append a debit entry.
    ///
    /// The compare and the decrement are one guarded UPDATE inside a
    /// transaction: concurrent debits against a low balance cannot both
    /// succeed, and a denied debit writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAmount`] if `amount` is not positive,
    /// [`Error::AccountNotFound`] if the account does not exist, or a
    /// database error if the transaction fails.
    pub async fn record_debit(
        &self,
        account_id: AccountId,
        amount: i64,
        description: &str,
    ) -> Result<DebitOutcome> {
        if amount <= 0 {
            return Err(Error::InvalidAmount(amount));
        }

        let mut tx = self.pool.begin().await?;

        let updated =
            sqlx::query("UPDATE accounts SET credits = credits - ?1 WHERE id = ?2 AND credits >= ?1")
                .bind(amount)
                .bind(account_id.0)
                .execute(&mut *tx)
                .await?;

        if updated.rows_affected() == 0 {
            let available: Option<i64> =
                sqlx::query_scalar("SELECT credits FROM accounts WHERE id = ?")
                    .bind(account_id.0)
                    .fetch_optional(&mut *tx)
                    .await?;

            let Some(available) = available else {
                return Err(Error::AccountNotFound(account_id));
            };

            // Nothing was written; dropping the transaction rolls it back.
            debug!(account = %account_id, amount, available, "debit denied");
            return Ok(DebitOutcome::Insufficient {
                required: amount,
                available,
            });
        }

        insert_entry(&mut tx, account_id, -amount, description).await?;

        let new_balance: i64 = sqlx::query_scalar("SELECT credits FROM accounts WHERE id = ?")
            .bind(account_id.0)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(account = %account_id, amount, new_balance, "debit applied");
        Ok(DebitOutcome::Applied(new_balance))
    }

    /// All entries for an account, newest first.
    ///
    /// Ordered by id: ids are assigned in commit order, so the ordering is
    /// stable even when timestamps collide.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn transactions(&self, account_id: AccountId) -> Result<Vec<LedgerEntry>> {
        let rows = sqlx::query(
            r"
            SELECT id, account_id, amount, description, created_at
            FROM credit_transactions
            WHERE account_id = ?
            ORDER BY id DESC
            ",
        )
        .bind(account_id.0)
        .fetch_all(&self.pool)
        .await?;

        let entries = rows
            .iter()
            .map(|row| LedgerEntry {
                id: EntryId(row.get("id")),
                account_id: AccountId(row.get("account_id")),
                amount: row.get("amount"),
                description: row.get("description"),
                created_at: parse_timestamp(&row.get::<String, _>("created_at")),
            })
            .collect();

        Ok(entries)
    }
}

async fn insert_entry(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    account_id: AccountId,
    amount: i64,
    description: &str,
) -> Result<()> {
    sqlx::query(
        r"
        INSERT INTO credit_transactions (account_id, amount, description, created_at)
        VALUES (?, ?, ?, ?)
        ",
    )
    .bind(account_id.0)
    .bind(amount)
    .bind(description)
    .bind(Utc::now().to_rfc3339())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Timestamps are written by this module in RFC 3339; tolerate anything else.
fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse().unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Storage;
    use crate::account::NewAccount;

    async fn setup() -> (Storage, AccountId) {
        let storage = Storage::in_memory().await.unwrap();
        let account = storage
            .accounts()
            .create(
                &NewAccount {
                    full_name: "Test User".into(),
                    email: "test@example.com".into(),
                    password: "password123".into(),
                    company_name: None,
                    industry: None,
                    role: None,
                },
                100,
            )
            .await
            .unwrap();
        (storage, account.id)
    }

    #[tokio::test]
    async fn test_signup_grants_starting_balance() {
        let (storage, id) = setup().await;
        let ledger = storage.ledger();

        assert_eq!(ledger.balance(id).await.unwrap(), 100);

        let entries = ledger.transactions(id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, 100);
    }

    #[tokio::test]
    async fn test_debit_then_denied_scenario() {
        let (storage, id) = setup().await;
        let ledger = storage.ledger();

        let outcome = ledger.record_debit(id, 5, "Contact search").await.unwrap();
        assert_eq!(outcome, DebitOutcome::Applied(95));

        let entries = ledger.transactions(id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].amount, -5);

        // Over-budget charge: denied, nothing written.
        let outcome = ledger
            .record_debit(id, 200, "Import contacts")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            DebitOutcome::Insufficient {
                required: 200,
                available: 95
            }
        );
        assert_eq!(ledger.balance(id).await.unwrap(), 95);
        assert_eq!(ledger.transactions(id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_balance_equals_entry_sum() {
        let (storage, id) = setup().await;
        let ledger = storage.ledger();

        ledger.record_credit(id, 50, "Top-up").await.unwrap();
        ledger.record_debit(id, 30, "Enrichment").await.unwrap();
        ledger.record_debit(id, 7, "Reveal").await.unwrap();
        // Denied attempt must not skew the sum.
        ledger.record_debit(id, 10_000, "Too big").await.unwrap();

        let balance = ledger.balance(id).await.unwrap();
        let sum: i64 = ledger
            .transactions(id)
            .await
            .unwrap()
            .iter()
            .map(|e| e.amount)
            .sum();
        assert_eq!(balance, sum);
        assert_eq!(balance, 113);
    }

    #[tokio::test]
    async fn test_debit_is_not_idempotent() {
        let (storage, id) = setup().await;
        let ledger = storage.ledger();

        ledger.record_debit(id, 5, "Contact search").await.unwrap();
        let outcome = ledger.record_debit(id, 5, "Contact search").await.unwrap();

        // Same description, charged again: replays are billed.
        assert_eq!(outcome, DebitOutcome::Applied(90));
        assert_eq!(ledger.transactions(id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_non_positive_amounts_rejected() {
        let (storage, id) = setup().await;
        let ledger = storage.ledger();

        assert!(matches!(
            ledger.record_credit(id, -10, "bad").await,
            Err(Error::InvalidAmount(-10))
        ));
        assert!(matches!(
            ledger.record_credit(id, 0, "bad").await,
            Err(Error::InvalidAmount(0))
        ));
        assert!(matches!(
            ledger.record_debit(id, -3, "bad").await,
            Err(Error::InvalidAmount(-3))
        ));

        assert_eq!(ledger.balance(id).await.unwrap(), 100);
        assert_eq!(ledger.transactions(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let (storage, _) = setup().await;
        let ledger = storage.ledger();
        let ghost = AccountId(999);

        assert!(matches!(
            ledger.balance(ghost).await,
            Err(Error::AccountNotFound(_))
        ));
        assert!(matches!(
            ledger.record_credit(ghost, 10, "x").await,
            Err(Error::AccountNotFound(_))
        ));
        assert!(matches!(
            ledger.record_debit(ghost, 10, "x").await,
            Err(Error::AccountNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_transactions_newest_first() {
        let (storage, id) = setup().await;
        let ledger = storage.ledger();

        ledger.record_debit(id, 1, "first").await.unwrap();
        ledger.record_debit(id, 2, "second").await.unwrap();

        let entries = ledger.transactions(id).await.unwrap();
        assert_eq!(entries[0].description, "second");
        assert_eq!(entries[1].description, "first");
        assert_eq!(entries[2].description, "Initial account credits");
    }
}
