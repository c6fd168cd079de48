//! Shared SQLite storage.
//!
//! All repositories operate on one pool so that the ledger's guarded debit
//! (balance compare + decrement + entry insert) runs inside a single
//! database transaction spanning the `accounts` and `credit_transactions`
//! tables.

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::Result;
use crate::account::AccountRepository;
use crate::companies::CompanyRepository;
use crate::contacts::ContactRepository;
use crate::ledger::LedgerRepository;

/// Handle to the shared database; hands out typed repositories.
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Open (or create) the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn open(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let storage = Self { pool };
        storage.initialize().await?;
        Ok(storage)
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let storage = Self { pool };
        storage.initialize().await?;
        Ok(storage)
    }

    /// Initialize the schema for every repository.
    async fn initialize(&self) -> Result<()> {
        AccountRepository::initialize(&self.pool).await?;
        LedgerRepository::initialize(&self.pool).await?;
        ContactRepository::initialize(&self.pool).await?;
        CompanyRepository::initialize(&self.pool).await?;
        Ok(())
    }

    /// Account repository over the shared pool.
    #[must_use]
    pub fn accounts(&self) -> AccountRepository {
        AccountRepository::with_pool(self.pool.clone())
    }

    /// Ledger repository over the shared pool.
    #[must_use]
    pub fn ledger(&self) -> LedgerRepository {
        LedgerRepository::with_pool(self.pool.clone())
    }

    /// Contact repository over the shared pool.
    #[must_use]
    pub fn contacts(&self) -> ContactRepository {
        ContactRepository::with_pool(self.pool.clone())
    }

    /// Company repository over the shared pool.
    #[must_use]
    pub fn companies(&self) -> CompanyRepository {
        CompanyRepository::with_pool(self.pool.clone())
    }
}
