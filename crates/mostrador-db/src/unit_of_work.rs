//! # Unit of Work
//!
//! An explicit transaction boundary handed to ledger and repository calls.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  db.begin() ──► UnitOfWork ──► repositories / ledger calls             │
//! │                     │                                                   │
//! │          ┌──────────┴───────────┐                                       │
//! │          ▼                      ▼                                       │
//! │   uow.commit()            dropped (error, `?`, cancelled future)        │
//! │   all writes durable      ROLLBACK, no write observable                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Row Locks on SQLite
//! SQLite has no `SELECT ... FOR UPDATE`. A row is "locked" by making a
//! no-op write on it the first statement of the unit of work:
//!
//! ```sql
//! UPDATE inventory SET current_stock = current_stock
//!  WHERE product_id = ?1 AND tenant_id = ?2
//! RETURNING current_stock
//! ```
//!
//! The write takes the database write lock, waiting up to the configured
//! busy timeout for any other writer to commit or roll back, and the value
//! it returns is read after that wait. Every write path in this crate opens
//! with such a statement, so no unit of work ever reads a stale value and
//! then writes on top of it.

use sqlx::{Sqlite, SqliteConnection, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{
    CategoryRepository, InventoryRepository, ProductRepository, SaleRepository,
    SettingsRepository,
};

/// A storage transaction with explicit commit.
///
/// `commit()` consumes the unit of work. Dropping it without committing
/// rolls back every write made through it.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        UnitOfWork { tx }
    }

    /// The underlying connection, for statements not covered by a repository.
    pub fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    pub fn products(&mut self) -> ProductRepository<'_> {
        ProductRepository::new(&mut self.tx)
    }

    pub fn inventory(&mut self) -> InventoryRepository<'_> {
        InventoryRepository::new(&mut self.tx)
    }

    pub fn sales(&mut self) -> SaleRepository<'_> {
        SaleRepository::new(&mut self.tx)
    }

    pub fn categories(&mut self) -> CategoryRepository<'_> {
        CategoryRepository::new(&mut self.tx)
    }

    pub fn settings(&mut self) -> SettingsRepository<'_> {
        SettingsRepository::new(&mut self.tx)
    }

    /// Makes every write of this unit of work durable.
    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Unit of work committed");
        Ok(())
    }

    /// Discards every write of this unit of work.
    ///
    /// Dropping has the same effect; this form reports rollback failures.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Unit of work rolled back");
        Ok(())
    }
}
